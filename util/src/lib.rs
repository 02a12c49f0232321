pub mod config;
pub mod state;
pub mod time_format;
