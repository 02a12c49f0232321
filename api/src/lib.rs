//! HTTP layer for the supervision tracker.
//!
//! Exposes the router builder, auth primitives and the shared response
//! envelope so integration tests can drive the full application in-process.

pub mod auth;
pub mod response;
pub mod routes;
