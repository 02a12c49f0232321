pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;

pub use claims::{AuthUser, Claims, Role};

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use util::config;

/// Generates an access JWT and its expiry timestamp for a given user.
///
/// The secret and lifetime come from the global config. Returns the encoded
/// token together with the expiry as an RFC 3339 string for clients.
pub fn generate_jwt(user_id: i64, role: Role) -> (String, String) {
    let jwt_secret = config::jwt_secret();
    let jwt_duration_minutes = config::jwt_duration_minutes() as i64;

    let expiry = Utc::now() + Duration::minutes(jwt_duration_minutes);
    let exp_timestamp = expiry.timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        exp: exp_timestamp,
        roles: vec![role],
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("Token encoding failed");

    (token, expiry.to_rfc3339())
}
