//! Access-token generation for the LiveKit server API.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{Result, TelemetryError};

type HmacSha256 = Hmac<Sha256>;

/// Tokens are minted per request; a day of validity is plenty.
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    nbf: i64,
    exp: i64,
    video: &'a VideoGrant<'a>,
}

/// Video grant carried by the access token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant<'a> {
    pub room_create: bool,
    pub room_join: bool,
    pub room_admin: bool,
    pub room: &'a str,
}

impl<'a> VideoGrant<'a> {
    /// Grant sufficient for room-metadata administration.
    pub fn admin(room: &'a str) -> Self {
        Self {
            room_create: true,
            room_join: true,
            room_admin: true,
            room,
        }
    }
}

/// Builds a signed HS256 JWT accepted by the server API, issued by the
/// API key and signed with the API secret.
pub fn access_token(
    api_key: &str,
    api_secret: &str,
    identity: &str,
    grant: &VideoGrant<'_>,
) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        iss: api_key,
        sub: identity,
        nbf: now,
        exp: now + TOKEN_TTL_SECS,
        video: grant,
    };

    let header = Header {
        alg: "HS256",
        typ: "JWT",
    };
    let message = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
    );

    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .map_err(|_| TelemetryError::token("API secret is unusable as a signing key"))?;
    mac.update(message.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", message, signature))
}
