//! Twirp client for the room service.

use serde::Serialize;

use super::token::{access_token, VideoGrant};
use crate::error::{Result, TelemetryError};

/// Minimal RoomService client; the daemon only ever updates room
/// metadata. Failures surface as errors for the caller to log, never
/// as retries.
pub struct RoomServiceClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    identity: String,
}

#[derive(Debug, Serialize)]
struct UpdateRoomMetadataRequest<'a> {
    room: &'a str,
    metadata: &'a str,
}

impl RoomServiceClient {
    pub fn new(domain: &str, api_key: &str, api_secret: &str, identity: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("https://{}", domain),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            identity: identity.to_string(),
        }
    }

    /// Replaces the room's metadata document.
    pub async fn update_room_metadata(&self, room: &str, metadata: &str) -> Result<()> {
        let token = access_token(
            &self.api_key,
            &self.api_secret,
            &self.identity,
            &VideoGrant::admin(room),
        )?;

        let response = self
            .http
            .post(format!(
                "{}/twirp/livekit.RoomService/UpdateRoomMetadata",
                self.base_url
            ))
            .bearer_auth(token)
            .json(&UpdateRoomMetadataRequest { room, metadata })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TelemetryError::registry(format!(
                "room service returned {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(())
    }
}
