//! LiveKit server API surface used by the daemon.
//!
//! The media tracks are published by a separate pipeline; this side
//! only talks to the RoomService to keep the room's metadata current.

mod client;
mod token;

pub use client::RoomServiceClient;
pub use token::{access_token, VideoGrant};
