//! foodshare
//!
//! Core of a neighbourhood food-sharing app: donors photograph surplus food,
//! an external multimodal model classifies it, and recipients browse, claim
//! and coordinate pickup over chat.
//!
//! # Classification contract
//!
//! `ClassificationClient::classify` turns image bytes into a fully populated
//! `ClassificationResult`:
//!
//! 1. **No credential**: the fixed fallback result, no network call.
//! 2. **Credential**: one request to the model; the structured answer is
//!    parsed and validated.
//! 3. **Upstream trouble** (transport, non-2xx, empty or malformed body):
//!    `ClassificationFailed` is returned to the caller. It is never
//!    silently replaced by the fallback.
//!
//! # Module Structure
//!
//! - `config`: classifier configuration (file + environment)
//! - `payload`: image bytes, MIME sniffing, base64 encoding
//! - `classify`: result type, backends, client, analysis handle
//! - `listing`, `chat`, `map`, `seed`: in-memory app state, never persisted

use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod chat;
pub mod classify;
pub mod config;
pub mod listing;
pub mod map;
pub mod payload;
pub mod seed;

pub use chat::{ChatMessage, ChatSession, Inbox, QUICK_REPLIES};
pub use classify::{
    Analysis, AnalysisState, ClassificationClient, ClassificationFailed, ClassificationResult,
    ClassifierBackend, GeminiBackend, StaticBackend,
};
pub use config::{ApiKey, ClassifierConfig};
pub use listing::{
    Catalog, FoodItem, ListingDraft, ListingFilter, ListingStatus, PickupWindow, User, UserRole,
};
pub use map::{pin_position, place_pins, MapPin};
pub use payload::{encode_image, ImagePayload};

/// Random 64-bit identifier, hex encoded.
pub fn new_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> anyhow::Result<u64> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)?;
    Ok(elapsed.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_hex_and_distinct() {
        let a = new_id();
        let b = new_id();
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn clock_is_after_2020() {
        assert!(now_ms().unwrap() > 1_577_836_800_000);
    }
}
