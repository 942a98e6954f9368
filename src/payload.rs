//! Image payloads for classification.
//!
//! An `ImagePayload` is the raw file bytes plus a declared MIME type. Nothing
//! here decodes pixels or re-encodes the image: the bytes handed to the
//! classifier are exactly the bytes read, so encoding the same input twice
//! yields identical output.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Declared when the format cannot be sniffed from the leading bytes.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ImagePayload {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = sniff_mime_type(&bytes);
        Self { bytes, mime_type }
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .context("read image payload")?;
        Ok(Self::from_bytes(bytes))
    }

    /// Override the sniffed MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard padded base64, as carried inline in the request body.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// SHA-256 of the raw bytes, hex encoded. Used to correlate log lines
    /// without logging image content.
    pub fn digest_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Read an image file into a payload ready for classification.
pub fn encode_image(path: &Path) -> Result<ImagePayload> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open image {}", path.display()))?;
    ImagePayload::from_reader(file).with_context(|| format!("read image {}", path.display()))
}

fn sniff_mime_type(bytes: &[u8]) -> String {
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => DEFAULT_MIME_TYPE.to_string(),
    }
}
