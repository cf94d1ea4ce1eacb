// this_file: src/fetch.rs
//! Blocking HTTP fetch for remote template images

use crate::decode::{self, DecodedImage};
use crate::error::{Error, Result};
use crate::security::MAX_IMAGE_BYTES;
use log::info;
use std::time::Duration;
use ureq::Agent;

/// Overall timeout for one request
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Download `url` and return the body bytes.
///
/// Non-success statuses and bodies larger than the image byte limit are
/// errors carrying the URL.
pub fn fetch(url: &str) -> Result<Vec<u8>> {
    let network_err = |reason: String| Error::Network {
        url: url.to_string(),
        reason,
    };

    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(FETCH_TIMEOUT))
        .build()
        .into();

    info!("Fetching {}", url);
    let mut response = agent
        .get(url)
        .call()
        .map_err(|e| network_err(e.to_string()))?;

    let bytes = response
        .body_mut()
        .with_config()
        .limit(MAX_IMAGE_BYTES as u64)
        .read_to_vec()
        .map_err(|e| network_err(format!("Failed to read body: {}", e)))?;

    info!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes)
}

/// Fetch a remote image and decode it with the URL as the claimed name.
pub fn fetch_image(url: &str) -> Result<DecodedImage> {
    // Reject unsupported suffixes before any network traffic
    if decode::ClaimedFormat::from_name(url).is_none() {
        return Err(Error::UnsupportedFormat {
            name: url.to_string(),
        });
    }
    let bytes = fetch(url)?;
    decode::decode(&bytes, url)
}
