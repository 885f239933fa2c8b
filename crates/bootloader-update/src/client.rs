//! Update service client
//!
//! Contract of the update service:
//! - `GET <base>?major=<n>&minor=<n>&bugfix=<n>`
//! - `404` means no newer version exists
//! - `2xx` carries `{ "data": ... }`, the new binary as a byte array or base64 string
//! - anything else is an upstream failure

use base64::Engine;
use bootloader_core::NetworkConfig;
use reqwest::StatusCode;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Result, UpdateError};
use crate::version::AppVersion;

/// Query parameters owned by the update protocol
const VERSION_QUERY_KEYS: [&str; 3] = ["major", "minor", "bugfix"];

/// Answer of the update service
#[derive(Debug)]
pub enum UpdateCheck {
    /// No newer version exists
    UpToDate,

    /// A newer binary is available
    Available(UpdatePayload),
}

/// New application binary as returned by the update service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayload {
    /// Raw binary content
    pub data: Vec<u8>,
}

impl<'de> Deserialize<'de> for UpdatePayload {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PayloadVisitor)
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = UpdatePayload;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object with a `data` field")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<UpdatePayload, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut data: Option<PayloadBytes> = None;

        // Keys match case-insensitively: `data`, `Data`, `DATA`
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("data") {
                if data.is_some() {
                    return Err(de::Error::duplicate_field("data"));
                }
                data = Some(map.next_value()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        let data = data.ok_or_else(|| de::Error::missing_field("data"))?;
        Ok(UpdatePayload { data: data.0 })
    }
}

/// Binary content encoded either as a byte array or as a base64 string
struct PayloadBytes(Vec<u8>);

impl<'de> Deserialize<'de> for PayloadBytes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PayloadBytesVisitor)
    }
}

struct PayloadBytesVisitor;

impl<'de> Visitor<'de> for PayloadBytesVisitor {
    type Value = PayloadBytes;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a byte array or a base64 string")
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<PayloadBytes, E>
    where
        E: de::Error,
    {
        base64::engine::general_purpose::STANDARD
            .decode(value)
            .map(PayloadBytes)
            .map_err(|e| E::custom(format!("invalid base64 payload: {}", e)))
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<PayloadBytes, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Ok(PayloadBytes(bytes))
    }
}

/// HTTP client for the update service
pub struct UpdateClient {
    /// HTTP client
    client: reqwest::Client,

    /// Request timeout, reported on expiry
    timeout_secs: u64,
}

impl UpdateClient {
    /// Create a new client from the network settings
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&network.user_agent)
            .timeout(Duration::from_secs(network.timeout_secs))
            .connect_timeout(Duration::from_secs(network.connect_timeout_secs))
            .build()
            .map_err(UpdateError::Transport)?;

        Ok(Self {
            client,
            timeout_secs: network.timeout_secs,
        })
    }

    /// Build the update query for `version` on top of `base`
    ///
    /// Existing query pairs are kept, except those colliding with the
    /// version keys (compared case-insensitively), which are replaced.
    pub fn build_query_url(base: &Url, version: &AppVersion) -> Url {
        let preserved: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(key, _)| {
                !VERSION_QUERY_KEYS
                    .iter()
                    .any(|reserved| reserved.eq_ignore_ascii_case(key))
            })
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut url = base.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(preserved)
            .append_pair("major", &version.major.to_string())
            .append_pair("minor", &version.minor.to_string())
            .append_pair("bugfix", &version.bugfix_param());
        url
    }

    /// Ask the update service for a version newer than `version`
    ///
    /// The request is abandoned as soon as `cancel` fires.
    pub async fn check(
        &self,
        base: &Url,
        version: &AppVersion,
        cancel: &CancellationToken,
    ) -> Result<UpdateCheck> {
        let url = Self::build_query_url(base, version);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Update check cancelled");
                Err(UpdateError::Cancelled)
            }
            result = self.fetch(url) => result,
        }
    }

    async fn fetch(&self, url: Url) -> Result<UpdateCheck> {
        debug!("Checking for update: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            info!("Update service reports no newer version");
            return Ok(UpdateCheck::UpToDate);
        }

        if !status.is_success() {
            return Err(UpdateError::Upstream {
                status,
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let payload: UpdatePayload = serde_json::from_slice(&body)?;

        info!("Update available ({} bytes)", payload.data.len());
        Ok(UpdateCheck::Available(payload))
    }

    fn transport_error(&self, error: reqwest::Error) -> UpdateError {
        if error.is_timeout() {
            UpdateError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            UpdateError::Transport(error)
        }
    }
}
