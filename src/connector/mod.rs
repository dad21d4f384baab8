// SPDX-License-Identifier: MIT
//! Native companion protocol.
//!
//! The companion program speaks a length-prefixed JSON request/response
//! exchange: every request carries a `cmd` tag with optional `params`, every
//! response carries a `type` tag that is either `Error` or a command-specific
//! success tag. Both sides are modeled as exhaustive serde enums so unknown
//! or mismatched responses fail at the boundary instead of deep inside a
//! handler.

pub mod framing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tracing::debug;
use ulid::Ulid;
use url::Url;

use self::framing::{read_message, write_message, FramingError};

// ─── Wire messages ───────────────────────────────────────────────────────────

/// A request sent to the native companion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum Request {
    /// Versions of the installed system components.
    GetSystemVersions,

    /// All sites the companion manages.
    GetSiteList,

    /// All browser profiles the companion manages.
    GetProfileList,

    /// Companion program configuration.
    GetConfig,

    /// Replace the companion program configuration.
    SetConfig(Value),

    /// Install a site from its manifest, with optional user overwrites.
    InstallSite {
        manifest_url: Url,
        document_url: Option<Url>,
        start_url: Option<Url>,
        profile: Option<Ulid>,
        name: Option<String>,
        description: Option<String>,
        categories: Vec<String>,
        keywords: Vec<String>,
    },

    /// Uninstall a site by its ULID.
    UninstallSite(Ulid),

    /// Re-fetch the manifest and update a site by its ULID.
    UpdateSite(Ulid),

    /// Launch an installed site by its ULID.
    LaunchSite(Ulid),
}

/// Versions reported by the companion.
///
/// `companion` is the companion program's own semver string; `runtime` is the
/// version of the browser runtime it manages. `None` means the component is
/// not installed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemVersions {
    pub companion: Option<String>,
    pub runtime: Option<String>,
}

/// A site entry as reported by `GetSiteList`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteEntry {
    pub id: Ulid,
    pub name: Option<String>,
    pub start_url: Url,
    pub profile: Ulid,
}

/// A profile entry as reported by `GetProfileList`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub id: Ulid,
    pub name: Option<String>,
    pub sites: Vec<Ulid>,
}

/// A response received from the native companion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Response {
    /// Request could not be processed; `data` is a human-readable message.
    Error(String),

    /// Versions of the installed system components.
    SystemVersions(SystemVersions),

    /// All sites the companion manages.
    SiteList(Vec<SiteEntry>),

    /// All browser profiles the companion manages.
    ProfileList(Vec<ProfileEntry>),

    /// Companion program configuration.
    Config(Value),

    /// Configuration has been replaced.
    ConfigSet,

    /// Site has been successfully installed.
    SiteInstalled(Ulid),

    /// Site has been successfully uninstalled.
    SiteUninstalled,

    /// Site has been successfully updated.
    SiteUpdated,

    /// Site has been successfully launched.
    SiteLaunched,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Transport-level failures talking to the companion.
///
/// `PeerUnreachable` is deliberately distinct from the decode errors: callers
/// map it to an "install the companion" state, while a decode failure means
/// the peer answered garbage and must be surfaced.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("native companion is unreachable: {0}")]
    PeerUnreachable(#[source] std::io::Error),

    #[error("malformed companion message: {0}")]
    Framing(#[from] FramingError),
}

// ─── Transport seam ──────────────────────────────────────────────────────────

/// One request/response exchange with the native companion.
///
/// The concrete transport is host-owned (native messaging pipe, test duplex);
/// everything above this seam only sees typed messages.
#[async_trait]
pub trait CompanionTransport: Send + Sync {
    async fn exchange(&self, request: Request) -> Result<Response, ConnectorError>;
}

/// Companion client over a framed byte stream.
///
/// Serializes each exchange: the wire protocol is strictly one response per
/// request, so concurrent callers take turns on the underlying stream.
pub struct Connector<S> {
    stream: Mutex<S>,
}

impl<S> Connector<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: Mutex::new(stream),
        }
    }
}

#[async_trait]
impl<S> CompanionTransport for Connector<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn exchange(&self, request: Request) -> Result<Response, ConnectorError> {
        let mut stream = self.stream.lock().await;

        write_message(&mut *stream, &request)
            .await
            .map_err(io_or_framing)?;
        let response: Response = read_message(&mut *stream).await.map_err(io_or_framing)?;

        debug!(?request, ?response, "companion exchange");
        Ok(response)
    }
}

/// I/O failures mean the peer went away; everything else is a protocol bug.
fn io_or_framing(err: FramingError) -> ConnectorError {
    match err {
        FramingError::Io(io) => ConnectorError::PeerUnreachable(io),
        other => ConnectorError::Framing(other),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_value(&Request::GetSystemVersions).unwrap();
        assert_eq!(json, serde_json::json!({ "cmd": "GetSystemVersions" }));
    }

    #[test]
    fn test_response_error_wire_shape() {
        let parsed: Response =
            serde_json::from_str(r#"{ "type": "Error", "data": "runtime missing" }"#).unwrap();
        assert_eq!(parsed, Response::Error("runtime missing".to_string()));
    }

    #[test]
    fn test_system_versions_roundtrip() {
        let json = r#"{
            "type": "SystemVersions",
            "data": { "companion": "2.3.0", "runtime": null }
        }"#;
        let parsed: Response = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed,
            Response::SystemVersions(SystemVersions {
                companion: Some("2.3.0".to_string()),
                runtime: None,
            })
        );
    }

    #[test]
    fn test_install_site_carries_urls() {
        let req = Request::InstallSite {
            manifest_url: Url::parse("https://example.com/manifest.json").unwrap(),
            document_url: Some(Url::parse("https://example.com/").unwrap()),
            start_url: None,
            profile: None,
            name: Some("Example".to_string()),
            description: None,
            categories: vec![],
            keywords: vec![],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["cmd"], "InstallSite");
        assert_eq!(json["params"]["manifest_url"], "https://example.com/manifest.json");
    }
}
