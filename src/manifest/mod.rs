// SPDX-License-Identifier: MIT
//! Web App Manifest fetching, resolution, and validation.
//!
//! A fetched manifest is untrusted JSON: `start_url` and `scope` may be
//! relative, absent, or pointing somewhere the referring document has no
//! business installing. Resolution normalizes both to absolute URLs and
//! enforces the W3C same-origin and scope-containment rules, rejecting
//! instead of repairing.
//!
//! Fetch failure, JSON failure, and validation failure are three distinct
//! errors: the host falls back to a no-manifest install on the first two and
//! treats the third as fatal.

pub mod icons;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use self::icons::IconDescriptor;

/// A (possibly synthesized) Web App Manifest.
///
/// Only the fields the install flow consumes are typed; everything else is
/// carried through `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebAppManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub icons: Vec<IconDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Fields the install flow does not consume, passed through unmodified.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid URL in manifest: {0}")]
    Url(#[from] url::ParseError),

    #[error("start URL {start_url} is not in the same origin as document {document_url}")]
    StartUrlOriginMismatch { start_url: Url, document_url: Url },

    #[error("start URL {start_url} is not within the scope {scope}")]
    StartUrlNotInScope { start_url: Url, scope: Url },

    #[error("failed to fetch manifest: {0}")]
    Fetch(#[source] reqwest::Error),

    #[error("failed to parse manifest JSON: {0}")]
    Json(#[source] serde_json::Error),
}

/// Resolve and validate a raw manifest against its referring document.
///
/// `start_url` and `scope` are resolved relative to the **document** URL (the
/// manifest spec's base-URL rule); an absent `start_url` defaults to the
/// document itself and an absent `scope` defaults to the start URL's
/// directory. The returned manifest carries both as absolute URL strings, so
/// resolution is idempotent.
///
/// Scope containment is a raw string-prefix test on the path — scope `/foo`
/// accepts start path `/foobar`. This is looser than the segment-aware check
/// the W3C spec intends, and is kept on purpose: tightening it would change
/// which manifests install.
pub fn resolve_manifest(
    raw: WebAppManifest,
    manifest_url: &Url,
    document_url: &Url,
) -> Result<WebAppManifest, ManifestError> {
    let mut manifest = raw;

    let start_url = match manifest.start_url.as_deref() {
        Some(raw_start) => document_url.join(raw_start)?,
        None => document_url.clone(),
    };

    let scope = match manifest.scope.as_deref() {
        Some(raw_scope) => document_url.join(raw_scope)?,
        None => start_url.join(".")?,
    };

    if start_url.origin() != document_url.origin() {
        return Err(ManifestError::StartUrlOriginMismatch {
            start_url,
            document_url: document_url.clone(),
        });
    }

    if start_url.origin() != scope.origin() || !start_url.path().starts_with(scope.path()) {
        return Err(ManifestError::StartUrlNotInScope { start_url, scope });
    }

    debug!(
        manifest_url = %manifest_url,
        start_url = %start_url,
        scope = %scope,
        "manifest resolved"
    );

    manifest.start_url = Some(start_url.to_string());
    manifest.scope = Some(scope.to_string());
    Ok(manifest)
}

/// Fetch, parse, resolve, and validate the manifest at `manifest_url`.
///
/// The three failure stages stay distinguishable through [`ManifestError`]:
/// `Fetch` for the network, `Json` for the body, and the validation variants
/// from [`resolve_manifest`].
pub async fn fetch_manifest(
    client: &reqwest::Client,
    manifest_url: &Url,
    document_url: &Url,
) -> Result<WebAppManifest, ManifestError> {
    let body = client
        .get(manifest_url.clone())
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(ManifestError::Fetch)?
        .text()
        .await
        .map_err(ManifestError::Fetch)?;

    let raw: WebAppManifest = serde_json::from_str(&body).map_err(ManifestError::Json)?;
    resolve_manifest(raw, manifest_url, document_url)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
