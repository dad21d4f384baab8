// SPDX-License-Identifier: MIT
//! Companion compatibility checks.
//!
//! Classifies the pairing between the extension host's own version and the
//! version the native companion reports. The comparison itself is a pure
//! function over two semver strings; [`check_native_status`] wraps it with
//! the `GetSystemVersions` round trip and maps an unreachable peer to
//! [`CompatStatus::NeedsInstall`].

pub mod status_watcher;

use semver::{Version, VersionReq};
use tracing::debug;

use crate::connector::{CompanionTransport, ConnectorError, Request, Response};

/// Outcome of comparing the local and companion versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatStatus {
    /// Versions are equal or within the compatible range.
    Ok,
    /// Companion program or its browser runtime is not installed.
    NeedsInstall,
    /// Versions are incompatible — most operations will misbehave.
    NeedsMandatoryUpdate,
    /// Companion is newer but still compatible; a warning, not a blocker.
    NeedsOptionalUpdate,
}

#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("malformed version string {string:?}: {source}")]
    Parse {
        string: String,
        #[source]
        source: semver::Error,
    },
}

fn parse(string: &str) -> Result<Version, VersionError> {
    Version::parse(string).map_err(|source| VersionError::Parse {
        string: string.to_string(),
        source,
    })
}

/// Classify the local/companion version pairing.
///
/// * `remote` is `None` when the companion answered but reported no version —
///   treated the same as not installed.
/// * `runtime_present` is the companion's report of whether its browser
///   runtime exists; an incomplete companion is equivalent to an absent one,
///   and this can never be overridden.
/// * `skip_checks` is the operator override: it forces `Ok` before any
///   version comparison happens, so even malformed versions pass.
///
/// A newer companion is acceptable only while it satisfies `^local` (caret
/// range); an older companion is never acceptable — the extension side cannot
/// assume newer contract behavior from an older peer.
pub fn reconcile_versions(
    local: &str,
    remote: Option<&str>,
    runtime_present: bool,
    skip_checks: bool,
) -> Result<CompatStatus, VersionError> {
    // Install checks come first: they hold regardless of version values,
    // so nothing gets parsed before them.
    let Some(remote) = remote else {
        return Ok(CompatStatus::NeedsInstall);
    };
    if !runtime_present {
        return Ok(CompatStatus::NeedsInstall);
    }

    if skip_checks {
        return Ok(CompatStatus::Ok);
    }

    let local = parse(local)?;
    let remote = parse(remote)?;

    if local == remote {
        return Ok(CompatStatus::Ok);
    }

    if local > remote {
        return Ok(CompatStatus::NeedsMandatoryUpdate);
    }

    // Companion is newer. Compatible while it stays inside ^local.
    let caret = VersionReq::parse(&format!("^{local}")).map_err(|source| VersionError::Parse {
        string: local.to_string(),
        source,
    })?;

    if caret.matches(&remote) {
        Ok(CompatStatus::NeedsOptionalUpdate)
    } else {
        Ok(CompatStatus::NeedsMandatoryUpdate)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("companion reported an error: {0}")]
    Companion(String),

    #[error("unexpected companion response: {0:?}")]
    UnexpectedResponse(Response),
}

/// Ask the companion for its versions and classify the pairing.
///
/// An unreachable peer is a valid outcome (`NeedsInstall`), not an error;
/// a companion that answers with an `Error` response or a mismatched tag is
/// a real failure the caller must surface.
pub async fn check_native_status<T: CompanionTransport + ?Sized>(
    transport: &T,
    local_version: &str,
    skip_checks: bool,
) -> Result<CompatStatus, DoctorError> {
    let versions = match transport.exchange(Request::GetSystemVersions).await {
        Ok(Response::SystemVersions(versions)) => versions,
        Ok(Response::Error(message)) => return Err(DoctorError::Companion(message)),
        Ok(other) => return Err(DoctorError::UnexpectedResponse(other)),
        Err(ConnectorError::PeerUnreachable(err)) => {
            debug!(err = %err, "companion unreachable — needs install");
            return Ok(CompatStatus::NeedsInstall);
        }
        Err(other) => return Err(other.into()),
    };

    let status = reconcile_versions(
        local_version,
        versions.companion.as_deref(),
        versions.runtime.is_some(),
        skip_checks,
    )?;

    debug!(?status, companion = ?versions.companion, "native status checked");
    Ok(status)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
