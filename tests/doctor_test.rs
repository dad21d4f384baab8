// SPDX-License-Identifier: MIT
//! Integration tests for sitebridge::doctor — status classification over a
//! real (in-memory) companion channel, plus property tests for the pure
//! reconciliation function.

use async_trait::async_trait;
use proptest::prelude::*;
use sitebridge::connector::{ConnectorError, Request, Response, SystemVersions};
use sitebridge::{check_native_status, reconcile_versions, CompanionTransport, CompatStatus};

/// Transport that always answers with a fixed response.
struct FixedTransport(Response);

#[async_trait]
impl CompanionTransport for FixedTransport {
    async fn exchange(&self, request: Request) -> Result<Response, ConnectorError> {
        assert_eq!(request, Request::GetSystemVersions);
        Ok(self.0.clone())
    }
}

/// Transport whose peer never answers.
struct DeadTransport;

#[async_trait]
impl CompanionTransport for DeadTransport {
    async fn exchange(&self, _request: Request) -> Result<Response, ConnectorError> {
        Err(ConnectorError::PeerUnreachable(std::io::Error::from(
            std::io::ErrorKind::BrokenPipe,
        )))
    }
}

fn answering(companion: Option<&str>, runtime: Option<&str>) -> FixedTransport {
    FixedTransport(Response::SystemVersions(SystemVersions {
        companion: companion.map(str::to_string),
        runtime: runtime.map(str::to_string),
    }))
}

#[tokio::test]
async fn test_matching_versions_report_ok() {
    let transport = answering(Some("2.3.0"), Some("128.0.0"));
    let status = check_native_status(&transport, "2.3.0", false).await.unwrap();
    assert_eq!(status, CompatStatus::Ok);
}

#[tokio::test]
async fn test_newer_compatible_companion_reports_optional_update() {
    let transport = answering(Some("2.5.1"), Some("128.0.0"));
    let status = check_native_status(&transport, "2.3.0", false).await.unwrap();
    assert_eq!(status, CompatStatus::NeedsOptionalUpdate);
}

#[tokio::test]
async fn test_major_bump_reports_mandatory_update() {
    let transport = answering(Some("3.0.0"), Some("128.0.0"));
    let status = check_native_status(&transport, "2.3.0", false).await.unwrap();
    assert_eq!(status, CompatStatus::NeedsMandatoryUpdate);
}

#[tokio::test]
async fn test_missing_runtime_reports_install() {
    let transport = answering(Some("2.3.0"), None);
    let status = check_native_status(&transport, "2.3.0", false).await.unwrap();
    assert_eq!(status, CompatStatus::NeedsInstall);
}

#[tokio::test]
async fn test_unreachable_peer_reports_install_not_error() {
    let status = check_native_status(&DeadTransport, "2.3.0", false).await.unwrap();
    assert_eq!(status, CompatStatus::NeedsInstall);
}

#[tokio::test]
async fn test_companion_error_response_is_surfaced() {
    let transport = FixedTransport(Response::Error("storage corrupted".to_string()));
    let err = check_native_status(&transport, "2.3.0", false).await.unwrap_err();
    assert!(err.to_string().contains("storage corrupted"));
}

#[tokio::test]
async fn test_mismatched_response_tag_is_surfaced() {
    let transport = FixedTransport(Response::SiteUninstalled);
    let err = check_native_status(&transport, "2.3.0", false).await.unwrap_err();
    assert!(err.to_string().contains("unexpected companion response"));
}

// ─── Properties of the pure reconciliation ───────────────────────────────────

fn version_strategy() -> impl Strategy<Value = (u64, u64, u64)> {
    (0u64..20, 0u64..20, 0u64..20)
}

fn fmt(v: (u64, u64, u64)) -> String {
    format!("{}.{}.{}", v.0, v.1, v.2)
}

proptest! {
    #[test]
    fn prop_equal_versions_are_ok(v in version_strategy()) {
        let v = fmt(v);
        prop_assert_eq!(
            reconcile_versions(&v, Some(&v), true, false).unwrap(),
            CompatStatus::Ok
        );
    }

    #[test]
    fn prop_absent_runtime_always_installs(local in version_strategy(), remote in version_strategy()) {
        prop_assert_eq!(
            reconcile_versions(&fmt(local), Some(&fmt(remote)), false, false).unwrap(),
            CompatStatus::NeedsInstall
        );
    }

    #[test]
    fn prop_override_short_circuits_comparison(local in version_strategy(), remote in version_strategy()) {
        prop_assert_eq!(
            reconcile_versions(&fmt(local), Some(&fmt(remote)), true, true).unwrap(),
            CompatStatus::Ok
        );
    }

    #[test]
    fn prop_older_companion_needs_mandatory_update(local in version_strategy(), remote in version_strategy()) {
        prop_assume!(remote < local);
        prop_assert_eq!(
            reconcile_versions(&fmt(local), Some(&fmt(remote)), true, false).unwrap(),
            CompatStatus::NeedsMandatoryUpdate
        );
    }

    #[test]
    fn prop_newer_same_major_is_optional(major in 1u64..20, lminor in 0u64..20, rminor in 0u64..20, patch in 0u64..20) {
        prop_assume!(rminor > lminor);
        let local = format!("{major}.{lminor}.0");
        let remote = format!("{major}.{rminor}.{patch}");
        prop_assert_eq!(
            reconcile_versions(&local, Some(&remote), true, false).unwrap(),
            CompatStatus::NeedsOptionalUpdate
        );
    }

    #[test]
    fn prop_newer_different_major_is_mandatory(lmajor in 1u64..10, bump in 1u64..10, minor in 0u64..20) {
        let local = format!("{lmajor}.{minor}.0");
        let remote = format!("{}.0.0", lmajor + bump);
        prop_assert_eq!(
            reconcile_versions(&local, Some(&remote), true, false).unwrap(),
            CompatStatus::NeedsMandatoryUpdate
        );
    }

    #[test]
    fn prop_missing_remote_always_installs(local in version_strategy(), runtime in any::<bool>()) {
        prop_assert_eq!(
            reconcile_versions(&fmt(local), None, runtime, false).unwrap(),
            CompatStatus::NeedsInstall
        );
    }
}
