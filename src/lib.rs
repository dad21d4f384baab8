// SPDX-License-Identifier: MIT
//! sitebridge — decision core for installing web sites as desktop apps.
//!
//! The browser-extension host owns all UI and all I/O scheduling; this crate
//! owns the decisions: is the native companion installed and compatible, is a
//! fetched Web App Manifest valid for installation, and which icon fits a
//! target size. The companion wire protocol and its framing live in
//! [`connector`]; everything above it is pure or transport-generic and
//! testable without a browser.

pub mod config;
pub mod connector;
pub mod doctor;
pub mod events;
pub mod manifest;

pub use config::BridgeConfig;
pub use connector::{CompanionTransport, Connector, ConnectorError, Request, Response};
pub use doctor::{check_native_status, reconcile_versions, CompatStatus};
pub use events::EventBroadcaster;
pub use manifest::{fetch_manifest, resolve_manifest, ManifestError, WebAppManifest};
