// SPDX-License-Identifier: MIT
//! Bridge configuration.
//!
//! A small TOML file layered over built-in defaults. The interesting knob is
//! `skip_version_checks` — the "secret" operator override that makes the
//! doctor report `Ok` without comparing versions. A broken config file is
//! logged and ignored; defaults always win over a parse error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::error;

const DEFAULT_COMPANION_NAME: &str = "firefoxpwa";
const DEFAULT_STATUS_POLL_SECS: u64 = 10;

/// Effective configuration after layering file values over defaults.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Native messaging name of the companion program.
    pub companion_name: String,
    /// Skip companion version checks entirely and report `Ok`.
    /// The runtime-presence check still applies — that one cannot be disabled.
    pub skip_version_checks: bool,
    /// Seconds between companion status polls while a setup surface is open.
    pub status_poll_secs: u64,
    /// Default profile template applied when installing a new site.
    pub default_profile_template: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            companion_name: DEFAULT_COMPANION_NAME.to_string(),
            skip_version_checks: false,
            status_poll_secs: DEFAULT_STATUS_POLL_SECS,
            default_profile_template: None,
        }
    }
}

/// Raw `config.toml` shape — everything optional so a partial file works.
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfig {
    /// Native messaging name of the companion program (default: "firefoxpwa").
    companion_name: Option<String>,
    /// Disable update/version checking (default: false).
    skip_version_checks: Option<bool>,
    /// Status poll interval in seconds (default: 10).
    status_poll_secs: Option<u64>,
    /// Default profile template for new sites.
    default_profile_template: Option<String>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

impl BridgeConfig {
    /// Load `{data_dir}/config.toml` over the built-in defaults.
    ///
    /// Missing file or unreadable TOML both fall back to defaults.
    pub fn load(data_dir: &Path) -> Self {
        let toml = load_toml(data_dir).unwrap_or_default();
        let defaults = Self::default();

        Self {
            companion_name: toml.companion_name.unwrap_or(defaults.companion_name),
            skip_version_checks: toml
                .skip_version_checks
                .unwrap_or(defaults.skip_version_checks),
            status_poll_secs: toml.status_poll_secs.unwrap_or(defaults.status_poll_secs),
            default_profile_template: toml.default_profile_template,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
