// SPDX-License-Identifier: MIT
//! Icon selection.
//!
//! Picks the best manifest icon for a target pixel size: the smallest icon
//! at least as large as the target, otherwise the largest available. The
//! literal size token `any` matches every requested size. Total — no icons
//! matching the purpose is a valid `None`, never an error.

use serde::{Deserialize, Serialize};

/// Size assigned to the `any` token — larger than every real request.
const SIZE_ANY: u64 = u64::MAX;

/// A single icon entry from a manifest or page-info object.
///
/// `purpose` and `sizes` keep the manifest's space-separated string form
/// (`"any maskable"`, `"48x48 96x96"`) — the split happens at selection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconDescriptor {
    pub src: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default = "default_purpose")]
    pub purpose: String,
    #[serde(default)]
    pub sizes: String,
}

fn default_purpose() -> String {
    "any".to_string()
}

impl IconDescriptor {
    pub fn new(src: impl Into<String>, sizes: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: None,
            purpose: default_purpose(),
            sizes: sizes.into(),
        }
    }

    fn has_purpose(&self, purpose: &str) -> bool {
        self.purpose.split(' ').any(|p| p == purpose)
    }
}

/// Parse one size spec: `"96x96"` → 96, `"any"` → [`SIZE_ANY`].
///
/// Only the leading dimension matters; a spec with no leading digits is
/// skipped entirely.
fn parse_size(spec: &str) -> Option<u64> {
    if spec == "any" {
        return Some(SIZE_ANY);
    }
    let digits: String = spec.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Expand descriptors into `(descriptor, size)` pairs for one purpose,
/// sorted ascending by size.
pub fn build_icon_list<'a>(
    icons: &'a [IconDescriptor],
    purpose: &str,
) -> Vec<(&'a IconDescriptor, u64)> {
    let mut list = Vec::new();

    for icon in icons {
        if !icon.has_purpose(purpose) {
            continue;
        }
        for spec in icon.sizes.split(' ') {
            if let Some(size) = parse_size(spec) {
                list.push((icon, size));
            }
        }
    }

    list.sort_by_key(|&(_, size)| size);
    list
}

/// Select the smallest icon that is at least `size` pixels, falling back to
/// the largest icon overall. `None` when nothing matches the purpose.
pub fn select_icon<'a>(
    icons: &'a [IconDescriptor],
    purpose: &str,
    size: u64,
) -> Option<&'a IconDescriptor> {
    let list = build_icon_list(icons, purpose);

    list.iter()
        .find(|&&(_, candidate)| candidate >= size)
        .or_else(|| list.last())
        .map(|&(icon, _)| icon)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
