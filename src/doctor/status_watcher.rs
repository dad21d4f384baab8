// SPDX-License-Identifier: MIT
//! Periodic companion status polling.
//!
//! While a setup surface is open the host wants a fresh install/update status
//! every few seconds. The watcher recomputes the status on a fixed interval
//! and broadcasts `companion.statusChanged` only when the classification
//! actually changes — a steady `Ok` produces no traffic.
//!
//! Status is never persisted; every tick is a full round trip plus a fresh
//! reconciliation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::connector::CompanionTransport;
use crate::doctor::{check_native_status, CompatStatus};
use crate::events::EventBroadcaster;

fn status_label(status: CompatStatus) -> &'static str {
    match status {
        CompatStatus::Ok => "ok",
        CompatStatus::NeedsInstall => "install",
        CompatStatus::NeedsMandatoryUpdate => "update-required",
        CompatStatus::NeedsOptionalUpdate => "update-optional",
    }
}

/// Background task that re-checks companion status on an interval.
pub struct StatusWatcher {
    transport: Arc<dyn CompanionTransport>,
    broadcaster: Arc<EventBroadcaster>,
    local_version: String,
    skip_checks: bool,
    interval: Duration,
    last: RwLock<Option<CompatStatus>>,
}

impl StatusWatcher {
    pub fn new(
        transport: Arc<dyn CompanionTransport>,
        broadcaster: Arc<EventBroadcaster>,
        local_version: impl Into<String>,
        skip_checks: bool,
        interval: Duration,
    ) -> Self {
        Self {
            transport,
            broadcaster,
            local_version: local_version.into(),
            skip_checks,
            interval,
            last: RwLock::new(None),
        }
    }

    /// Last classification seen by the poll loop, if any tick completed.
    pub async fn last_status(&self) -> Option<CompatStatus> {
        *self.last.read().await
    }

    /// Spawn the background polling loop.
    /// Returns the `JoinHandle` — drop or abort to stop.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                self.poll_once().await;
            }
        })
    }

    /// Single polling pass — checks the status and fires an event on change.
    pub async fn poll_once(&self) {
        let status =
            match check_native_status(&*self.transport, &self.local_version, self.skip_checks)
                .await
            {
                Ok(status) => status,
                Err(e) => {
                    // Transient failures keep the previous classification;
                    // the next tick retries anyway.
                    warn!(err = %e, "companion status check failed");
                    return;
                }
            };

        let mut last = self.last.write().await;
        if *last != Some(status) {
            debug!(?status, "companion status changed");
            self.broadcaster.broadcast(
                "companion.statusChanged",
                serde_json::json!({ "status": status_label(status) }),
            );
            *last = Some(status);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
