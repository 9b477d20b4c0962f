// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feeds parsed notifications into the oracles.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::{Notification, parse_notification};
use crate::protocol::{Arrival, BusMessage};
use crate::state::{StatusOracle, StatusReport, TvState};
use crate::types::{LogicalAddress, PhysicalAddress, PowerState};

/// Routes incoming bus messages to the power and active-source oracles.
///
/// Runs on the listener task and never touches the bus channel, so a
/// long-running transition cannot hold up delivery.
#[derive(Debug, Clone)]
pub struct NotificationRouter {
    device: LogicalAddress,
    power: Arc<StatusOracle<PowerState>>,
    active_source: Arc<StatusOracle<PhysicalAddress>>,
    state: Arc<RwLock<TvState>>,
}

impl NotificationRouter {
    /// Creates a router for reports concerning `device`.
    #[must_use]
    pub fn new(
        device: LogicalAddress,
        power: Arc<StatusOracle<PowerState>>,
        active_source: Arc<StatusOracle<PhysicalAddress>>,
        state: Arc<RwLock<TvState>>,
    ) -> Self {
        Self {
            device,
            power,
            active_source,
            state,
        }
    }

    /// Delivers `message`, received at `arrival`, to the matching oracle.
    ///
    /// Returns `false` if the message was filtered out. A report the oracle
    /// refuses as stale still updates the best-known state.
    pub fn dispatch(&self, message: &BusMessage, arrival: Arrival) -> bool {
        let Some(notification) = parse_notification(self.device, message) else {
            tracing::trace!(
                initiator = %message.initiator,
                opcode = message.opcode,
                "Ignoring bus message"
            );
            return false;
        };

        match notification {
            Notification::PowerStatus(power) => {
                tracing::debug!(%power, "Power status reported");
                self.state.write().record_power(power, arrival.received_at());
                self.power.deliver(StatusReport::new(power, arrival));
            }
            Notification::ActiveSource(address) => {
                tracing::debug!(%address, "Active source announced");
                self.state
                    .write()
                    .record_active_source(address, arrival.received_at());
                self.active_source.deliver(StatusReport::new(address, arrival));
            }
        }
        true
    }

    /// Drains `rx` until every sender is gone.
    pub async fn run(self, mut rx: mpsc::Receiver<(Arrival, BusMessage)>) {
        while let Some((arrival, message)) = rx.recv().await {
            self.dispatch(&message, arrival);
        }
        tracing::debug!("Notification stream closed, listener exiting");
    }
}
