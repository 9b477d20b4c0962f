// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot command transmission.

use crate::command::{Command, PowerCommand, RoutingCommand};
use crate::error::Error;
use crate::protocol::{BusAccess, BusTransport};
use crate::types::{InputPort, LogicalAddress};

/// Sends single commands to one device over a held bus.
///
/// There is no retry and no verification here: a send either reaches the
/// adapter or fails with the adapter's fault.
#[derive(Debug)]
pub struct CommandExecutor<'a, 'bus, T> {
    access: &'a BusAccess<'bus, T>,
    device: LogicalAddress,
}

impl<'a, 'bus, T: BusTransport> CommandExecutor<'a, 'bus, T> {
    /// Creates an executor targeting `device`.
    #[must_use]
    pub fn new(access: &'a BusAccess<'bus, T>, device: LogicalAddress) -> Self {
        Self { access, device }
    }

    /// Returns the targeted device.
    #[must_use]
    pub fn device(&self) -> LogicalAddress {
        self.device
    }

    /// Transmits a command.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the adapter fails the transmit.
    pub async fn send<C: Command + Sync>(&self, command: &C) -> Result<(), Error> {
        let opcode = command.opcode();
        let destination = command.destination(self.device);
        let payload = command.payload();
        tracing::debug!(%opcode, %destination, query = command.is_query(), "Sending command");
        self.access.transmit(destination, opcode, &payload).await
    }

    /// Sends `<Image View On>`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` on adapter failure.
    pub async fn power_on(&self) -> Result<(), Error> {
        self.send(&PowerCommand::On).await
    }

    /// Sends `<Standby>`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` on adapter failure.
    pub async fn standby(&self) -> Result<(), Error> {
        self.send(&PowerCommand::Standby).await
    }

    /// Broadcasts `<Set Stream Path>` for `port`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` on adapter failure.
    pub async fn select_input(&self, port: InputPort) -> Result<(), Error> {
        self.send(&RoutingCommand::SetStreamPath(port)).await
    }
}
