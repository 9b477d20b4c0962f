// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power control commands.

use crate::command::Command;
use crate::protocol::Opcode;
use crate::types::LogicalAddress;

/// Command addressing the power state of the target device.
///
/// # Examples
///
/// ```
/// use cec_hub::command::{Command, PowerCommand};
/// use cec_hub::protocol::Opcode;
///
/// assert_eq!(PowerCommand::On.opcode(), Opcode::ImageViewOn);
/// assert_eq!(PowerCommand::Standby.opcode(), Opcode::Standby);
/// assert!(PowerCommand::Query.payload().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCommand {
    /// Wake the device.
    On,
    /// Put the device into standby.
    Standby,
    /// Ask the device to report its power status.
    Query,
}

impl Command for PowerCommand {
    fn opcode(&self) -> Opcode {
        match self {
            Self::On => Opcode::ImageViewOn,
            Self::Standby => Opcode::Standby,
            Self::Query => Opcode::GiveDevicePowerStatus,
        }
    }

    fn destination(&self, device: LogicalAddress) -> LogicalAddress {
        device
    }

    fn payload(&self) -> Vec<u8> {
        Vec::new()
    }

    fn is_query(&self) -> bool {
        matches!(self, Self::Query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes() {
        assert_eq!(PowerCommand::On.opcode(), Opcode::ImageViewOn);
        assert_eq!(PowerCommand::Standby.opcode(), Opcode::Standby);
        assert_eq!(PowerCommand::Query.opcode(), Opcode::GiveDevicePowerStatus);
    }

    #[test]
    fn no_operands() {
        for cmd in [PowerCommand::On, PowerCommand::Standby, PowerCommand::Query] {
            assert!(cmd.payload().is_empty());
        }
    }
}
