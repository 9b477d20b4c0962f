// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CEC command definitions.
//!
//! Each command is a typed value that knows its opcode, where it goes and
//! what operands it carries.
//!
//! # Available Commands
//!
//! | Command Type | Opcode | Destination |
//! |-------------|--------|-------------|
//! | [`PowerCommand::On`] | `<Image View On>` | TV |
//! | [`PowerCommand::Standby`] | `<Standby>` | TV |
//! | [`PowerCommand::Query`] | `<Give Device Power Status>` | TV |
//! | [`RoutingCommand::SetStreamPath`] | `<Set Stream Path>` | broadcast |
//! | [`RoutingCommand::RequestActiveSource`] | `<Request Active Source>` | broadcast |
//!
//! # Examples
//!
//! ```
//! use cec_hub::command::{Command, RoutingCommand};
//! use cec_hub::protocol::Opcode;
//! use cec_hub::types::{InputPort, LogicalAddress};
//!
//! let cmd = RoutingCommand::SetStreamPath(InputPort::new(2).unwrap());
//! assert_eq!(cmd.opcode(), Opcode::SetStreamPath);
//! assert_eq!(cmd.destination(LogicalAddress::TV), LogicalAddress::BROADCAST);
//! assert_eq!(cmd.payload(), vec![0x20, 0x00]);
//! ```

mod executor;
mod power;
mod routing;

pub use executor::CommandExecutor;
pub use power::PowerCommand;
pub use routing::RoutingCommand;

use crate::protocol::Opcode;
use crate::types::LogicalAddress;

/// A message the engine can put on the bus.
pub trait Command {
    /// Returns the message opcode.
    fn opcode(&self) -> Opcode;

    /// Returns the addressee, given the logical address of the target device.
    ///
    /// Directed commands go to `device`; broadcasts ignore it.
    fn destination(&self, device: LogicalAddress) -> LogicalAddress;

    /// Returns the operand bytes.
    fn payload(&self) -> Vec<u8>;

    /// Returns true if this command asks for a report rather than changing state.
    fn is_query(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InputPort;

    #[test]
    fn directed_commands_go_to_device() {
        let tv = LogicalAddress::TV;
        assert_eq!(PowerCommand::On.destination(tv), tv);
        assert_eq!(PowerCommand::Standby.destination(tv), tv);
        assert_eq!(PowerCommand::Query.destination(tv), tv);
    }

    #[test]
    fn routing_commands_broadcast() {
        let tv = LogicalAddress::TV;
        let port = InputPort::new(1).unwrap();
        assert!(RoutingCommand::SetStreamPath(port).destination(tv).is_broadcast());
        assert!(RoutingCommand::RequestActiveSource.destination(tv).is_broadcast());
    }

    #[test]
    fn queries_are_flagged() {
        assert!(PowerCommand::Query.is_query());
        assert!(RoutingCommand::RequestActiveSource.is_query());
        assert!(!PowerCommand::On.is_query());
    }
}
