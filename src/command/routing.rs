// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input routing commands.

use crate::command::Command;
use crate::protocol::Opcode;
use crate::types::{InputPort, LogicalAddress};

/// Command selecting or querying the active source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingCommand {
    /// Ask the TV to switch to the source on this input.
    SetStreamPath(InputPort),
    /// Ask the current source to announce itself with `<Active Source>`.
    RequestActiveSource,
}

impl Command for RoutingCommand {
    fn opcode(&self) -> Opcode {
        match self {
            Self::SetStreamPath(_) => Opcode::SetStreamPath,
            Self::RequestActiveSource => Opcode::RequestActiveSource,
        }
    }

    fn destination(&self, _device: LogicalAddress) -> LogicalAddress {
        LogicalAddress::BROADCAST
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            Self::SetStreamPath(port) => port.physical_address().to_bytes().to_vec(),
            Self::RequestActiveSource => Vec::new(),
        }
    }

    fn is_query(&self) -> bool {
        matches!(self, Self::RequestActiveSource)
    }
}
