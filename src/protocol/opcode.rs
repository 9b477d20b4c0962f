// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The subset of CEC opcodes the engine speaks.

use std::fmt;

/// CEC message opcodes used for power and routing control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// `<Image View On>`: wakes the TV.
    ImageViewOn = 0x04,
    /// `<Standby>`: puts the destination into standby.
    Standby = 0x36,
    /// `<Active Source>`: broadcast naming the current source.
    ActiveSource = 0x82,
    /// `<Request Active Source>`: asks the current source to announce itself.
    RequestActiveSource = 0x85,
    /// `<Set Stream Path>`: asks the TV to switch to a physical address.
    SetStreamPath = 0x86,
    /// `<Give Device Power Status>`: power status query.
    GiveDevicePowerStatus = 0x8F,
    /// `<Report Power Status>`: answer to a power status query.
    ReportPowerStatus = 0x90,
}

impl Opcode {
    /// Returns the wire value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Looks up a known opcode; unrecognized values yield `None`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x04 => Some(Self::ImageViewOn),
            0x36 => Some(Self::Standby),
            0x82 => Some(Self::ActiveSource),
            0x85 => Some(Self::RequestActiveSource),
            0x86 => Some(Self::SetStreamPath),
            0x8F => Some(Self::GiveDevicePowerStatus),
            0x90 => Some(Self::ReportPowerStatus),
            _ => None,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(0x{:02X})", self, self.value())
    }
}
