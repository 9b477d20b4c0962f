// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interpretation of incoming bus messages.
//!
//! The adapter forwards everything it sees. Only two kinds of message
//! matter to the engine:
//!
//! - `<Report Power Status>` sent by the target device
//! - `<Active Source>` broadcast by whichever source is now selected
//!
//! Everything else is dropped here, before it reaches any
//! [`StatusOracle`](crate::state::StatusOracle).
//!
//! # Examples
//!
//! ```
//! use cec_hub::protocol::{BusMessage, Opcode};
//! use cec_hub::telemetry::{Notification, parse_notification};
//! use cec_hub::types::{LogicalAddress, PowerState};
//!
//! let msg = BusMessage::new(
//!     LogicalAddress::TV,
//!     LogicalAddress::new(1).unwrap(),
//!     Opcode::ReportPowerStatus,
//!     vec![0x00],
//! );
//! assert_eq!(
//!     parse_notification(LogicalAddress::TV, &msg),
//!     Some(Notification::PowerStatus(PowerState::On))
//! );
//! ```

mod router;

pub use router::NotificationRouter;

use crate::protocol::{BusMessage, Opcode};
use crate::types::{LogicalAddress, PhysicalAddress, PowerState};

/// A bus message the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The target device reported its power status.
    PowerStatus(PowerState),
    /// A source announced itself as active.
    ActiveSource(PhysicalAddress),
}

/// Extracts a [`Notification`] from a raw message.
///
/// Power reports from devices other than `device` are ignored. A power
/// report with a malformed operand still counts, as
/// [`PowerState::Unknown`]. An `<Active Source>` without a two-byte
/// operand is ignored.
#[must_use]
pub fn parse_notification(device: LogicalAddress, message: &BusMessage) -> Option<Notification> {
    match Opcode::from_u8(message.opcode)? {
        Opcode::ReportPowerStatus if message.initiator == device => Some(
            Notification::PowerStatus(PowerState::from_report_payload(&message.payload)),
        ),
        Opcode::ActiveSource => {
            PhysicalAddress::from_payload(&message.payload).map(Notification::ActiveSource)
        }
        _ => None,
    }
}
