// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the library.
//!
//! Constrained values validate on construction, so an [`InputPort`] in hand
//! is always one of the television's four HDMI inputs.

mod address;
mod power;

pub use address::{InputPort, LogicalAddress, PhysicalAddress};
pub use power::PowerState;
