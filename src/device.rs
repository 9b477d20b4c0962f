// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device the engine controls.

use crate::capabilities::Capabilities;
use crate::types::LogicalAddress;

/// A single addressable endpoint on the bus.
///
/// Fixed for the lifetime of an engine.
///
/// # Examples
///
/// ```
/// use cec_hub::{Capabilities, Device};
/// use cec_hub::types::LogicalAddress;
///
/// let tv = Device::television();
/// assert_eq!(tv.logical_address(), LogicalAddress::TV);
///
/// let projector = Device::new(LogicalAddress::TV, Capabilities::power_only());
/// assert!(!projector.capabilities().input_select);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    logical_address: LogicalAddress,
    capabilities: Capabilities,
}

impl Device {
    /// Creates a device description.
    #[must_use]
    pub const fn new(logical_address: LogicalAddress, capabilities: Capabilities) -> Self {
        Self {
            logical_address,
            capabilities,
        }
    }

    /// The television at logical address 0 with full capabilities.
    #[must_use]
    pub const fn television() -> Self {
        Self::new(LogicalAddress::TV, Capabilities::television())
    }

    /// Returns the logical address.
    #[must_use]
    pub const fn logical_address(&self) -> LogicalAddress {
        self.logical_address
    }

    /// Returns the declared capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::television()
    }
}
