// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capabilities.
//!
//! Not every CEC sink honors every message. Capabilities are declared up
//! front and checked before an operation touches the bus, so a request the
//! device cannot fulfil fails fast instead of burning its retry budget.

use crate::engine::TransitionRequest;
use crate::error::Error;

/// Capabilities of a CEC device.
///
/// # Examples
///
/// ```
/// use cec_hub::Capabilities;
///
/// let tv = Capabilities::television();
/// assert!(tv.input_select);
///
/// let display = Capabilities::power_only();
/// assert!(display.power_on);
/// assert!(!display.input_select);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
// Each flag is an independent protocol feature.
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Answers `<Give Device Power Status>`.
    pub power_query: bool,

    /// Wakes on `<Image View On>`.
    pub power_on: bool,

    /// Honors `<Standby>`.
    pub standby: bool,

    /// Follows `<Set Stream Path>`.
    pub input_select: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::television()
    }
}

impl Capabilities {
    /// Capabilities of a typical television: everything.
    #[must_use]
    pub const fn television() -> Self {
        Self {
            power_query: true,
            power_on: true,
            standby: true,
            input_select: true,
        }
    }

    /// A display that can be switched on and off but not routed.
    #[must_use]
    pub const fn power_only() -> Self {
        Self {
            power_query: true,
            power_on: true,
            standby: true,
            input_select: false,
        }
    }

    /// A device that declares nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            power_query: false,
            power_on: false,
            standby: false,
            input_select: false,
        }
    }

    /// Checks that every capability `request` relies on is present.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedCapability` naming the first missing one.
    pub fn ensure_supports(&self, request: &TransitionRequest) -> Result<(), Error> {
        let needs_input = match request {
            TransitionRequest::PowerOn { input } => {
                self.require(self.power_on, "power on")?;
                input.is_some()
            }
            TransitionRequest::PowerOff => {
                self.require(self.standby, "standby")?;
                false
            }
            TransitionRequest::SwitchInput { .. } => {
                self.require(self.power_on, "power on")?;
                true
            }
        };
        if needs_input {
            self.require(self.input_select, "input select")?;
        }
        self.ensure_power_query()
    }

    /// Checks that power status can be queried.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedCapability` if it cannot.
    pub fn ensure_power_query(&self) -> Result<(), Error> {
        self.require(self.power_query, "power query")
    }

    #[allow(clippy::unused_self)]
    fn require(&self, present: bool, capability: &'static str) -> Result<(), Error> {
        if present {
            Ok(())
        } else {
            Err(Error::UnsupportedCapability { capability })
        }
    }
}

/// Builder for creating custom capabilities.
///
/// Starts from [`Capabilities::none`].
#[derive(Debug)]
pub struct CapabilitiesBuilder {
    inner: Capabilities,
}

impl Default for CapabilitiesBuilder {
    fn default() -> Self {
        Self {
            inner: Capabilities::none(),
        }
    }
}

impl CapabilitiesBuilder {
    /// Creates a new builder with no capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables power status queries.
    #[must_use]
    pub fn with_power_query(mut self) -> Self {
        self.inner.power_query = true;
        self
    }

    /// Enables power on.
    #[must_use]
    pub fn with_power_on(mut self) -> Self {
        self.inner.power_on = true;
        self
    }

    /// Enables standby.
    #[must_use]
    pub fn with_standby(mut self) -> Self {
        self.inner.standby = true;
        self
    }

    /// Enables input selection.
    #[must_use]
    pub fn with_input_select(mut self) -> Self {
        self.inner.input_select = true;
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.inner
    }
}
