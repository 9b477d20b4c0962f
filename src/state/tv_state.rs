// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Best-known state of the television.

use tokio::time::Instant;

use crate::types::{PhysicalAddress, PowerState};

/// Last values the television reported, whatever asked for them.
///
/// Unlike a [`StatusOracle`](super::StatusOracle), this snapshot is never
/// cleared; it is what the engine falls back to when describing the TV
/// without querying it.
///
/// # Examples
///
/// ```
/// use cec_hub::state::TvState;
/// use cec_hub::types::PowerState;
/// use tokio::time::Instant;
///
/// let mut state = TvState::new();
/// assert_eq!(state.power(), PowerState::Unknown);
///
/// let at = Instant::now();
/// state.record_power(PowerState::On, at);
/// assert_eq!(state.power(), PowerState::On);
/// assert_eq!(state.updated_at(), Some(at));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TvState {
    power: PowerState,
    active_source: Option<PhysicalAddress>,
    updated_at: Option<Instant>,
}

impl TvState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported power state.
    #[must_use]
    pub const fn power(&self) -> PowerState {
        self.power
    }

    /// Last announced active source.
    #[must_use]
    pub const fn active_source(&self) -> Option<PhysicalAddress> {
        self.active_source
    }

    /// When anything was last recorded.
    #[must_use]
    pub const fn updated_at(&self) -> Option<Instant> {
        self.updated_at
    }

    /// Records a power report received at `at`.
    pub fn record_power(&mut self, power: PowerState, at: Instant) {
        self.power = power;
        self.updated_at = Some(at);
    }

    /// Records an active source announcement received at `at`.
    pub fn record_active_source(&mut self, address: PhysicalAddress, at: Instant) {
        self.active_source = Some(address);
        self.updated_at = Some(at);
    }
}
