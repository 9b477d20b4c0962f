// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reported device state.
//!
//! - [`StatusOracle`]: latest report of one kind plus a bounded wait for the next
//! - [`TvState`]: accumulated best-known state, never cleared

mod oracle;
mod tv_state;

pub use oracle::{StatusOracle, StatusReport};
pub use tv_state::TvState;
