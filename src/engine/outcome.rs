// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Requests into the engine and the outcomes it hands back.

use std::fmt;

use serde::Serialize;

use crate::error::Error;
use crate::types::{InputPort, PowerState};

/// What a caller wants the television to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRequest {
    /// Turn on, optionally selecting an input as well.
    PowerOn {
        /// Input to select once the TV is on.
        input: Option<InputPort>,
    },
    /// Go to standby.
    PowerOff,
    /// Make sure the TV is on and showing `input`.
    SwitchInput {
        /// Input to select.
        input: InputPort,
    },
}

impl TransitionRequest {
    /// Message reported when the request is confirmed.
    #[must_use]
    pub fn success_message(&self) -> String {
        match self {
            Self::PowerOn { input: None } => "TV turned on".to_string(),
            Self::PowerOn { input: Some(port) } => format!("TV turned on ({port})"),
            Self::PowerOff => "TV turned off".to_string(),
            Self::SwitchInput { input } => format!("switched to {input}"),
        }
    }
}

impl fmt::Display for TransitionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerOn { input: None } => f.write_str("power on"),
            Self::PowerOn { input: Some(port) } => write!(f, "power on to {port}"),
            Self::PowerOff => f.write_str("power off"),
            Self::SwitchInput { input } => write!(f, "switch to {input}"),
        }
    }
}

/// Terminal result of an engine operation, ready for rendering.
///
/// # Examples
///
/// ```
/// use cec_hub::engine::TransitionOutcome;
/// use cec_hub::Error;
///
/// let outcome = TransitionOutcome::failure(&Error::NotInitialized);
/// assert!(!outcome.success);
/// assert_eq!(outcome.message, "CEC not initialized");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    /// Whether the target state was confirmed.
    pub success: bool,
    /// Human-readable result.
    pub message: String,
    /// Power state observed, when the operation reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PowerState>,
}

impl TransitionOutcome {
    /// A confirmed result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            state: None,
        }
    }

    /// A failed result carrying the error's message.
    #[must_use]
    pub fn failure(error: &Error) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            state: None,
        }
    }

    /// Attaches an observed power state.
    #[must_use]
    pub fn with_state(mut self, state: PowerState) -> Self {
        self.state = Some(state);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PowerTarget, SubGoal};

    #[test]
    fn success_messages() {
        assert_eq!(
            TransitionRequest::PowerOn { input: None }.success_message(),
            "TV turned on"
        );
        assert_eq!(TransitionRequest::PowerOff.success_message(), "TV turned off");
        assert_eq!(
            TransitionRequest::SwitchInput {
                input: InputPort::new(2).unwrap()
            }
            .success_message(),
            "switched to HDMI 2"
        );
    }

    #[test]
    fn failure_carries_error_message() {
        let outcome = TransitionOutcome::failure(&Error::SubgoalUnmet(SubGoal::Power(
            PowerTarget::On,
        )));
        assert!(!outcome.success);
        assert_eq!(outcome.message, "TV did not turn on after retries");
    }

    #[test]
    fn serializes_without_absent_state() {
        let json = serde_json::to_value(TransitionOutcome::success("TV turned off")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "message": "TV turned off" })
        );

        let json =
            serde_json::to_value(TransitionOutcome::success("on").with_state(PowerState::On))
                .unwrap();
        assert_eq!(json["state"], "on");
    }
}
