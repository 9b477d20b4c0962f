// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `cec_hub` library.
//!
//! The engine reports four kinds of failure: the bus was never brought up,
//! a single transmit failed, a bounded wait elapsed, or the troubleshooting
//! stage ran out of attempts for one sub-goal. Value, parse and capability
//! errors cover the configuration surface around it.

use thiserror::Error;

use crate::engine::SubGoal;
use crate::types::LogicalAddress;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// No adapter was ever bound; nothing can reach the bus.
    #[error("CEC not initialized")]
    NotInitialized,

    /// A transmit or receive on the underlying adapter failed.
    #[error("transport fault: {0}")]
    Transport(#[from] TransportFault),

    /// A bounded wait elapsed before the awaited state was reported.
    #[error("timed out after {waited_ms} ms waiting for {awaiting}")]
    Timeout {
        /// How long the caller waited.
        waited_ms: u64,
        /// What was being waited for.
        awaiting: &'static str,
    },

    /// The troubleshooting stage exhausted its retry budget for one sub-goal.
    #[error("{}", .0.failure_message())]
    SubgoalUnmet(SubGoal),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while parsing configuration.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The target device lacks a capability the operation needs.
    #[error("device does not support {capability}")]
    UnsupportedCapability {
        /// The missing capability.
        capability: &'static str,
    },
}

/// Failures of the underlying bus adapter.
///
/// The engine never retries these itself; they abort the running
/// operation immediately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportFault {
    /// The adapter rejected or failed the transmit.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The destination did not acknowledge the frame.
    #[error("frame not acknowledged by {destination}")]
    Nack {
        /// Logical address the frame was sent to.
        destination: LogicalAddress,
    },

    /// The adapter could not be opened or bound.
    #[error("adapter unavailable: {0}")]
    AdapterUnavailable(String),

    /// The notification channel was closed or already taken.
    #[error("notification channel closed")]
    ChannelClosed,
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// A duration that paces a loop was zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// Name of the offending setting.
        field: &'static str,
    },
}

/// Errors related to parsing configuration documents.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PowerTarget;
    use crate::types::InputPort;

    #[test]
    fn not_initialized_display() {
        assert_eq!(Error::NotInitialized.to_string(), "CEC not initialized");
    }

    #[test]
    fn subgoal_unmet_names_the_subgoal() {
        let err = Error::SubgoalUnmet(SubGoal::Power(PowerTarget::On));
        assert_eq!(err.to_string(), "TV did not turn on after retries");

        let err = Error::SubgoalUnmet(SubGoal::ActiveSource(InputPort::new(2).unwrap()));
        assert_eq!(err.to_string(), "input switch failed after retries");
    }

    #[test]
    fn error_from_transport_fault() {
        let err: Error = TransportFault::ChannelClosed.into();
        assert!(matches!(err, Error::Transport(TransportFault::ChannelClosed)));
    }

    #[test]
    fn timeout_display() {
        let err = Error::Timeout {
            waited_ms: 2000,
            awaiting: "power status",
        };
        assert_eq!(err.to_string(), "timed out after 2000 ms waiting for power status");
    }

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 1,
            max: 4,
            actual: 7,
        };
        assert_eq!(err.to_string(), "value 7 is out of range [1, 4]");
    }
}
