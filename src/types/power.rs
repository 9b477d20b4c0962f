// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state reported by a CEC device.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValueError;

/// Power state of the television as last reported on the bus.
///
/// `Unknown` is both the initial value and the result of any report
/// that could not be parsed.
///
/// # Examples
///
/// ```
/// use cec_hub::types::PowerState;
///
/// assert_eq!(PowerState::from_report_byte(0x00), PowerState::On);
/// assert_eq!(PowerState::from_report_byte(0x02), PowerState::TransitioningToOn);
/// assert_eq!(PowerState::from_report_byte(0x7f), PowerState::Unknown);
/// assert!(PowerState::TransitioningToStandby.is_transitional());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// The device is fully on.
    On,
    /// The device is in standby.
    Standby,
    /// Standby to on transition in progress.
    TransitioningToOn,
    /// On to standby transition in progress.
    TransitioningToStandby,
    /// No parseable report has been seen.
    #[default]
    Unknown,
}

impl PowerState {
    /// Decodes the `[Power Status]` operand of a `Report Power Status` message.
    #[must_use]
    pub const fn from_report_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::On,
            0x01 => Self::Standby,
            0x02 => Self::TransitioningToOn,
            0x03 => Self::TransitioningToStandby,
            _ => Self::Unknown,
        }
    }

    /// Decodes a full report payload; anything but exactly one operand is `Unknown`.
    #[must_use]
    pub fn from_report_payload(payload: &[u8]) -> Self {
        match payload {
            [byte] => Self::from_report_byte(*byte),
            _ => Self::Unknown,
        }
    }

    /// Returns the operand byte for this state, if it has one.
    #[must_use]
    pub const fn report_byte(&self) -> Option<u8> {
        match self {
            Self::On => Some(0x00),
            Self::Standby => Some(0x01),
            Self::TransitioningToOn => Some(0x02),
            Self::TransitioningToStandby => Some(0x03),
            Self::Unknown => None,
        }
    }

    /// Returns true while the device is between on and standby.
    #[must_use]
    pub const fn is_transitional(&self) -> bool {
        matches!(self, Self::TransitioningToOn | Self::TransitioningToStandby)
    }

    /// Returns the lowercase name used in outcome messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Standby => "standby",
            Self::TransitioningToOn => "transitioning to on",
            Self::TransitioningToStandby => "transitioning to standby",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" => Ok(Self::On),
            "standby" | "off" => Ok(Self::Standby),
            "transitioning to on" | "transitioning_to_on" => Ok(Self::TransitioningToOn),
            "transitioning to standby" | "transitioning_to_standby" => {
                Ok(Self::TransitioningToStandby)
            }
            "unknown" => Ok(Self::Unknown),
            _ => Err(ValueError::InvalidPowerState(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_bytes_decode() {
        assert_eq!(PowerState::from_report_byte(0), PowerState::On);
        assert_eq!(PowerState::from_report_byte(1), PowerState::Standby);
        assert_eq!(PowerState::from_report_byte(2), PowerState::TransitioningToOn);
        assert_eq!(
            PowerState::from_report_byte(3),
            PowerState::TransitioningToStandby
        );
        assert_eq!(PowerState::from_report_byte(4), PowerState::Unknown);
    }

    #[test]
    fn malformed_payload_is_unknown() {
        assert_eq!(PowerState::from_report_payload(&[]), PowerState::Unknown);
        assert_eq!(PowerState::from_report_payload(&[0, 1]), PowerState::Unknown);
        assert_eq!(PowerState::from_report_payload(&[1]), PowerState::Standby);
    }

    #[test]
    fn default_is_unknown() {
        assert_eq!(PowerState::default(), PowerState::Unknown);
    }

    #[test]
    fn transitional_states() {
        assert!(PowerState::TransitioningToOn.is_transitional());
        assert!(!PowerState::On.is_transitional());
        assert!(!PowerState::Unknown.is_transitional());
    }

    #[test]
    fn from_str_accepts_off_alias() {
        assert_eq!("OFF".parse::<PowerState>().unwrap(), PowerState::Standby);
        assert_eq!("on".parse::<PowerState>().unwrap(), PowerState::On);
        assert!(matches!(
            "dim".parse::<PowerState>(),
            Err(ValueError::InvalidPowerState(_))
        ));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&PowerState::TransitioningToOn).unwrap();
        assert_eq!(json, "\"transitioning_to_on\"");
    }
}
