// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus addressing: logical addresses, physical addresses and input ports.

use std::fmt;

use serde::Serialize;

use crate::error::ValueError;

/// Four-bit logical address of a device on the bus.
///
/// # Examples
///
/// ```
/// use cec_hub::types::LogicalAddress;
///
/// assert_eq!(LogicalAddress::TV.value(), 0);
/// assert!(LogicalAddress::BROADCAST.is_broadcast());
/// assert!(LogicalAddress::new(16).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct LogicalAddress(u8);

impl LogicalAddress {
    /// The television.
    pub const TV: Self = Self(0);
    /// Unregistered / broadcast address.
    pub const BROADCAST: Self = Self(15);
    /// Highest valid address.
    pub const MAX: u8 = 15;

    /// Creates a logical address.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `value` does not fit in four bits.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(Self::MAX),
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns true for the broadcast address.
    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        self.0 == Self::MAX
    }
}

impl fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// Sixteen-bit physical address (`a.b.c.d`) locating a device in the HDMI tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PhysicalAddress(u16);

impl PhysicalAddress {
    /// Creates a physical address from its raw value.
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Returns the two operand bytes, high byte first.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Decodes a two-byte operand; any other length yields `None`.
    #[must_use]
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        match payload {
            [hi, lo] => Some(Self(u16::from_be_bytes([*hi, *lo]))),
            _ => None,
        }
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [hi, lo] = self.to_bytes();
        write!(f, "{}.{}.{}.{}", hi >> 4, hi & 0x0f, lo >> 4, lo & 0x0f)
    }
}

/// An HDMI input on the television, numbered 1 to 4.
///
/// # Examples
///
/// ```
/// use cec_hub::types::InputPort;
///
/// let port = InputPort::new(2).unwrap();
/// assert_eq!(port.physical_address().to_string(), "2.0.0.0");
/// assert!(InputPort::new(0).is_err());
/// assert!(InputPort::new(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InputPort(u8);

impl InputPort {
    /// Lowest input number.
    pub const MIN: u8 = 1;
    /// Highest input number.
    pub const MAX: u8 = 4;

    /// Creates an input port.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `number` is not in 1..=4.
    pub fn new(number: u8) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&number) {
            return Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX),
                actual: u16::from(number),
            });
        }
        Ok(Self(number))
    }

    /// Returns the input number.
    #[must_use]
    pub const fn number(&self) -> u8 {
        self.0
    }

    /// Physical address of a source plugged directly into this input.
    #[must_use]
    pub fn physical_address(&self) -> PhysicalAddress {
        PhysicalAddress(u16::from(self.0) << 12)
    }
}

impl fmt::Display for InputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HDMI {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_address_bounds() {
        assert!(LogicalAddress::new(15).is_ok());
        assert_eq!(
            LogicalAddress::new(16).unwrap_err(),
            ValueError::OutOfRange {
                min: 0,
                max: 15,
                actual: 16
            }
        );
    }

    #[test]
    fn physical_address_display() {
        assert_eq!(PhysicalAddress::new(0x1200).to_string(), "1.2.0.0");
        assert_eq!(PhysicalAddress::new(0x0000).to_string(), "0.0.0.0");
    }

    #[test]
    fn physical_address_payload() {
        assert_eq!(
            PhysicalAddress::from_payload(&[0x30, 0x00]),
            Some(PhysicalAddress::new(0x3000))
        );
        assert_eq!(PhysicalAddress::from_payload(&[0x30]), None);
        assert_eq!(PhysicalAddress::new(0x2100).to_bytes(), [0x21, 0x00]);
    }

    #[test]
    fn input_port_range() {
        for n in 1..=4 {
            let port = InputPort::new(n).unwrap();
            assert_eq!(port.number(), n);
            assert_eq!(port.physical_address().raw(), u16::from(n) << 12);
        }
        assert!(InputPort::new(0).is_err());
        assert!(InputPort::new(5).is_err());
    }

    #[test]
    fn input_port_display() {
        assert_eq!(InputPort::new(3).unwrap().to_string(), "HDMI 3");
    }
}
