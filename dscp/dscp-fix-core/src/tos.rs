// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{dscp::Dscp, ecn::ExplicitCongestionNotification};
use core::fmt;

//= https://www.rfc-editor.org/rfc/rfc2474#section-3
//# A replacement header field, called the DS field, is defined, which is
//# intended to supersede the existing definitions of the IPv4 TOS octet
//# [RFC791] and the IPv6 Traffic Class octet [IPv6].

/// The IPv4 Type of Service byte
///
/// The high six bits hold the [`Dscp`] and the low two bits hold the
/// [`ExplicitCongestionNotification`] marking.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    any(test, feature = "generator"),
    derive(bolero_generator::TypeGenerator)
)]
pub struct Tos(u8);

impl Tos {
    pub const DEFAULT: Self = Self(0);

    #[inline]
    pub const fn new(dscp: Dscp, ecn: ExplicitCongestionNotification) -> Self {
        Self(dscp.to_tos() | ecn.as_u8())
    }

    /// Returns the code point stored in the high six bits
    #[inline]
    pub const fn dscp(self) -> Dscp {
        Dscp::from_tos(self.0)
    }

    #[inline]
    pub const fn ecn(self) -> ExplicitCongestionNotification {
        ExplicitCongestionNotification::new(self.0)
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Tos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tos")
            .field("value", &format_args!("{:#04x}", self.0))
            .field("dscp", &self.dscp())
            .field("ecn", &self.ecn())
            .finish()
    }
}

impl fmt::Display for Tos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

impl From<u8> for Tos {
    #[inline]
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Tos> for u8 {
    #[inline]
    fn from(value: Tos) -> Self {
        value.0
    }
}

impl From<Tos> for u32 {
    #[inline]
    fn from(value: Tos) -> Self {
        value.0 as u32
    }
}

impl From<Dscp> for Tos {
    #[inline]
    fn from(dscp: Dscp) -> Self {
        Self::new(dscp, ExplicitCongestionNotification::NotEct)
    }
}

impl TryFrom<u32> for Tos {
    type Error = OutOfRange;

    #[inline]
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| OutOfRange { value })
    }
}

/// Returned when an option value does not fit in the TOS byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRange {
    pub value: u32,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TOS value {} is outside of 0..=255", self.value)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRange {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_merge_test() {
        bolero::check!().with_type::<u8>().cloned().for_each(|value| {
            let tos = Tos::from(value);
            assert_eq!(tos.dscp().as_u8(), value >> 2);
            assert_eq!(Tos::new(tos.dscp(), tos.ecn()).as_u8(), value);
        });
    }

    #[test]
    fn range_test() {
        bolero::check!().with_type::<u32>().cloned().for_each(|value| {
            match Tos::try_from(value) {
                Ok(tos) => assert_eq!(u32::from(tos), value),
                Err(err) => {
                    assert!(value > 255);
                    assert_eq!(err, OutOfRange { value });
                }
            }
        });
    }

    #[test]
    fn expedited_forwarding_test() {
        let tos = Tos::from(Dscp::EF);
        assert_eq!(tos.as_u8(), 0xb8);
        assert_eq!(tos.ecn(), ExplicitCongestionNotification::NotEct);

        let tos = Tos::from(0x2eu8);
        assert_eq!(tos.dscp().as_u8(), 0x2e >> 2);
        assert_eq!(tos.ecn(), ExplicitCongestionNotification::Ect0);
    }
}
