// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//= https://www.rfc-editor.org/rfc/rfc3168#section-5
//# This document specifies that the Internet provide a congestion
//# indication for incipient congestion (as in RED and earlier work
//# [RJ90]) where the notification can sometimes be through marking
//# packets rather than dropping them.

const ECN_MASK: u8 = 0b11;

/// The two low-order bits of the TOS byte
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    any(test, feature = "generator"),
    derive(bolero_generator::TypeGenerator)
)]
#[repr(u8)]
pub enum ExplicitCongestionNotification {
    /// Not ECN-Capable Transport
    #[default]
    NotEct = 0b00,
    /// ECN Capable Transport(1)
    Ect1 = 0b01,
    /// ECN Capable Transport(0)
    Ect0 = 0b10,
    /// Congestion Experienced
    Ce = 0b11,
}

impl ExplicitCongestionNotification {
    /// Creates an `ExplicitCongestionNotification` from the low two bits of `value`
    #[inline]
    pub const fn new(value: u8) -> Self {
        match value & ECN_MASK {
            0b00 => Self::NotEct,
            0b01 => Self::Ect1,
            0b10 => Self::Ect0,
            _ => Self::Ce,
        }
    }

    /// Returns true if the transport is marked as ECN capable
    #[inline]
    pub const fn is_ect(self) -> bool {
        matches!(self, Self::Ect0 | Self::Ect1)
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}
