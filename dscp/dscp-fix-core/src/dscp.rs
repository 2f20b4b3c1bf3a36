// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use core::{
    fmt,
    num::{IntErrorKind, ParseIntError},
    str::FromStr,
};

//= https://www.rfc-editor.org/rfc/rfc2474#section-3
//# Six bits of the DS field are used as a codepoint (DSCP) to select the
//# PHB a packet experiences at each node.

const DSCP_MAX: u8 = 0b11_1111;

/// A Differentiated Services Code Point
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dscp(u8);

macro_rules! code_points {
    ($($name:ident = $value:expr, $label:literal;)*) => {
        impl Dscp {
            $(
                pub const $name: Self = Self($value);
            )*

            const NAMED: &'static [(&'static str, Self)] = &[$(($label, Self::$name)),*];
        }
    };
}

code_points! {
    CS0 = 0, "cs0";
    CS1 = 8, "cs1";
    CS2 = 16, "cs2";
    CS3 = 24, "cs3";
    CS4 = 32, "cs4";
    CS5 = 40, "cs5";
    CS6 = 48, "cs6";
    CS7 = 56, "cs7";
    AF11 = 10, "af11";
    AF12 = 12, "af12";
    AF13 = 14, "af13";
    AF21 = 18, "af21";
    AF22 = 20, "af22";
    AF23 = 22, "af23";
    AF31 = 26, "af31";
    AF32 = 28, "af32";
    AF33 = 30, "af33";
    AF41 = 34, "af41";
    AF42 = 36, "af42";
    AF43 = 38, "af43";
    //= https://www.rfc-editor.org/rfc/rfc3246#section-2.4
    //# The recommended codepoint for the EF PHB is '101110'.
    EF = 0b10_1110, "ef";
    //= https://www.rfc-editor.org/rfc/rfc5865#section-3.1
    //# The code point for VOICE-ADMIT is '101100'.
    VOICE_ADMIT = 0b10_1100, "voice-admit";
    LE = 1, "le";
}

impl Dscp {
    /// Returns `None` if `value` does not fit in six bits
    #[inline]
    pub const fn new(value: u8) -> Option<Self> {
        if value > DSCP_MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Extracts the code point from a TOS byte
    #[inline]
    pub const fn from_tos(tos: u8) -> Self {
        Self(tos >> 2)
    }

    /// Returns the TOS byte carrying this code point and no ECN marking
    #[inline]
    pub const fn to_tos(self) -> u8 {
        self.0 << 2
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Returns the standard name of the code point, if it has one
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(_, dscp)| *dscp == self)
            .map(|(name, _)| *name)
    }
}

impl fmt::Debug for Dscp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Dscp({name})"),
            None => write!(f, "Dscp({})", self.0),
        }
    }
}

impl fmt::Display for Dscp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl TryFrom<u8> for Dscp {
    type Error = ParseError;

    #[inline]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ParseError::OutOfRange {
            value: value as u64,
        })
    }
}

impl From<Dscp> for u8 {
    #[inline]
    fn from(value: Dscp) -> Self {
        value.0
    }
}

/// Parses a code point from either its standard name (`ef`, `af41`, `cs1`, ...)
/// or a number with an optional `0x` or `0b` prefix
impl FromStr for Dscp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some((_, dscp)) = Self::NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
        {
            return Ok(*dscp);
        }

        let value = parse_int(s).map_err(|err| match err.kind() {
            // a well-formed number that is too large is still a number
            IntErrorKind::PosOverflow => ParseError::OutOfRange { value: u64::MAX },
            _ => ParseError::Unknown,
        })?;

        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(ParseError::OutOfRange { value })
    }
}

fn parse_int(s: &str) -> Result<u64, ParseIntError> {
    if let Some(s) = ["0x", "0X"].iter().find_map(|pfx| s.strip_prefix(pfx)) {
        u64::from_str_radix(s, 16)
    } else if let Some(s) = ["0b", "0B"].iter().find_map(|pfx| s.strip_prefix(pfx)) {
        u64::from_str_radix(s, 2)
    } else {
        s.parse()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    Unknown,
    OutOfRange { value: u64 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown DSCP name or number"),
            Self::OutOfRange { value } => write!(f, "DSCP value {value} is outside of 0..=63"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}
