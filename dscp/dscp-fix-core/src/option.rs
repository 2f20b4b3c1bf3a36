// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use core::time::Duration;

/// A socket option along with the value to apply
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SocketOption {
    /// `IP_TOS`
    ///
    /// The value is kept as the full option width so out of range values
    /// reach the routine that rejects them.
    Tos(u32),
    /// `SO_BROADCAST`
    Broadcast(bool),
    /// `SO_REUSEADDR`
    ReuseAddress(bool),
    /// `SO_KEEPALIVE`
    KeepAlive(bool),
    /// `TCP_NODELAY`
    Nodelay(bool),
    /// `IP_TTL`
    Ttl(u32),
    /// `SO_SNDBUF`
    SendBufferSize(usize),
    /// `SO_RCVBUF`
    RecvBufferSize(usize),
    /// `IPV6_V6ONLY`
    OnlyV6(bool),
    /// `SO_LINGER`
    Linger(Option<Duration>),
    /// `IP_MULTICAST_TTL`
    MulticastTtlV4(u32),
    /// `IP_MULTICAST_LOOP`
    MulticastLoopV4(bool),
}

impl SocketOption {
    #[inline]
    pub const fn is_tos(&self) -> bool {
        matches!(self, Self::Tos(_))
    }

    /// Returns the conventional name of the option
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Tos(_) => "IP_TOS",
            Self::Broadcast(_) => "SO_BROADCAST",
            Self::ReuseAddress(_) => "SO_REUSEADDR",
            Self::KeepAlive(_) => "SO_KEEPALIVE",
            Self::Nodelay(_) => "TCP_NODELAY",
            Self::Ttl(_) => "IP_TTL",
            Self::SendBufferSize(_) => "SO_SNDBUF",
            Self::RecvBufferSize(_) => "SO_RCVBUF",
            Self::OnlyV6(_) => "IPV6_V6ONLY",
            Self::Linger(_) => "SO_LINGER",
            Self::MulticastTtlV4(_) => "IP_MULTICAST_TTL",
            Self::MulticastLoopV4(_) => "IP_MULTICAST_LOOP",
        }
    }
}

/// Decodes an integer option payload
///
/// Platforms accept either a single byte or a native-endian `int` for `IP_TOS`.
#[inline]
pub fn decode_int(bytes: &[u8]) -> Option<u32> {
    match *bytes {
        [value] => Some(value as u32),
        [a, b, c, d] => Some(u32::from_ne_bytes([a, b, c, d])),
        _ => None,
    }
}
