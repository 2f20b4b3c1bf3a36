// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Routines that write the TOS byte of a socket through a platform-specific
//! mechanism rather than the standard option call

use crate::socket::raw;
use cfg_if::cfg_if;
use dscp_fix_core::{Dscp, Tos};

mod error;
mod unsupported;

#[cfg(all(unix, dscp_fix_platform_tos))]
mod unix;

#[cfg(all(windows, dscp_fix_platform_qos))]
mod windows;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Kind};
pub use unsupported::Unsupported;

#[cfg(all(unix, dscp_fix_platform_tos))]
pub use unix::Setsockopt;

#[cfg(all(windows, dscp_fix_platform_qos))]
pub use windows::Qos;

cfg_if! {
    if #[cfg(all(windows, dscp_fix_platform_qos))] {
        /// The native routine used by the current target
        pub type Platform = Qos;
    } else if #[cfg(all(unix, dscp_fix_platform_tos))] {
        /// The native routine used by the current target
        pub type Platform = Setsockopt;
    } else {
        /// The native routine used by the current target
        pub type Platform = Unsupported;
    }
}

/// A routine that applies a TOS byte to a raw OS socket
///
/// Implementations must be safe to call concurrently for distinct sockets.
pub trait Native: 'static + Send + Sync {
    /// Writes `tos` to the outgoing packets of `socket`
    fn set_tos(&self, socket: raw::Socket, tos: Tos) -> Result<(), Error>;

    /// Validates an option value and writes it as the TOS byte
    ///
    /// Values above `255` fail with [`Kind::ValueOutOfRange`] and are never
    /// truncated.
    #[inline]
    #[track_caller]
    fn set_socket_tos(&self, socket: raw::Socket, value: u32) -> Result<(), Error> {
        let tos = Tos::try_from(value).map_err(|err| Kind::ValueOutOfRange { value: err.value })?;
        self.set_tos(socket, tos)
    }

    /// Writes `dscp` as the high six bits of the TOS byte
    #[inline]
    fn set_socket_dscp(&self, socket: raw::Socket, dscp: Dscp) -> Result<(), Error> {
        self.set_tos(socket, dscp.into())
    }
}
