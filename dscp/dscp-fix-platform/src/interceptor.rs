// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    native::{self, Kind, Native},
    socket::{raw::AsRaw, Socket},
    syscall,
};
use core::{ffi::c_int, fmt};
use dscp_fix_core::{option::decode_int, SocketOption};
use std::{io, sync::Arc};

/// Wraps the socket option call so `IP_TOS` goes to a native routine
///
/// Every other option is forwarded to the standard call unchanged, with the
/// same outcome the unwrapped call would have.
pub struct Interceptor<N = native::Platform> {
    native: Arc<N>,
}

impl<N> Clone for Interceptor<N> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            native: self.native.clone(),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for Interceptor<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("native", &self.native)
            .finish()
    }
}

impl<N: Native + Default> Default for Interceptor<N> {
    #[inline]
    fn default() -> Self {
        Self::new(N::default())
    }
}

impl<N: Native> Interceptor<N> {
    #[inline]
    pub fn new(native: N) -> Self {
        Self {
            native: Arc::new(native),
        }
    }

    #[inline]
    pub fn native(&self) -> &N {
        &self.native
    }

    /// Returns true if both interceptors share the same native routine
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.native, &other.native)
    }

    /// Applies a typed option to `socket`
    ///
    /// [`SocketOption::Tos`] is handed to the native routine only; the
    /// standard call is never made for it.
    #[inline]
    pub fn set_option(&self, socket: &socket2::Socket, option: SocketOption) -> Result<(), Error> {
        match option {
            SocketOption::Tos(value) => self
                .native
                .set_socket_tos(socket.as_raw(), value)
                .map_err(Error::NativeCallFailure),
            option => syscall::set_option(socket, option).map_err(Error::Standard),
        }
    }

    /// Applies an option in the shape of the platform `setsockopt` call
    ///
    /// `(IPPROTO_IP, IP_TOS)` is decoded and handed to the native routine;
    /// any other pair is forwarded with `value` untouched.
    #[inline]
    pub fn set_option_raw<S: AsRaw + ?Sized>(
        &self,
        socket: &S,
        level: c_int,
        name: c_int,
        value: &[u8],
    ) -> Result<(), Error> {
        let socket = socket.as_raw();

        if syscall::is_tos(level, name) {
            let tos = decode_int(value).ok_or_else(|| Kind::InvalidLength { len: value.len() })?;
            return self
                .native
                .set_socket_tos(socket, tos)
                .map_err(Error::NativeCallFailure);
        }

        syscall::setsockopt(socket, level, name, value).map_err(Error::Standard)
    }

    /// Wraps `socket` so its option calls go through this interceptor
    #[inline]
    pub fn wrap<S: Into<socket2::Socket>>(&self, socket: S) -> Socket<N> {
        Socket::new(socket.into(), self.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The native TOS routine rejected the descriptor or value
    #[error("native TOS routine failed: {0}")]
    NativeCallFailure(#[source] native::Error),
    /// The standard option call failed
    #[error(transparent)]
    Standard(io::Error),
}

impl From<Kind> for Error {
    #[inline]
    #[track_caller]
    fn from(kind: Kind) -> Self {
        Self::NativeCallFailure(kind.into())
    }
}

impl From<Error> for io::Error {
    #[inline]
    fn from(error: Error) -> Self {
        match error {
            Error::NativeCallFailure(error) => error.into(),
            // callers see exactly what the unwrapped call reported
            Error::Standard(error) => error,
        }
    }
}
