// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Thin wrappers around the platform socket option calls

use crate::socket::raw;
use core::ffi::c_int;
use dscp_fix_core::SocketOption;
use std::io;

/// Calls the given libc function and wraps the result in an `io::Result`.
#[cfg(unix)]
macro_rules! libc {
    ($fn: ident ( $($arg: expr),* $(,)* ) ) => {{
        let res = libc::$fn($($arg, )*);
        if res < 0 {
            Err(std::io::Error::last_os_error())
        } else {
            Ok(res)
        }
    }};
}

#[cfg(unix)]
mod consts {
    pub const IPPROTO_IP: super::c_int = libc::IPPROTO_IP;
    pub const IP_TOS: super::c_int = libc::IP_TOS;
}

#[cfg(windows)]
mod consts {
    use windows_sys::Win32::Networking::WinSock;

    pub const IPPROTO_IP: super::c_int = WinSock::IPPROTO_IP as _;
    pub const IP_TOS: super::c_int = WinSock::IP_TOS as _;
}

pub use consts::{IPPROTO_IP, IP_TOS};

/// Returns true if the level/name pair addresses the IPv4 TOS byte
#[inline]
pub const fn is_tos(level: c_int, name: c_int) -> bool {
    level == IPPROTO_IP && name == IP_TOS
}

/// Calls the platform `setsockopt` with the payload passed through verbatim
#[cfg(unix)]
pub fn setsockopt(socket: raw::Socket, level: c_int, name: c_int, value: &[u8]) -> io::Result<()> {
    let len = libc::socklen_t::try_from(value.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "option payload too large"))?;

    unsafe {
        libc!(setsockopt(
            socket,
            level,
            name,
            value.as_ptr() as *const libc::c_void,
            len
        ))?;
    }

    Ok(())
}

/// Calls the platform `setsockopt` with the payload passed through verbatim
#[cfg(windows)]
pub fn setsockopt(socket: raw::Socket, level: c_int, name: c_int, value: &[u8]) -> io::Result<()> {
    use windows_sys::Win32::Networking::WinSock;

    let len = i32::try_from(value.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "option payload too large"))?;

    let res = unsafe {
        WinSock::setsockopt(
            socket as WinSock::SOCKET,
            level,
            name,
            value.as_ptr(),
            len,
        )
    };

    if res == WinSock::SOCKET_ERROR {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// Applies `option` through the standard option calls, with no interception
pub fn set_option(socket: &socket2::Socket, option: SocketOption) -> io::Result<()> {
    match option {
        SocketOption::Tos(value) => socket.set_tos(value),
        SocketOption::Broadcast(value) => socket.set_broadcast(value),
        SocketOption::ReuseAddress(value) => socket.set_reuse_address(value),
        SocketOption::KeepAlive(value) => socket.set_keepalive(value),
        SocketOption::Nodelay(value) => socket.set_nodelay(value),
        SocketOption::Ttl(value) => socket.set_ttl(value),
        SocketOption::SendBufferSize(value) => socket.set_send_buffer_size(buffer_size(value)?),
        SocketOption::RecvBufferSize(value) => socket.set_recv_buffer_size(buffer_size(value)?),
        SocketOption::OnlyV6(value) => socket.set_only_v6(value),
        SocketOption::Linger(value) => socket.set_linger(value),
        SocketOption::MulticastTtlV4(value) => socket.set_multicast_ttl_v4(value),
        SocketOption::MulticastLoopV4(value) => socket.set_multicast_loop_v4(value),
        // new options need an explicit mapping
        _ => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{} has no standard mapping", option.name()),
        )),
    }
}

/// The kernel takes buffer sizes as a `c_int`, which `socket2` would silently truncate to
#[inline]
fn buffer_size(value: usize) -> io::Result<usize> {
    if c_int::try_from(value).is_err() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("buffer size {value} does not fit in a c_int"),
        ));
    }
    Ok(value)
}
