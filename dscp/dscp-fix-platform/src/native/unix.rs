// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{Error, Native};
use crate::{socket::raw, syscall};
use dscp_fix_core::Tos;

/// Writes the TOS byte with `setsockopt(IPPROTO_IP, IP_TOS)`
///
/// This is what the standard call already does on these targets; going
/// through the routine keeps error reporting identical across platforms.
#[derive(Clone, Copy, Debug, Default)]
pub struct Setsockopt;

impl Native for Setsockopt {
    #[inline]
    fn set_tos(&self, socket: raw::Socket, tos: Tos) -> Result<(), Error> {
        let value = u8::from(tos) as libc::c_int;

        syscall::setsockopt(
            socket,
            libc::IPPROTO_IP,
            libc::IP_TOS,
            &value.to_ne_bytes(),
        )
        .map_err(|err| Error::os("setsockopt", &err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::Kind;
    use dscp_fix_core::Dscp;
    use std::{net::UdpSocket, os::unix::io::AsRawFd};

    #[test]
    fn applies_tos_test() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        Setsockopt.set_socket_tos(socket.as_raw_fd(), 0x2e).unwrap();

        let socket = socket2::Socket::from(socket);
        assert_eq!(socket.tos().unwrap(), 0x2e);
    }

    #[test]
    fn applies_dscp_test() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        Setsockopt
            .set_socket_dscp(socket.as_raw_fd(), Dscp::AF41)
            .unwrap();

        let socket = socket2::Socket::from(socket);
        assert_eq!(socket.tos().unwrap(), Dscp::AF41.to_tos() as u32);
    }

    #[test]
    fn invalid_descriptor_test() {
        // `-1` is never a valid descriptor
        let err = Setsockopt.set_socket_tos(-1, 0x2e).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
        assert!(matches!(err.kind(), Kind::Os { routine: "setsockopt", .. }));
    }

    #[test]
    fn out_of_range_test() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let err = Setsockopt
            .set_socket_tos(socket.as_raw_fd(), 0x100)
            .unwrap_err();
        assert_eq!(err.kind(), &Kind::ValueOutOfRange { value: 0x100 });

        // the socket was left untouched rather than truncated to `0x00`
        Setsockopt.set_socket_tos(socket.as_raw_fd(), 0x20).unwrap();
        let err = Setsockopt
            .set_socket_tos(socket.as_raw_fd(), 0x120)
            .unwrap_err();
        assert_eq!(err.kind(), &Kind::ValueOutOfRange { value: 0x120 });

        let socket = socket2::Socket::from(socket);
        assert_eq!(socket.tos().unwrap(), 0x20);
    }
}
