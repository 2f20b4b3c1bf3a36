// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![cfg(target_os = "linux")]

use dscp_fix_platform::{install, socket::Options, syscall, Dscp, SocketOption};
use std::{
    io,
    net::{SocketAddr, UdpSocket},
    os::unix::io::AsRawFd,
    time::Duration,
};

/// Binds a loopback receiver that reports the TOS byte of each datagram
fn receiver() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let enabled: libc::c_int = 1;
    syscall::setsockopt(
        socket.as_raw_fd(),
        libc::IPPROTO_IP,
        libc::IP_RECVTOS,
        &enabled.to_ne_bytes(),
    )
    .unwrap();

    socket
}

/// Receives one datagram and returns the TOS byte from its control message
fn recv_tos(socket: &UdpSocket) -> io::Result<u8> {
    let mut payload = [0u8; 64];
    let mut iov = libc::iovec {
        iov_base: payload.as_mut_ptr() as *mut libc::c_void,
        iov_len: payload.len(),
    };
    // u64 storage keeps the control buffer aligned for `cmsghdr`
    let mut control = [0u64; 16];

    let mut msg: libc::msghdr = unsafe { core::mem::zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;
    msg.msg_control = control.as_mut_ptr() as *mut libc::c_void;
    msg.msg_controllen = core::mem::size_of_val(&control) as _;

    let res = unsafe { libc::recvmsg(socket.as_raw_fd(), &mut msg, 0) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }

    unsafe {
        let mut cmsg = libc::CMSG_FIRSTHDR(&msg);
        while !cmsg.is_null() {
            if (*cmsg).cmsg_level == libc::IPPROTO_IP && (*cmsg).cmsg_type == libc::IP_TOS {
                return Ok(*libc::CMSG_DATA(cmsg));
            }
            cmsg = libc::CMSG_NXTHDR(&msg, cmsg);
        }
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "datagram carried no IP_TOS control message",
    ))
}

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

#[test]
fn tos_reaches_the_wire() {
    let receiver = receiver();
    let target = receiver.local_addr().unwrap();

    let mut options = Options::new(loopback());
    options.blocking = true;
    let sender = options.build_udp().unwrap();

    sender.set_tos(0x2e).unwrap();
    sender.send_to(b"marked", &target).unwrap();

    let tos = recv_tos(&receiver).unwrap();
    assert_eq!(tos >> 2, 0x2e >> 2);
}

#[test]
fn configured_dscp_reaches_the_wire() {
    let receiver = receiver();
    let target = receiver.local_addr().unwrap();

    let mut options = Options::new(loopback());
    options.blocking = true;
    options.tos = Some(Dscp::AF41.into());
    let sender = options.build_udp().unwrap();

    sender.send_to(b"marked", &target).unwrap();

    let tos = recv_tos(&receiver).unwrap();
    assert_eq!(Dscp::from_tos(tos), Dscp::AF41);
}

#[test]
fn raw_tos_reaches_the_wire() {
    let receiver = receiver();
    let target = receiver.local_addr().unwrap();

    let sender = install().wrap(UdpSocket::bind(loopback()).unwrap());
    sender
        .set_option_raw(
            syscall::IPPROTO_IP,
            syscall::IP_TOS,
            &(0x48 as libc::c_int).to_ne_bytes(),
        )
        .unwrap();
    sender.send_to(b"marked", &target).unwrap();

    let tos = recv_tos(&receiver).unwrap();
    assert_eq!(tos >> 2, 0x48 >> 2);
}

#[test]
fn out_of_range_tos_is_rejected() {
    let sender = install().wrap(UdpSocket::bind(loopback()).unwrap());
    sender.set_tos(0x20).unwrap();

    let err = sender.set_tos(0x1_20).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

    // nothing was truncated into the socket
    assert_eq!(sender.tos().unwrap(), 0x20);
}

#[test]
fn broadcast_matches_the_standard_call() {
    let wrapped = install().wrap(UdpSocket::bind(loopback()).unwrap());
    let direct = UdpSocket::bind(loopback()).unwrap();

    wrapped
        .set_option(SocketOption::Broadcast(true))
        .unwrap();
    direct.set_broadcast(true).unwrap();

    assert!(wrapped.broadcast().unwrap());
    assert_eq!(wrapped.broadcast().unwrap(), direct.broadcast().unwrap());
}
