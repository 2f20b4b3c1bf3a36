// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::Socket;
use crate::{
    install,
    interceptor::Interceptor,
    native::Native,
};
use core::ffi::c_int;
use dscp_fix_core::{SocketOption, Tos};
use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
};

const BACKLOG: c_int = 4096;

/// Configuration for sockets created through an [`Interceptor`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Options {
    pub addr: SocketAddr,
    pub reuse_address: bool,
    pub broadcast: bool,
    /// Applied through the interceptor once a UDP socket is bound
    ///
    /// Listeners apply it to each accepted stream instead.
    pub tos: Option<Tos>,
    pub ttl: Option<u32>,
    pub blocking: bool,
    pub delay: bool,
    pub send_buffer: Option<usize>,
    pub recv_buffer: Option<usize>,
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Self {
            addr: (Ipv4Addr::UNSPECIFIED, 0).into(),
            reuse_address: false,
            broadcast: false,
            tos: None,
            ttl: None,
            blocking: false,
            delay: false,
            send_buffer: None,
            recv_buffer: None,
        }
    }
}

impl Options {
    #[inline]
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            ..Default::default()
        }
    }

    /// Builds a UDP socket wrapped by the process-wide interceptor
    #[inline]
    pub fn build_udp(&self) -> io::Result<Socket> {
        self.build_udp_with(&install::install())
    }

    #[inline]
    pub fn build_udp_with<N: Native>(&self, interceptor: &Interceptor<N>) -> io::Result<Socket<N>> {
        let domain = socket2::Domain::for_address(self.addr);
        let ty = socket2::Type::DGRAM;
        let protocol = socket2::Protocol::UDP;

        let socket = interceptor.wrap(socket2::Socket::new(domain, ty, Some(protocol))?);

        if self.broadcast {
            socket.set_broadcast(true)?;
        }

        self.build_common(&socket)?;

        // the QoS flow on windows connects unbound sockets, so TOS waits for bind
        if let Some(tos) = self.tos {
            socket.set_tos(tos.into())?;
        }

        tracing::debug!(addr = %self.addr, tos = ?self.tos, "created UDP socket");

        Ok(socket)
    }

    /// Builds a TCP listener wrapped by the process-wide interceptor
    #[inline]
    pub fn build_tcp_listener(&self) -> io::Result<Socket> {
        self.build_tcp_listener_with(&install::install())
    }

    #[inline]
    pub fn build_tcp_listener_with<N: Native>(
        &self,
        interceptor: &Interceptor<N>,
    ) -> io::Result<Socket<N>> {
        let domain = socket2::Domain::for_address(self.addr);
        let ty = socket2::Type::STREAM;
        let protocol = socket2::Protocol::TCP;

        // a listener never sends data, and the QoS flow on windows needs a
        // connected stream, so TOS is applied to each accepted stream
        let socket = interceptor
            .wrap(socket2::Socket::new(domain, ty, Some(protocol))?)
            .with_accepted_tos(self.tos);

        socket.set_option(SocketOption::Nodelay(!self.delay))?;

        self.build_common(&socket)?;

        socket.listen(BACKLOG)?;

        tracing::debug!(addr = %self.addr, tos = ?self.tos, "created TCP listener");

        Ok(socket)
    }

    fn build_common<N: Native>(&self, socket: &Socket<N>) -> io::Result<()> {
        socket.set_reuse_address(self.reuse_address)?;
        socket.set_nonblocking(!self.blocking)?;

        if let Some(send_buffer) = self.send_buffer {
            socket.set_option(SocketOption::SendBufferSize(send_buffer))?;
        }

        if let Some(recv_buffer) = self.recv_buffer {
            socket.set_option(SocketOption::RecvBufferSize(recv_buffer))?;
        }

        if let Some(ttl) = self.ttl {
            socket.set_ttl(ttl)?;
        }

        socket.bind(&self.addr)?;

        Ok(())
    }
}
