// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    interceptor::{Error, Interceptor},
    native::{self, Native},
};
use core::{ffi::c_int, fmt, mem::MaybeUninit};
use dscp_fix_core::{Dscp, SocketOption, Tos};
use std::{
    io,
    net::{SocketAddr, TcpListener, TcpStream, UdpSocket},
};

pub mod options;
pub mod raw;

pub use options::Options;

macro_rules! impl_socket_raw_delegate {
    (impl[$($gen:tt)*] $impl:ty, |$self:ident| $field:expr) => {
        #[cfg(unix)]
        impl<$($gen)*> ::std::os::unix::io::AsRawFd for $impl {
            fn as_raw_fd(&$self) -> ::std::os::unix::io::RawFd {
                ::std::os::unix::io::AsRawFd::as_raw_fd($field)
            }
        }

        #[cfg(windows)]
        impl<$($gen)*> ::std::os::windows::io::AsRawSocket for $impl {
            fn as_raw_socket(&$self) -> ::std::os::windows::io::RawSocket {
                ::std::os::windows::io::AsRawSocket::as_raw_socket($field)
            }
        }
    };
}

/// A socket whose option calls go through an [`Interceptor`]
///
/// The underlying option setters are not reachable from here, so every
/// option write takes the intercepted path.
pub struct Socket<N = native::Platform> {
    inner: socket2::Socket,
    interceptor: Interceptor<N>,
    /// Applied to every stream returned from [`Socket::accept`]
    accepted_tos: Option<Tos>,
}

impl_socket_raw_delegate!(impl[N] Socket<N>, |self| &self.inner);

impl<N: fmt::Debug> fmt::Debug for Socket<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("local_addr", &self.inner.local_addr().ok().and_then(|a| a.as_socket()))
            .field("interceptor", &self.interceptor)
            .field("accepted_tos", &self.accepted_tos)
            .finish()
    }
}

impl<N: Native> Socket<N> {
    #[inline]
    pub(crate) fn new(inner: socket2::Socket, interceptor: Interceptor<N>) -> Self {
        Self {
            inner,
            interceptor,
            accepted_tos: None,
        }
    }

    #[inline]
    pub(crate) fn with_accepted_tos(mut self, tos: Option<Tos>) -> Self {
        self.accepted_tos = tos;
        self
    }

    #[inline]
    pub fn interceptor(&self) -> &Interceptor<N> {
        &self.interceptor
    }

    #[inline]
    pub fn set_option(&self, option: SocketOption) -> Result<(), Error> {
        tracing::trace!(option = option.name(), "setting socket option");
        self.interceptor.set_option(&self.inner, option)
    }

    #[inline]
    pub fn set_option_raw(&self, level: c_int, name: c_int, value: &[u8]) -> Result<(), Error> {
        tracing::trace!(
            opt_level = level,
            opt_name = name,
            len = value.len(),
            "setting raw socket option"
        );
        self.interceptor
            .set_option_raw(&self.inner, level, name, value)
    }

    /// Sets the TOS byte for outgoing IPv4 packets
    #[inline]
    pub fn set_tos(&self, tos: u32) -> io::Result<()> {
        self.set_option(SocketOption::Tos(tos))?;
        Ok(())
    }

    #[inline]
    pub fn set_dscp(&self, dscp: Dscp) -> io::Result<()> {
        self.set_tos(dscp.to_tos() as u32)
    }

    #[inline]
    pub fn set_broadcast(&self, broadcast: bool) -> io::Result<()> {
        self.set_option(SocketOption::Broadcast(broadcast))?;
        Ok(())
    }

    #[inline]
    pub fn set_ttl(&self, ttl: u32) -> io::Result<()> {
        self.set_option(SocketOption::Ttl(ttl))?;
        Ok(())
    }

    #[inline]
    pub fn set_reuse_address(&self, reuse: bool) -> io::Result<()> {
        self.set_option(SocketOption::ReuseAddress(reuse))?;
        Ok(())
    }

    #[inline]
    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        self.inner.set_nonblocking(nonblocking)
    }

    #[inline]
    pub fn bind(&self, addr: &SocketAddr) -> io::Result<()> {
        self.inner.bind(&(*addr).into())
    }

    #[inline]
    pub fn connect(&self, addr: &SocketAddr) -> io::Result<()> {
        self.inner.connect(&(*addr).into())
    }

    #[inline]
    pub fn listen(&self, backlog: c_int) -> io::Result<()> {
        self.inner.listen(backlog)
    }

    /// Accepts a connection; the new socket shares this socket's interceptor
    ///
    /// If the listener was built with a TOS, it is applied to the accepted
    /// stream before it is returned.
    #[inline]
    pub fn accept(&self) -> io::Result<(Self, SocketAddr)> {
        let (socket, addr) = self.inner.accept()?;
        let addr = into_socket_addr(addr)?;
        let socket = Self::new(socket, self.interceptor.clone());

        if let Some(tos) = self.accepted_tos {
            socket.set_tos(tos.into())?;
        }

        Ok((socket, addr))
    }

    #[inline]
    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.inner.send(buf)
    }

    #[inline]
    pub fn send_to(&self, buf: &[u8], addr: &SocketAddr) -> io::Result<usize> {
        self.inner.send_to(buf, &(*addr).into())
    }

    #[inline]
    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.recv(as_uninit(buf))
    }

    #[inline]
    pub fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let (len, addr) = self.inner.recv_from(as_uninit(buf))?;
        Ok((len, into_socket_addr(addr)?))
    }

    #[inline]
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        into_socket_addr(self.inner.local_addr()?)
    }

    #[inline]
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        into_socket_addr(self.inner.peer_addr()?)
    }

    #[inline]
    pub fn broadcast(&self) -> io::Result<bool> {
        self.inner.broadcast()
    }

    #[inline]
    pub fn tos(&self) -> io::Result<u32> {
        self.inner.tos()
    }

    #[inline]
    pub fn ttl(&self) -> io::Result<u32> {
        self.inner.ttl()
    }

    /// Releases the socket from the interceptor
    #[inline]
    pub fn into_inner(self) -> socket2::Socket {
        self.inner
    }

    #[inline]
    pub fn into_udp_socket(self) -> UdpSocket {
        self.inner.into()
    }

    #[inline]
    pub fn into_tcp_listener(self) -> TcpListener {
        self.inner.into()
    }

    #[inline]
    pub fn into_tcp_stream(self) -> TcpStream {
        self.inner.into()
    }
}

impl<N> From<Socket<N>> for socket2::Socket {
    #[inline]
    fn from(socket: Socket<N>) -> Self {
        socket.inner
    }
}

#[inline]
fn as_uninit(buf: &mut [u8]) -> &mut [MaybeUninit<u8>] {
    // SAFETY: `MaybeUninit<u8>` has the same layout as `u8` and the socket
    // only ever writes initialized bytes into the buffer
    unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) }
}

#[inline]
fn into_socket_addr(addr: socket2::SockAddr) -> io::Result<SocketAddr> {
    addr.as_socket().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "socket address is not an IP address",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{testing::Recording, Kind};
    use socket2::{Domain, Protocol, Type};

    fn wrap() -> Socket<Recording> {
        let socket =
            socket2::Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).unwrap();
        Interceptor::new(Recording::default()).wrap(socket)
    }

    #[test]
    fn set_dscp_test() {
        let socket = wrap();
        socket.set_dscp(Dscp::AF41).unwrap();

        let raw = raw::AsRaw::as_raw(&socket);
        assert_eq!(
            socket.interceptor().native().calls(),
            [(raw, Tos::from(Dscp::AF41))]
        );
    }

    #[test]
    fn broadcast_test() {
        let socket = wrap();
        assert!(!socket.broadcast().unwrap());
        socket.set_broadcast(true).unwrap();
        assert!(socket.broadcast().unwrap());
        assert!(socket.interceptor().native().calls().is_empty());
    }

    #[test]
    fn out_of_range_io_error_test() {
        let socket = wrap();
        let err = socket.set_tos(0x1_00).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn accept_shares_interceptor_test() {
        let interceptor = Interceptor::new(Recording::default());
        let listener = interceptor
            .wrap(socket2::Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).unwrap());
        listener.bind(&"127.0.0.1:0".parse().unwrap()).unwrap();
        listener.listen(1).unwrap();

        let addr = listener.local_addr().unwrap();
        let _client = TcpStream::connect(addr).unwrap();

        let (accepted, _) = listener.accept().unwrap();
        assert!(accepted.interceptor().ptr_eq(&interceptor));

        accepted.set_tos(0x20).unwrap();
        assert_eq!(interceptor.native().calls().len(), 1);
    }

    #[test]
    fn send_recv_test() {
        let a = wrap();
        let b = wrap();
        a.bind(&"127.0.0.1:0".parse().unwrap()).unwrap();
        b.bind(&"127.0.0.1:0".parse().unwrap()).unwrap();

        let b_addr = b.local_addr().unwrap();
        assert_eq!(a.send_to(b"ping", &b_addr).unwrap(), 4);

        let mut buf = [0u8; 16];
        let (len, from) = b.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"ping");
        assert_eq!(from, a.local_addr().unwrap());
    }

    #[test]
    fn accepted_tos_failure_test() {
        let interceptor = Interceptor::new(Recording::failing(Kind::Unsupported));
        let listener = interceptor
            .wrap(socket2::Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).unwrap())
            .with_accepted_tos(Some(Tos::from(0x20u8)));
        listener.bind(&"127.0.0.1:0".parse().unwrap()).unwrap();
        listener.listen(1).unwrap();

        let _client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();

        let err = listener.accept().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
