// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#[cfg(unix)]
pub type Socket = std::os::unix::io::RawFd;

#[cfg(windows)]
pub type Socket = std::os::windows::io::RawSocket;

/// Extracts the OS-level descriptor from a socket
pub trait AsRaw {
    fn as_raw(&self) -> Socket;
}

#[cfg(unix)]
impl<T: std::os::unix::io::AsRawFd> AsRaw for T {
    #[inline]
    fn as_raw(&self) -> Socket {
        self.as_raw_fd()
    }
}

#[cfg(windows)]
impl<T: std::os::windows::io::AsRawSocket> AsRaw for T {
    #[inline]
    fn as_raw(&self) -> Socket {
        self.as_raw_socket()
    }
}
