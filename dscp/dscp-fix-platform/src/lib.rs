// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Routes the `IP_TOS` socket option to the native routine each platform
//! needs, forwarding every other option to the standard call unchanged.
//!
//! ```no_run
//! use dscp_fix_platform::{socket::Options, Dscp};
//!
//! # fn main() -> std::io::Result<()> {
//! let mut options = Options::new("0.0.0.0:0".parse().unwrap());
//! options.tos = Some(Dscp::EF.into());
//!
//! let socket = options.build_udp()?;
//! socket.send_to(b"hello", &"192.0.2.1:4433".parse().unwrap())?;
//! # Ok(())
//! # }
//! ```

pub mod install;
pub mod interceptor;
pub mod native;
pub mod socket;
pub mod syscall;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dscp_fix_core::{Dscp, ExplicitCongestionNotification, SocketOption, Tos};
pub use install::{install, installed, Installation};
pub use interceptor::Interceptor;
pub use socket::Socket;
