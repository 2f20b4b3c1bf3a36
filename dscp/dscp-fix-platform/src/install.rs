// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Holds the one [`Interceptor`] a process shares across its sockets

use crate::{
    interceptor::Interceptor,
    native::{self, Native},
};
use once_cell::sync::OnceCell;

/// A slot that constructs its interceptor at most once
///
/// Later installs return the interceptor created by the first one, so an
/// interceptor is never wrapped inside another.
pub struct Installation<N> {
    interceptor: OnceCell<Interceptor<N>>,
}

impl<N> Installation<N> {
    pub const fn new() -> Self {
        Self {
            interceptor: OnceCell::new(),
        }
    }
}

impl<N> Default for Installation<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Native> Installation<N> {
    /// Installs the interceptor built from `native`, unless one is already installed
    pub fn install_with<F: FnOnce() -> N>(&self, native: F) -> Interceptor<N> {
        let mut installed = false;
        let interceptor = self.interceptor.get_or_init(|| {
            installed = true;
            Interceptor::new(native())
        });

        if installed {
            tracing::debug!(
                native = core::any::type_name::<N>(),
                "installed socket option interceptor"
            );
        }

        interceptor.clone()
    }

    #[inline]
    pub fn get(&self) -> Option<Interceptor<N>> {
        self.interceptor.get().cloned()
    }
}

static PROCESS: Installation<native::Platform> = Installation::new();

/// Installs the interceptor for the current platform
///
/// Calling this more than once returns the same interceptor each time.
pub fn install() -> Interceptor {
    PROCESS.install_with(native::Platform::default)
}

/// Returns the process-wide interceptor if [`install`] has been called
pub fn installed() -> Option<Interceptor> {
    PROCESS.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::testing::Recording;
    use dscp_fix_core::SocketOption;
    use socket2::{Domain, Protocol, Type};

    #[test]
    fn install_twice_test() {
        crate::testing::init_tracing();

        let installation = Installation::new();
        assert!(installation.get().is_none());

        let first = installation.install_with(Recording::default);
        let second = installation.install_with(|| panic!("installed twice"));
        assert!(first.ptr_eq(&second));
        assert!(installation.get().unwrap().ptr_eq(&first));

        let socket = socket2::Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).unwrap();
        second
            .set_option(&socket, SocketOption::Tos(0x2e))
            .unwrap();

        // one logical call reaches the routine once
        assert_eq!(first.native().calls().len(), 1);
    }

    #[test]
    fn process_install_test() {
        let first = install();
        let second = install();
        assert!(first.ptr_eq(&second));
        assert!(installed().unwrap().ptr_eq(&first));
    }

    #[test]
    fn concurrent_install_test() {
        static INSTALLATION: Installation<Recording> = Installation::new();

        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| INSTALLATION.install_with(Recording::default)))
            .collect();

        let interceptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for interceptor in &interceptors {
            assert!(interceptor.ptr_eq(&interceptors[0]));
        }
    }
}
