// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use core::{fmt, panic::Location};
use std::io;

/// Failure reported by a native TOS routine
#[derive(Clone, Copy)]
pub struct Error {
    kind: Kind,
    location: &'static Location<'static>,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("crate", &"dscp-fix-platform")
            .field("file", &self.file())
            .field("line", &self.location.line())
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Self { kind, location } = self;
        let file = self.file();
        let line = location.line();
        write!(f, "[dscp-fix-platform::{file}:{line}]: {kind}")
    }
}

impl std::error::Error for Error {}

impl Error {
    #[track_caller]
    #[inline]
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            location: Location::caller(),
        }
    }

    /// Captures the last OS error reported by `routine`
    #[track_caller]
    #[inline]
    pub fn last_os_error(routine: &'static str) -> Self {
        Self::os(routine, &io::Error::last_os_error())
    }

    #[track_caller]
    #[inline]
    pub fn os(routine: &'static str, error: &io::Error) -> Self {
        // errors without a raw code never come from the OS; map them to `-1`
        let code = error.raw_os_error().unwrap_or(-1);
        Self::new(Kind::Os { routine, code })
    }

    #[inline]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Returns the OS error code if the routine failed in a system call
    #[inline]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self.kind {
            Kind::Os { code, .. } if code >= 0 => Some(code),
            _ => None,
        }
    }

    #[inline]
    fn file(&self) -> &'static str {
        let file = self.location.file();
        file.split_once("/src/").map_or(file, |(_, file)| file)
    }
}

impl From<Kind> for Error {
    #[track_caller]
    #[inline]
    fn from(kind: Kind) -> Self {
        Self::new(kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Kind {
    #[error("TOS value {value} is outside of 0..=255")]
    ValueOutOfRange { value: u32 },
    #[error("IP_TOS payload of {len} bytes is neither a byte nor an int")]
    InvalidLength { len: usize },
    #[error("{routine} failed with OS error {code}")]
    Os { routine: &'static str, code: i32 },
    #[error("the QoS flow of a stream socket needs a connected peer")]
    NotConnected,
    #[error("setting TOS is not supported on this platform")]
    Unsupported,
}

impl Kind {
    #[inline]
    #[track_caller]
    pub(crate) fn err(self) -> Error {
        Error::new(self)
    }
}

impl From<Error> for io::Error {
    #[inline]
    #[track_caller]
    fn from(error: Error) -> Self {
        let kind = match error.kind {
            Kind::ValueOutOfRange { .. } | Kind::InvalidLength { .. } => io::ErrorKind::InvalidInput,
            Kind::NotConnected => io::ErrorKind::NotConnected,
            Kind::Unsupported => io::ErrorKind::Unsupported,
            Kind::Os { code, .. } if code >= 0 => io::Error::from_raw_os_error(code).kind(),
            Kind::Os { .. } => io::ErrorKind::Other,
        };
        Self::new(kind, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_kind_test() {
        let error: io::Error = Kind::ValueOutOfRange { value: 256 }.err().into();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);

        let error: io::Error = Kind::Unsupported.err().into();
        assert_eq!(error.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn display_test() {
        let error = Kind::InvalidLength { len: 2 }.err();
        let message = error.to_string();
        assert!(message.starts_with("[dscp-fix-platform::native/error.rs:"));
        assert!(message.ends_with("IP_TOS payload of 2 bytes is neither a byte nor an int"));
    }
}
