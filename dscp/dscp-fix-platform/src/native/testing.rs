// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{Error, Kind, Native};
use crate::socket::raw;
use dscp_fix_core::Tos;
use std::sync::Mutex;

/// Records every call instead of touching the socket
#[derive(Debug, Default)]
pub struct Recording {
    calls: Mutex<Vec<(raw::Socket, Tos)>>,
    failure: Option<Kind>,
}

impl Recording {
    /// Returns a routine that records each call and then fails with `kind`
    pub fn failing(kind: Kind) -> Self {
        Self {
            calls: Default::default(),
            failure: Some(kind),
        }
    }

    pub fn calls(&self) -> Vec<(raw::Socket, Tos)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Native for Recording {
    fn set_tos(&self, socket: raw::Socket, tos: Tos) -> Result<(), Error> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((socket, tos));

        match self.failure {
            Some(kind) => Err(kind.err()),
            None => Ok(()),
        }
    }
}
