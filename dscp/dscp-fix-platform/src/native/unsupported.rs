// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{Error, Kind, Native};
use crate::socket::raw;
use dscp_fix_core::Tos;

/// Rejects every call for targets with no known way to set the TOS byte
#[derive(Clone, Copy, Debug, Default)]
pub struct Unsupported;

impl Native for Unsupported {
    #[inline]
    fn set_tos(&self, _socket: raw::Socket, _tos: Tos) -> Result<(), Error> {
        Err(Kind::Unsupported.err())
    }
}
