// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Platform-independent types for working with the IPv4 Type of Service
//! byte and the socket options that carry it

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod dscp;
pub mod ecn;
pub mod option;
pub mod tos;

pub use dscp::Dscp;
pub use ecn::ExplicitCongestionNotification;
pub use option::SocketOption;
pub use tos::Tos;
