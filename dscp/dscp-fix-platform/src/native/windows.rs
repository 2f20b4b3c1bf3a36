// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{Error, Kind, Native};
use crate::socket::raw;
use core::{mem::size_of, ptr};
use dscp_fix_core::Tos;
use std::{collections::HashMap, net::Ipv4Addr, sync::Mutex};
use windows_sys::Win32::{
    Foundation::HANDLE,
    NetworkManagement::QoS::{
        QOSAddSocketToFlow, QOSCloseHandle, QOSCreateHandle, QOSSetFlow,
        QOSSetOutgoingDSCPValue, QOSTrafficTypeBestEffort, QOS_NON_ADAPTIVE_FLOW, QOS_VERSION,
    },
    Networking::WinSock::{
        self, AF_INET, SOCKADDR, SOCKADDR_IN, SOCKET, SOCKET_ERROR, SOCK_STREAM, SOL_SOCKET,
        SO_TYPE,
    },
};

/// Applies the DSCP bits through the QoS2 API
///
/// Winsock accepts `IP_TOS` but silently ignores it, so the code point is
/// attached to a non-adaptive QoS flow instead. Only the DSCP bits are
/// applied; the QoS subsystem owns the ECN bits.
///
/// One flow is kept per socket and later calls only update its code point.
/// Closing a QoS handle removes its flow, so handles stay open until the
/// routine is dropped.
#[derive(Debug, Default)]
pub struct Qos {
    flows: Mutex<HashMap<SOCKET, Flow>>,
}

impl Qos {
    #[cfg(test)]
    fn flow_count(&self) -> usize {
        self.flows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Native for Qos {
    fn set_tos(&self, socket: raw::Socket, tos: Tos) -> Result<(), Error> {
        let socket = socket as SOCKET;
        let dscp = tos.dscp().as_u8() as u32;

        let mut flows = self
            .flows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(flow) = flows.get(&socket) {
            if unsafe { flow.set_dscp(dscp) }.is_ok() {
                return Ok(());
            }

            // the socket was closed and its handle reused; start a new flow
            tracing::debug!(socket, "replacing stale QoS flow");
            flows.remove(&socket);
        }

        let flow = unsafe { Flow::new(socket)? };
        unsafe { flow.set_dscp(dscp)? };
        flows.insert(socket, flow);

        Ok(())
    }
}

/// A QoS handle with a single socket added to it
#[derive(Debug)]
struct Flow {
    handle: HANDLE,
    id: u32,
}

impl Flow {
    unsafe fn new(socket: SOCKET) -> Result<Self, Error> {
        ensure_connected(socket)?;

        let version = QOS_VERSION {
            MajorVersion: 1,
            MinorVersion: 0,
        };
        let mut handle: HANDLE = core::mem::zeroed();
        if QOSCreateHandle(&version, &mut handle) == 0 {
            return Err(failure("QOSCreateHandle"));
        }

        // closes the handle if the socket can't be added
        let mut flow = Self { handle, id: 0 };

        if QOSAddSocketToFlow(
            flow.handle,
            socket,
            ptr::null_mut(),
            QOSTrafficTypeBestEffort,
            QOS_NON_ADAPTIVE_FLOW,
            &mut flow.id,
        ) == 0
        {
            return Err(failure("QOSAddSocketToFlow"));
        }

        Ok(flow)
    }

    unsafe fn set_dscp(&self, dscp: u32) -> Result<(), Error> {
        if QOSSetFlow(
            self.handle,
            self.id,
            QOSSetOutgoingDSCPValue,
            size_of::<u32>() as u32,
            &dscp as *const u32 as *const _,
            0,
            ptr::null_mut(),
        ) == 0
        {
            return Err(failure("QOSSetFlow"));
        }

        Ok(())
    }
}

impl Drop for Flow {
    fn drop(&mut self) {
        unsafe {
            QOSCloseHandle(self.handle);
        }
    }
}

/// A QoS flow needs a destination
///
/// Datagram sockets without a peer are connected to a placeholder of
/// `127.0.0.0:0`. Stream sockets can't be connected that way, so they fail
/// with [`Kind::NotConnected`] until they have a real peer.
unsafe fn ensure_connected(socket: SOCKET) -> Result<(), Error> {
    let mut peer: SOCKADDR_IN = core::mem::zeroed();
    let mut len = size_of::<SOCKADDR_IN>() as i32;
    if WinSock::getpeername(socket, &mut peer as *mut _ as *mut SOCKADDR, &mut len) == 0 {
        return Ok(());
    }

    let mut ty = 0i32;
    let mut len = size_of::<i32>() as i32;
    if WinSock::getsockopt(
        socket,
        SOL_SOCKET,
        SO_TYPE,
        &mut ty as *mut i32 as *mut u8,
        &mut len,
    ) == SOCKET_ERROR
    {
        return Err(failure("getsockopt"));
    }

    if ty == SOCK_STREAM {
        return Err(Kind::NotConnected.err());
    }

    let mut addr: SOCKADDR_IN = core::mem::zeroed();
    addr.sin_family = AF_INET;
    addr.sin_port = 0;
    addr.sin_addr.S_un.S_addr = u32::from(Ipv4Addr::new(127, 0, 0, 0)).to_be();

    let res = WinSock::connect(
        socket,
        &addr as *const _ as *const SOCKADDR,
        size_of::<SOCKADDR_IN>() as i32,
    );

    if res == SOCKET_ERROR {
        return Err(failure("connect"));
    }

    Ok(())
}

#[track_caller]
fn failure(routine: &'static str) -> Error {
    let error = Error::last_os_error(routine);
    tracing::debug!(%error, "QoS call failed");
    error
}
