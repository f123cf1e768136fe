/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Error taxonomy shared by authorization, transport and dispatch.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

pub const API_KEY_FIELD: &str = "APIKey";
pub const TENANT_FIELD: &str = "Tenant";
pub const SUBSYSTEM_FIELD: &str = "Subsystem";
pub const METHOD_FIELD: &str = "Method";

/// Error produced by a replica's own logic. Carried to the caller unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for RemoteError {}

/// A replica could not be reached or communicated with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectivityError {
    address: String,
    reason: String,
}

impl ConnectivityError {
    pub fn new(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            reason: reason.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for ConnectivityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} unreachable: {}", self.address, self.reason)
    }
}

impl Error for ConnectivityError {}

/// Outcome of a single remote invocation, classified by the transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CallError {
    Connectivity(ConnectivityError),
    Remote(RemoteError),
}

impl Display for CallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Connectivity(err) => write!(f, "{err}"),
            CallError::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CallError::Connectivity(err) => Some(err),
            CallError::Remote(err) => Some(err),
        }
    }
}

impl From<ConnectivityError> for CallError {
    fn from(err: ConnectivityError) -> Self {
        CallError::Connectivity(err)
    }
}

impl From<RemoteError> for CallError {
    fn from(err: RemoteError) -> Self {
        CallError::Remote(err)
    }
}

/// Classification of a [`DispatchError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    CallerContract,
    Authorization,
    Connectivity,
    Application,
    Cancelled,
}

/// Failures surfaced to the caller of a dispatched method.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchError {
    MandatoryFieldMissing(&'static str),
    MalformedMethod(String),
    UnknownApiKey,
    UnauthorizedApi,
    NoRouteAvailable {
        tenant: String,
        subsystem: String,
    },
    NoReachableReplica {
        host_id: String,
        source: ConnectivityError,
    },
    Remote(RemoteError),
    Codec(String),
    Cancelled,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::MandatoryFieldMissing(_)
            | DispatchError::MalformedMethod(_)
            | DispatchError::Codec(_) => ErrorKind::CallerContract,
            DispatchError::UnknownApiKey
            | DispatchError::UnauthorizedApi
            | DispatchError::NoRouteAvailable { .. } => ErrorKind::Authorization,
            DispatchError::NoReachableReplica { .. } => ErrorKind::Connectivity,
            DispatchError::Remote(_) => ErrorKind::Application,
            DispatchError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Host id of the last replica tried when every replica was unreachable.
    pub fn last_host_id(&self) -> Option<&str> {
        match self {
            DispatchError::NoReachableReplica { host_id, .. } => Some(host_id),
            _ => None,
        }
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::MandatoryFieldMissing(field) => {
                write!(f, "MANDATORY_IE_MISSING: [{field}]")
            }
            DispatchError::MalformedMethod(method) => write!(f, "MALFORMED_METHOD: {method}"),
            DispatchError::UnknownApiKey => write!(f, "UNKNOWN_API_KEY"),
            DispatchError::UnauthorizedApi => write!(f, "UNAUTHORIZED_API"),
            DispatchError::NoRouteAvailable { tenant, subsystem } => {
                write!(f, "NO_ROUTE_AVAILABLE: {tenant}:{subsystem}")
            }
            DispatchError::NoReachableReplica { host_id, source } => {
                write!(f, "NO_REACHABLE_REPLICA: {host_id}: {source}")
            }
            DispatchError::Remote(err) => write!(f, "{err}"),
            DispatchError::Codec(reason) => write!(f, "SERIALIZATION_ERROR: {reason}"),
            DispatchError::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::NoReachableReplica { source, .. } => Some(source),
            DispatchError::Remote(err) => Some(err),
            _ => None,
        }
    }
}
