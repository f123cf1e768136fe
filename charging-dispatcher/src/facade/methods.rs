//! Typed per-subsystem entry points. Each one only names its method and forwards.

use crate::error::DispatchError;
use crate::facade::rpc_facade::RpcFacade;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Reply of every subsystem's `Ping`.
pub const PONG: &str = "Pong";

pub const ATTRIBUTE_SV1: &str = "AttributeSv1";
pub const RESOURCE_SV1: &str = "ResourceSv1";
pub const SESSION_SV1: &str = "SessionSv1";

pub const PING: &str = "Ping";

/// Calls into one subsystem by method name.
#[derive(Clone, Copy)]
pub struct SubsystemClient<'a> {
    facade: &'a RpcFacade,
    subsystem: &'a str,
}

impl<'a> SubsystemClient<'a> {
    pub fn new(facade: &'a RpcFacade, subsystem: &'a str) -> Self {
        Self { facade, subsystem }
    }

    pub fn subsystem(&self) -> &str {
        self.subsystem
    }

    pub async fn ping<A>(&self, envelope: &A) -> Result<String, DispatchError>
    where
        A: Serialize + ?Sized + Sync,
    {
        self.call(PING, envelope).await
    }

    pub async fn call<A, R>(&self, method: &str, args: &A) -> Result<R, DispatchError>
    where
        A: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let qualified = format!("{}.{}", self.subsystem, method);
        self.facade.call_typed(&qualified, args).await
    }
}

macro_rules! subsystem_methods {
    ($(#[$doc:meta])* $name:ident => $subsystem:expr, { $($fn_name:ident => $method:literal),* $(,)? }) => {
        $(#[$doc])*
        #[derive(Clone, Copy)]
        pub struct $name<'a> {
            client: SubsystemClient<'a>,
        }

        impl<'a> $name<'a> {
            pub fn new(facade: &'a RpcFacade) -> Self {
                Self {
                    client: SubsystemClient::new(facade, $subsystem),
                }
            }

            pub async fn ping<A>(&self, envelope: &A) -> Result<String, DispatchError>
            where
                A: Serialize + ?Sized + Sync,
            {
                self.client.ping(envelope).await
            }

            $(
                pub async fn $fn_name<A, R>(&self, args: &A) -> Result<R, DispatchError>
                where
                    A: Serialize + ?Sized + Sync,
                    R: DeserializeOwned,
                {
                    self.client.call($method, args).await
                }
            )*
        }
    };
}

subsystem_methods!(
    /// Attribute lookup and event processing.
    AttributeSv1 => ATTRIBUTE_SV1, {
        get_attribute_for_event => "GetAttributeForEvent",
        process_event => "ProcessEvent",
    }
);

subsystem_methods!(
    /// Resource usage authorization and allocation.
    ResourceSv1 => RESOURCE_SV1, {
        authorize_resources => "AuthorizeResources",
        allocate_resources => "AllocateResources",
        release_resources => "ReleaseResources",
    }
);

subsystem_methods!(
    /// Session authorization and lifecycle.
    SessionSv1 => SESSION_SV1, {
        authorize_event => "AuthorizeEvent",
        initiate_session => "InitiateSession",
        update_session => "UpdateSession",
        terminate_session => "TerminateSession",
    }
);
