//! Canonical structured event names used across `charging-dispatcher`.

// Dispatch engine events.
pub const DISPATCH_START: &str = "dispatch_start";
pub const DISPATCH_OK: &str = "dispatch_ok";
pub const DISPATCH_REMOTE_ERROR: &str = "dispatch_remote_error";
pub const DISPATCH_EXHAUSTED: &str = "dispatch_exhausted";
pub const DISPATCH_CANCELLED: &str = "dispatch_cancelled";
pub const DISPATCH_AUTHORIZATION_FAILED: &str = "dispatch_authorization_failed";
pub const DISPATCH_ATTEMPT: &str = "dispatch_attempt";
pub const DISPATCH_ATTEMPT_CONNECTIVITY_FAILED: &str = "dispatch_attempt_connectivity_failed";

// Connection registry events.
pub const CONNECTION_DIAL_START: &str = "connection_dial_start";
pub const CONNECTION_DIAL_OK: &str = "connection_dial_ok";
pub const CONNECTION_DIAL_FAILED: &str = "connection_dial_failed";
pub const CONNECTION_REUSE: &str = "connection_reuse";
pub const CONNECTION_EVICT: &str = "connection_evict";

// Profile store events.
pub const PROFILE_RELOAD_OK: &str = "profile_reload_ok";
pub const PROFILE_RELOAD_FAILED: &str = "profile_reload_failed";

// Facade and transport events.
pub const FACADE_REQUEST: &str = "facade_request";
pub const FACADE_REJECTED: &str = "facade_rejected";
pub const RPC_SERVER_ACCEPT: &str = "rpc_server_accept";
pub const RPC_SERVER_CLOSED: &str = "rpc_server_closed";
pub const RPC_SERVER_BAD_FRAME: &str = "rpc_server_bad_frame";
pub const RPC_CLIENT_READER_CLOSED: &str = "rpc_client_reader_closed";
pub const RPC_CLIENT_ORPHAN_RESPONSE: &str = "rpc_client_orphan_response";
