//! JSON-RPC over TCP.
//!
//! Frames are one JSON object per line. A request carries `id`, `method` and a single
//! positional argument in `params`; a response carries the same `id` with either a
//! `result` or an `error` string. [`TcpConnector`](crate::TcpConnector) plugs this
//! transport into the connection registry and [`serve`](crate::serve) exposes any
//! [`RpcHandler`](crate::RpcHandler) on a listener.

pub(crate) mod client;
pub(crate) mod codec;
pub(crate) mod server;
