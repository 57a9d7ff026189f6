//! JSON-RPC request dispatch for the MCP tool surface.
//!
//! This module decodes newline-framed JSON-RPC 2.0 requests, routes them to
//! the built-in MCP methods or to registered tools, and encodes the responses
//! written back by the message loop.
//!
//! ## Protocol
//!
//! Clients send one request per line:
//!
//! ```json
//! {"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"search_providers","arguments":{}}}
//! ```
//!
//! The server answers with exactly one response line per request, in request
//! order. Notifications (requests without an `id`) are never answered:
//!
//! ```json
//! {"jsonrpc":"2.0","id":1,"result":{"content":[{"type":"text","text":"..."}],"isError":false}}
//! ```
//!
//! ## Methods
//!
//! `initialize`, `ping`, `tools/list`, `tools/call` and any `notifications/*`
//! method are served. Anything else is answered with a method-not-found
//! error.

mod errors;
mod registry;
mod request;
mod response;
mod router;
mod tool;

pub use self::errors::{
    DispatchError, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
pub use self::registry::{RegistryError, ToolRegistry};
pub use self::request::{JSONRPC_VERSION, JsonRpcRequest, RequestRejection};
pub use self::response::{JsonRpcError, JsonRpcResponse, ResponseWriter};
pub use self::router::{DEFAULT_PROTOCOL_VERSION, Dispatcher, SUPPORTED_PROTOCOL_VERSIONS};
pub use self::tool::{Tool, ToolContext, ToolDescriptor, ToolError};
