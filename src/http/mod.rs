//! HTTP protocol layer module
//!
//! Request/response descriptors shared by the gateway adapter and the todo
//! handler, decoupled from the hyper connection plumbing.

pub mod gateway;
pub mod response;

// Re-export commonly used types
pub use gateway::{serve, GatewayRequest};
pub use response::GatewayResponse;
