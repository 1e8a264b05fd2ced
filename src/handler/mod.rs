//! Request handler module
//!
//! Responsible for request routing dispatch and the todo operations.
//! Stateless: every call works only with the request and the store it is given.

pub mod error;
pub mod router;
mod todos;


// Re-export main entry point
pub use router::handle;
