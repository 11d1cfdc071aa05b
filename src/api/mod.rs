// API module entry point
// Endpoint handlers, response envelope types, and JSON response builders.

pub mod handlers;
pub mod response;
pub mod types;
