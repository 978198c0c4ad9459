//! HTTP handlers. Each handler extracts the caller from request headers and
//! delegates to the `Repository`, which applies the metadata behavior.

pub mod caller;
pub mod health_handlers;
pub mod metadata_handlers;
pub mod page_handlers;
