//! Network services used by the client core.

pub mod api;
