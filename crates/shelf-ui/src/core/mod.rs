//! Renderer-free primitives: the app store and path helpers.

pub mod logic;
pub mod store;
