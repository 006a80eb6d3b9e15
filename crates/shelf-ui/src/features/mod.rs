//! Feature surfaces: item list state and the bulk action flow.

pub mod bulk;
pub mod items;
