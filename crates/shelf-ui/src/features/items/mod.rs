//! Item list feature: rows, paging, and filters.

pub mod state;
