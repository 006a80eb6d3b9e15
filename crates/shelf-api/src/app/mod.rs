//! Application state shared by every handler.

pub mod state;
