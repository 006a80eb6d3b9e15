#![forbid(unsafe_code)]
#![warn(unused, missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! In-process adapters for the Shelf repository and image storage traits.
//!
//! # Design
//! - State lives behind a single `tokio::sync::RwLock` so each call observes
//!   and mutates a consistent snapshot.
//! - Ownership is enforced on every read and write; foreign rows behave as
//!   missing.
//! - Image URLs are signed with a SHA-256 digest over the server secret, the
//!   object key, and the expiry.

mod images;
mod memory;

pub use images::MemoryImageStore;
pub use memory::MemoryRepository;
