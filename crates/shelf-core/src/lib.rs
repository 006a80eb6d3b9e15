#![forbid(unsafe_code)]
#![warn(unused, missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Asset domain types and the storage seams implemented by Shelf adapters.

pub mod error;
pub mod model;
pub mod service;

pub use error::{CoreError, CoreResult};
pub use model::{
    BulkOperation, CustodianCount, DashboardData, ErrorCorrection, ImageUpload, Item,
    ItemDetailRecord, ItemPage, ItemPatch, ItemQuery, ItemRecord, ItemStatus, Label, LabelKind,
    Lifecycle, MonthlyCount, NewItem, NewLabel, NewNote, Note, QrCode, SignedUrl,
    main_image_key,
};
pub use service::{ImageStore, ItemRepository};
