//! # Herald Core
//!
//! Data layer of the Herald bot framework.
//!
//! This crate provides:
//! - **Response documents** ([`ResponseDocument`], [`Field`]): lazily-typed
//!   wrappers over decoded JSON with map-style and relation-typed access
//! - **Document kinds** ([`DocumentKind`]): per-kind relation tables used for
//!   typed access
//! - **Updates** ([`Update`]): inbound events with type and payload-subtype
//!   classification
//! - **Typed views** ([`model`]): serde structs for common objects
//!
//! Command resolution and execution live in `herald-framework`.

pub mod classify;
pub mod document;
pub mod error;
pub mod field;
pub mod kind;
pub mod model;
pub mod update;

pub use classify::{MESSAGE_CONTENT_KINDS, UPDATE_ID_KEY};
pub use document::ResponseDocument;
pub use error::{DocumentError, DocumentResult, MalformedUpdate};
pub use field::Field;
pub use kind::{DocumentKind, Relation};
pub use model::{Chat, MessageEntity, User};
pub use update::Update;
