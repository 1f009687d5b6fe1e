//! Shared types and models for the Organic Farm Records system
//!
//! This crate contains the land-parcel domain core shared between the
//! backend and the browser form (via WASM): models, in-memory editing
//! reducers, validation rules, and submission payload assembly.

pub mod editor;
pub mod models;
pub mod submission;
pub mod types;
pub mod validation;

pub use editor::*;
pub use models::*;
pub use submission::*;
pub use types::*;
pub use validation::*;
