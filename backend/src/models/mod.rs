//! Database models for the Organic Farm Records backend
//!
//! Re-exports models from the shared crate; row types live next to their
//! services.

pub use shared::models::*;
