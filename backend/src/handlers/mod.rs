//! HTTP handlers for the Organic Farm Records backend

pub mod admission;
pub mod auth;
pub mod crop;
pub mod harvester;
pub mod health;
pub mod parcel;

pub use admission::*;
pub use auth::*;
pub use crop::*;
pub use harvester::*;
pub use health::*;
pub use parcel::*;
