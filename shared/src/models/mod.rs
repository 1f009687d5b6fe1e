//! Domain models for the Organic Farm Records system

pub mod crop;
pub mod parcel;

pub use crop::*;
pub use parcel::*;
