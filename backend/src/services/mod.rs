//! Business logic services for the Organic Farm Records backend

pub mod admission;
pub mod auth;
pub mod crop;
pub mod harvester;
pub mod parcel;

pub use admission::AdmissionService;
pub use auth::AuthService;
pub use crop::CropService;
pub use harvester::HarvesterService;
pub use parcel::ParcelService;
