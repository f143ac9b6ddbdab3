//! Business logic services

pub mod auth;
pub mod document;
pub mod farmer;
pub mod notification;
pub mod property;
pub mod request;
pub mod service_type;
pub mod staff;
pub mod vehicle;

pub use auth::AuthService;
pub use document::DocumentService;
pub use farmer::FarmerService;
pub use notification::NotificationService;
pub use property::PropertyService;
pub use request::RequestService;
pub use service_type::ServiceTypeService;
pub use staff::StaffService;
pub use vehicle::VehicleService;
