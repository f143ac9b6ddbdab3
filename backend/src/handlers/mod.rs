//! HTTP request handlers

pub mod auth;
pub mod document;
pub mod farmer;
pub mod health;
pub mod notification;
pub mod property;
pub mod request;
pub mod service_type;
pub mod staff;
pub mod vehicle;

pub use auth::{login, refresh, register};
pub use document::{
    download_document, export_requests_csv, generate_protocol, generate_report,
    list_request_documents,
};
pub use farmer::{create_farmer, delete_farmer, get_farmer, list_farmers, update_farmer};
pub use health::health_check;
pub use notification::{get_notifications, mark_all_as_read, mark_as_read};
pub use property::{
    create_property, delete_property, get_property, list_properties, update_property,
};
pub use request::{
    assign_request, cancel_request, complete_request, create_request, get_request, list_requests,
    list_resolved_requests, update_request,
};
pub use service_type::{
    create_service_type, delete_service_type, get_service_type, list_service_types,
    update_service_type,
};
pub use staff::{
    create_staff_member, delete_staff_member, get_staff_member, list_staff, update_staff_member,
};
pub use vehicle::{create_vehicle, delete_vehicle, get_vehicle, list_vehicles, update_vehicle};
