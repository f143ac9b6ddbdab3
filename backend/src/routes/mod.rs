//! Route definitions for the RuralGest API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - service requests
        .nest("/requests", request_routes())
        // Protected routes - service-type catalog
        .nest("/services", service_type_routes())
        // Protected routes - rural properties
        .nest("/properties", property_routes())
        // Protected routes - farmer registry
        .nest("/farmers", farmer_routes())
        // Protected routes - staff registry
        .nest("/staff", staff_routes())
        // Protected routes - fleet
        .nest("/vehicles", vehicle_routes())
        // Protected routes - notifications
        .nest("/notifications", notification_routes())
        // Protected routes - generated documents
        .nest("/documents", document_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Service-request routes (protected)
fn request_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route("/resolved", get(handlers::list_resolved_requests))
        .route(
            "/:request_id",
            get(handlers::get_request).put(handlers::update_request),
        )
        .route("/:request_id/assign", post(handlers::assign_request))
        .route("/:request_id/complete", post(handlers::complete_request))
        .route("/:request_id/cancel", post(handlers::cancel_request))
        .route(
            "/:request_id/documents",
            get(handlers::list_request_documents),
        )
        .route("/:request_id/protocol", post(handlers::generate_protocol))
        .route("/:request_id/report", post(handlers::generate_report))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Service-type catalog routes (protected)
fn service_type_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_service_types).post(handlers::create_service_type),
        )
        .route(
            "/:id",
            get(handlers::get_service_type)
                .put(handlers::update_service_type)
                .delete(handlers::delete_service_type),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Rural property routes (protected)
fn property_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_properties).post(handlers::create_property),
        )
        .route(
            "/:id",
            get(handlers::get_property)
                .put(handlers::update_property)
                .delete(handlers::delete_property),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Farmer registry routes (protected)
fn farmer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farmers).post(handlers::create_farmer))
        .route(
            "/:id",
            get(handlers::get_farmer)
                .put(handlers::update_farmer)
                .delete(handlers::delete_farmer),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Staff registry routes (protected)
fn staff_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_staff).post(handlers::create_staff_member),
        )
        .route(
            "/:id",
            get(handlers::get_staff_member)
                .put(handlers::update_staff_member)
                .delete(handlers::delete_staff_member),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Fleet routes (protected)
fn vehicle_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_vehicles).post(handlers::create_vehicle),
        )
        .route(
            "/:id",
            get(handlers::get_vehicle)
                .put(handlers::update_vehicle)
                .delete(handlers::delete_vehicle),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Notification routes (protected)
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_notifications))
        .route("/mark-all-read", post(handlers::mark_all_as_read))
        .route("/:notification_id/read", post(handlers::mark_as_read))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Generated-document routes (protected)
fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/export", post(handlers::export_requests_csv))
        .route("/:document_id", get(handlers::download_document))
        .route_layer(middleware::from_fn(auth_middleware))
}
