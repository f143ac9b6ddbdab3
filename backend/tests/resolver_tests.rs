//! Lookup-resolution tests
//!
//! Property-based and unit tests for the request view join:
//! - resolution never panics, whatever the catalogs contain
//! - missing references degrade to the "N/A" placeholder
//! - present references resolve to their display names

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

use shared::models::{RequestStatus, ServiceRequest};
use shared::resolver::{resolve, Catalogs, ServiceTypeSummary, PLACEHOLDER};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn uuid_strategy() -> impl Strategy<Value = Uuid> {
    (1u128..64u128).prop_map(Uuid::from_u128)
}

fn request_strategy() -> impl Strategy<Value = ServiceRequest> {
    (
        uuid_strategy(),
        uuid_strategy(),
        uuid_strategy(),
        uuid_strategy(),
        proptest::option::of(uuid_strategy()),
        proptest::option::of(uuid_strategy()),
    )
        .prop_map(|(id, farmer, property, service, vehicle, assignee)| ServiceRequest {
            id,
            farmer_id: farmer,
            property_id: property,
            service_type_id: service,
            vehicle_id: vehicle,
            assignee_id: assignee,
            status: RequestStatus::Pending,
            submission_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            execution_date: None,
            note: None,
            staff_notes: None,
            completion_report: None,
            version: 0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        })
}

fn name_catalog_strategy() -> impl Strategy<Value = HashMap<Uuid, String>> {
    proptest::collection::hash_map(uuid_strategy(), "[A-Za-z ]{1,20}", 0..32)
}

fn catalogs_strategy() -> impl Strategy<Value = Catalogs> {
    (
        name_catalog_strategy(),
        name_catalog_strategy(),
        proptest::collection::hash_map(
            uuid_strategy(),
            ("[A-Za-z ]{1,20}", any::<bool>()).prop_map(|(name, requires_staff)| {
                ServiceTypeSummary {
                    name,
                    requires_staff,
                }
            }),
            0..32,
        ),
        name_catalog_strategy(),
        name_catalog_strategy(),
    )
        .prop_map(|(farmers, properties, service_types, vehicles, staff)| Catalogs {
            farmers,
            properties,
            service_types,
            vehicles,
            staff,
        })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Resolution is total: every field is either a real name or the
    /// placeholder, never a panic
    #[test]
    fn prop_resolution_never_panics(
        request in request_strategy(),
        catalogs in catalogs_strategy(),
    ) {
        let resolved = resolve(&request, &catalogs);

        match catalogs.farmers.get(&request.farmer_id) {
            Some(name) => prop_assert_eq!(&resolved.farmer_name, name),
            None => prop_assert_eq!(&resolved.farmer_name, PLACEHOLDER),
        }
        match catalogs.properties.get(&request.property_id) {
            Some(name) => prop_assert_eq!(&resolved.property_name, name),
            None => prop_assert_eq!(&resolved.property_name, PLACEHOLDER),
        }
        match catalogs.service_types.get(&request.service_type_id) {
            Some(summary) => {
                prop_assert_eq!(&resolved.service_name, &summary.name);
                prop_assert_eq!(resolved.requires_staff, summary.requires_staff);
            }
            None => {
                prop_assert_eq!(&resolved.service_name, PLACEHOLDER);
                prop_assert!(!resolved.requires_staff);
            }
        }
    }

    /// Optional references stay `None` when absent from the request, and
    /// fall back to the placeholder only when set but unresolvable
    #[test]
    fn prop_optional_references(
        request in request_strategy(),
        catalogs in catalogs_strategy(),
    ) {
        let resolved = resolve(&request, &catalogs);

        prop_assert_eq!(resolved.vehicle_name.is_some(), request.vehicle_id.is_some());
        prop_assert_eq!(resolved.assignee_name.is_some(), request.assignee_id.is_some());

        if let (Some(id), Some(name)) = (request.vehicle_id, resolved.vehicle_name.as_deref()) {
            match catalogs.vehicles.get(&id) {
                Some(known) => prop_assert_eq!(name, known),
                None => prop_assert_eq!(name, PLACEHOLDER),
            }
        }
    }

    /// Empty catalogs resolve everything to placeholders
    #[test]
    fn prop_empty_catalogs_all_placeholders(request in request_strategy()) {
        let resolved = resolve(&request, &Catalogs::default());
        prop_assert_eq!(&resolved.farmer_name, PLACEHOLDER);
        prop_assert_eq!(&resolved.property_name, PLACEHOLDER);
        prop_assert_eq!(&resolved.service_name, PLACEHOLDER);
        prop_assert!(!resolved.requires_staff);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_fully_populated_catalogs_resolve_names() {
    let farmer = Uuid::from_u128(1);
    let property = Uuid::from_u128(2);
    let service = Uuid::from_u128(3);
    let vehicle = Uuid::from_u128(4);
    let staff = Uuid::from_u128(5);

    let mut catalogs = Catalogs::default();
    catalogs.farmers.insert(farmer, "João da Silva".to_string());
    catalogs.properties.insert(property, "Sítio Boa Vista".to_string());
    catalogs.service_types.insert(
        service,
        ServiceTypeSummary {
            name: "Aração de terra".to_string(),
            requires_staff: true,
        },
    );
    catalogs.vehicles.insert(vehicle, "Trator 01".to_string());
    catalogs.staff.insert(staff, "Carlos".to_string());

    let request = ServiceRequest {
        id: Uuid::from_u128(10),
        farmer_id: farmer,
        property_id: property,
        service_type_id: service,
        vehicle_id: Some(vehicle),
        assignee_id: Some(staff),
        status: RequestStatus::InProgress,
        submission_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        execution_date: None,
        note: Some("Talhão norte".to_string()),
        staff_notes: None,
        completion_report: None,
        version: 2,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };

    let resolved = resolve(&request, &catalogs);
    assert_eq!(resolved.farmer_name, "João da Silva");
    assert_eq!(resolved.property_name, "Sítio Boa Vista");
    assert_eq!(resolved.service_name, "Aração de terra");
    assert!(resolved.requires_staff);
    assert_eq!(resolved.vehicle_name.as_deref(), Some("Trator 01"));
    assert_eq!(resolved.assignee_name.as_deref(), Some("Carlos"));
    assert_eq!(resolved.version, 2);
}

#[test]
fn test_stale_reference_degrades_to_placeholder() {
    let mut catalogs = Catalogs::default();
    catalogs
        .farmers
        .insert(Uuid::from_u128(1), "Maria".to_string());

    let request = ServiceRequest {
        id: Uuid::from_u128(10),
        farmer_id: Uuid::from_u128(1),
        property_id: Uuid::from_u128(99),
        service_type_id: Uuid::from_u128(98),
        vehicle_id: Some(Uuid::from_u128(97)),
        assignee_id: None,
        status: RequestStatus::Pending,
        submission_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        execution_date: None,
        note: None,
        staff_notes: None,
        completion_report: None,
        version: 0,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };

    let resolved = resolve(&request, &catalogs);
    assert_eq!(resolved.farmer_name, "Maria");
    assert_eq!(resolved.property_name, PLACEHOLDER);
    assert_eq!(resolved.service_name, PLACEHOLDER);
    assert_eq!(resolved.vehicle_name.as_deref(), Some(PLACEHOLDER));
    assert_eq!(resolved.assignee_name, None);
}
