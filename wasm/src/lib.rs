//! WebAssembly module for RuralGest
//!
//! Exposes the shared pure logic to the browser front-end so the client
//! enforces the same rules the backend does:
//! - role-based menu visibility
//! - request action gating (including the completion gate)
//! - lookup resolution with the "N/A" placeholder

use wasm_bindgen::prelude::*;

use shared::lifecycle::{apply, RequestAction, RequestState};
use shared::models::{RequestStatus, ServiceRequest};
use shared::resolver::{resolve, sort_newest_first, Catalogs};
use shared::visibility::{visible_actions, visible_routes, ActionContext, ROUTES};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Menu route paths visible to a role, as a JSON array of strings.
///
/// Unknown roles get an empty array, never an error.
#[wasm_bindgen]
pub fn visible_route_paths(role: &str) -> String {
    let paths: Vec<&str> = visible_routes(ROUTES, role)
        .into_iter()
        .map(|r| r.path)
        .collect();
    serde_json::to_string(&paths).unwrap_or_else(|_| "[]".to_string())
}

/// Action kinds a role may trigger on a request, as a JSON array.
#[wasm_bindgen]
pub fn visible_action_kinds(
    status: &str,
    role: &str,
    is_requester: bool,
    is_assignee: bool,
) -> String {
    let status = match RequestStatus::parse(status) {
        Some(status) => status,
        None => return "[]".to_string(),
    };
    let actions = visible_actions(
        ActionContext {
            status,
            is_requester,
            is_assignee,
        },
        role,
    );
    serde_json::to_string(&actions).unwrap_or_else(|_| "[]".to_string())
}

/// Whether a completion attempt would pass the assignment gate.
#[wasm_bindgen]
pub fn completion_allowed(requires_staff: bool, has_assignee: bool) -> bool {
    !requires_staff || has_assignee
}

/// Dry-run a lifecycle action against a request state.
///
/// `state_json` is a serialized [`RequestState`], `action_json` a serialized
/// [`RequestAction`]. Returns the updated state as JSON, or the rejection
/// reason as a JS error.
#[wasm_bindgen]
pub fn apply_action(state_json: &str, action_json: &str) -> Result<String, JsValue> {
    let state: RequestState = serde_json::from_str(state_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid state JSON: {}", e)))?;
    let action: RequestAction = serde_json::from_str(action_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;

    let next = apply(&state, &action).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&next).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Join fetched requests against fetched catalogs, newest first.
///
/// Missing references resolve to "N/A"; an empty or absent catalog never
/// fails the render.
#[wasm_bindgen]
pub fn resolve_requests(requests_json: &str, catalogs_json: &str) -> Result<String, JsValue> {
    let mut requests: Vec<ServiceRequest> = serde_json::from_str(requests_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid requests JSON: {}", e)))?;
    let catalogs: Catalogs = serde_json::from_str(catalogs_json).unwrap_or_default();

    sort_newest_first(&mut requests);
    let resolved: Vec<_> = requests.iter().map(|r| resolve(r, &catalogs)).collect();
    serde_json::to_string(&resolved).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_route_paths_unknown_role() {
        assert_eq!(visible_route_paths("root"), "[]");
    }

    #[test]
    fn test_completion_gate() {
        assert!(!completion_allowed(true, false));
        assert!(completion_allowed(true, true));
        assert!(completion_allowed(false, false));
    }

    #[test]
    fn test_resolve_requests_with_empty_catalogs() {
        let requests = r#"[{
            "id": "00000000-0000-0000-0000-000000000001",
            "farmer_id": "00000000-0000-0000-0000-000000000007",
            "property_id": "00000000-0000-0000-0000-000000000003",
            "service_type_id": "00000000-0000-0000-0000-000000000002",
            "vehicle_id": null,
            "assignee_id": null,
            "status": "PENDENTE",
            "submission_date": "2024-01-01",
            "execution_date": null,
            "note": "urgente",
            "staff_notes": null,
            "completion_report": null,
            "version": 0,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }]"#;
        let out = resolve_requests(requests, "{}").unwrap();
        assert!(out.contains("N/A"));
    }
}
