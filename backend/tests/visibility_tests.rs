//! Role-based visibility tests
//!
//! Property-based and unit tests for the menu/route filter:
//! - totality over arbitrary role tags (no panic, unknown tag sees nothing)
//! - area separation between staff and producer screens
//! - per-role action availability on requests

use proptest::prelude::*;

use shared::models::{RequestStatus, Role};
use shared::visibility::{
    can_assign, visible_actions, visible_routes, ActionContext, ActionKind, Area, ROUTES,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn known_role_tag_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("admin".to_string()),
        Just("gestor".to_string()),
        Just("produtor".to_string()),
        Just("agricultor".to_string()),
        Just("tecnico".to_string()),
        Just("operador".to_string()),
    ]
}

fn status_strategy() -> impl Strategy<Value = RequestStatus> {
    prop_oneof![
        Just(RequestStatus::Pending),
        Just(RequestStatus::InProgress),
        Just(RequestStatus::Completed),
        Just(RequestStatus::Cancelled),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// The filter is total: any string input yields a result without
    /// panicking, and unparseable tags see nothing
    #[test]
    fn prop_visible_routes_total_over_arbitrary_tags(tag in "\\PC{0,24}") {
        let visible = visible_routes(ROUTES, &tag);
        if Role::parse(&tag).is_none() {
            prop_assert!(visible.is_empty());
        }
    }

    /// Auth entry points never appear in a menu, for any role
    #[test]
    fn prop_auth_routes_never_visible(tag in known_role_tag_strategy()) {
        let visible = visible_routes(ROUTES, &tag);
        prop_assert!(visible.iter().all(|r| r.area != Area::Auth));
    }

    /// Staff and producer areas never mix in one menu
    #[test]
    fn prop_areas_do_not_mix(tag in known_role_tag_strategy()) {
        let visible = visible_routes(ROUTES, &tag);
        let has_staff = visible.iter().any(|r| r.area == Area::Staff);
        let has_producer = visible.iter().any(|r| r.area == Area::Producer);
        prop_assert!(!(has_staff && has_producer));
    }

    /// Action visibility is total and empty on terminal requests
    #[test]
    fn prop_no_actions_on_terminal_requests(
        tag in "\\PC{0,24}",
        is_requester in any::<bool>(),
        is_assignee in any::<bool>(),
        terminal in prop_oneof![
            Just(RequestStatus::Completed),
            Just(RequestStatus::Cancelled),
        ],
    ) {
        let ctx = ActionContext { status: terminal, is_requester, is_assignee };
        prop_assert!(visible_actions(ctx, &tag).is_empty());
    }

    /// Only admins may assign, whatever the request looks like
    #[test]
    fn prop_assignment_is_admin_only(
        tag in known_role_tag_strategy(),
        status in status_strategy(),
        is_requester in any::<bool>(),
        is_assignee in any::<bool>(),
    ) {
        let ctx = ActionContext { status, is_requester, is_assignee };
        let offers_assign = visible_actions(ctx, &tag).contains(&ActionKind::Assign);
        prop_assert_eq!(offers_assign, can_assign(&tag) && !status.is_terminal());
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_technician_menu_is_exactly_schedule_and_profile() {
    let paths: Vec<&str> = visible_routes(ROUTES, "tecnico")
        .iter()
        .map(|r| r.path)
        .collect();
    assert_eq!(paths, vec!["/admin/minha-agenda", "/admin/profile"]);

    let operator_paths: Vec<&str> = visible_routes(ROUTES, "operador")
        .iter()
        .map(|r| r.path)
        .collect();
    assert_eq!(paths, operator_paths);
}

#[test]
fn test_gestor_is_an_admin_synonym() {
    let admin: Vec<&str> = visible_routes(ROUTES, "admin").iter().map(|r| r.path).collect();
    let gestor: Vec<&str> = visible_routes(ROUTES, "gestor").iter().map(|r| r.path).collect();
    assert_eq!(admin, gestor);
    assert!(admin.contains(&"/admin/dashboard"));
}

#[test]
fn test_farmer_sees_producer_screens_only() {
    let paths: Vec<&str> = visible_routes(ROUTES, "produtor")
        .iter()
        .map(|r| r.path)
        .collect();
    assert_eq!(
        paths,
        vec![
            "/produtor/dashboard",
            "/produtor/minhas-solicitacoes",
            "/produtor/profile"
        ]
    );
}

#[test]
fn test_assignee_technician_may_complete() {
    let ctx = ActionContext {
        status: RequestStatus::InProgress,
        is_requester: false,
        is_assignee: true,
    };
    assert_eq!(visible_actions(ctx, "tecnico"), vec![ActionKind::Complete]);

    let not_assignee = ActionContext {
        is_assignee: false,
        ..ctx
    };
    assert!(visible_actions(not_assignee, "tecnico").is_empty());
}

#[test]
fn test_admin_actions_depend_on_status() {
    let pending = ActionContext {
        status: RequestStatus::Pending,
        is_requester: false,
        is_assignee: false,
    };
    assert_eq!(
        visible_actions(pending, "admin"),
        vec![
            ActionKind::Edit,
            ActionKind::Assign,
            ActionKind::Complete,
            ActionKind::Cancel
        ]
    );

    let in_progress = ActionContext {
        status: RequestStatus::InProgress,
        ..pending
    };
    assert_eq!(
        visible_actions(in_progress, "admin"),
        vec![ActionKind::Assign, ActionKind::Complete, ActionKind::Cancel]
    );
}

#[test]
fn test_role_parse_is_case_and_whitespace_tolerant() {
    assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
    assert_eq!(Role::parse("AGRICULTOR"), Some(Role::Farmer));
    assert_eq!(Role::parse("supervisor"), None);
    assert_eq!(Role::parse(""), None);
}
