//! Role-based visibility rules
//!
//! One pure, total filter over the static route table, consumed by every
//! screen instead of per-screen role checks. Unknown or empty role tags see
//! nothing role-gated.

use serde::{Deserialize, Serialize};

use crate::models::{RequestStatus, Role};

/// Which part of the application a route belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    /// Unauthenticated entry points (sign-in, sign-up); never listed in menus
    Auth,
    /// Municipal staff dashboards and registries
    Staff,
    /// Farmer-facing screens
    Producer,
}

/// A menu/route entry with the roles allowed to see it.
///
/// An empty role list means "every authenticated role of the owning area".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub name: &'static str,
    pub path: &'static str,
    pub area: Area,
    pub roles: &'static [Role],
}

/// The application's route table, as rendered in the side menu
pub const ROUTES: &[RouteEntry] = &[
    RouteEntry {
        name: "Painel Administrativo",
        path: "/admin/dashboard",
        area: Area::Staff,
        roles: &[Role::Admin],
    },
    RouteEntry {
        name: "Agricultores",
        path: "/admin/agricultores",
        area: Area::Staff,
        roles: &[Role::Admin],
    },
    RouteEntry {
        name: "Funcionarios",
        path: "/admin/funcionarios",
        area: Area::Staff,
        roles: &[Role::Admin],
    },
    RouteEntry {
        name: "Propriedades",
        path: "/admin/propriedades",
        area: Area::Staff,
        roles: &[Role::Admin],
    },
    RouteEntry {
        name: "Solicitacoes",
        path: "/admin/solicitacoes",
        area: Area::Staff,
        roles: &[Role::Admin],
    },
    RouteEntry {
        name: "Servicos",
        path: "/admin/servicos",
        area: Area::Staff,
        roles: &[Role::Admin],
    },
    RouteEntry {
        name: "Frota de Veiculos",
        path: "/admin/veiculos",
        area: Area::Staff,
        roles: &[Role::Admin],
    },
    RouteEntry {
        name: "Minha Agenda",
        path: "/admin/minha-agenda",
        area: Area::Staff,
        roles: &[Role::Technician, Role::Operator, Role::Admin],
    },
    RouteEntry {
        name: "Meu Perfil",
        path: "/admin/profile",
        area: Area::Staff,
        roles: &[Role::Admin, Role::Technician, Role::Operator],
    },
    RouteEntry {
        name: "Painel do Produtor",
        path: "/produtor/dashboard",
        area: Area::Producer,
        roles: &[Role::Farmer],
    },
    RouteEntry {
        name: "Meus Pedidos",
        path: "/produtor/minhas-solicitacoes",
        area: Area::Producer,
        roles: &[Role::Farmer],
    },
    RouteEntry {
        name: "Meu Perfil",
        path: "/produtor/profile",
        area: Area::Producer,
        roles: &[Role::Farmer],
    },
    RouteEntry {
        name: "Sign In",
        path: "/auth/sign-in",
        area: Area::Auth,
        roles: &[],
    },
    RouteEntry {
        name: "Sign Up",
        path: "/auth/sign-up",
        area: Area::Auth,
        roles: &[],
    },
];

/// Filter the route table down to what a role may see in the menu.
///
/// Total over arbitrary role tags: an unknown or empty tag hides every
/// role-gated entry. Precedence, first match wins:
/// 1. auth-area entries are never shown;
/// 2. farmers never see the staff area, staff never see the producer area;
/// 3. within the staff area, technicians/operators see only entries that
///    list them explicitly;
/// 4. admins see the whole staff area, the personal schedule included.
pub fn visible_routes<'a>(routes: &'a [RouteEntry], role_tag: &str) -> Vec<&'a RouteEntry> {
    let role = match Role::parse(role_tag) {
        Some(role) => role,
        None => return Vec::new(),
    };

    routes
        .iter()
        .filter(|route| match route.area {
            Area::Auth => false,
            Area::Staff => {
                role.is_staff() && (route.roles.is_empty() || route.roles.contains(&role))
            }
            Area::Producer => {
                !role.is_staff() && (route.roles.is_empty() || route.roles.contains(&role))
            }
        })
        .collect()
}

/// The kinds of lifecycle actions a screen can offer on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Edit,
    Assign,
    Complete,
    Cancel,
}

/// Context needed to decide which actions a user may trigger on a request
#[derive(Debug, Clone, Copy)]
pub struct ActionContext {
    pub status: RequestStatus,
    /// The viewing user is the farmer who submitted the request
    pub is_requester: bool,
    /// The viewing user is the staff member currently assigned
    pub is_assignee: bool,
}

/// Lifecycle actions a role may trigger on a request in a given state.
///
/// Advisory for the UI; the backend re-validates every action through
/// [`crate::lifecycle::apply`].
pub fn visible_actions(ctx: ActionContext, role_tag: &str) -> Vec<ActionKind> {
    let role = match Role::parse(role_tag) {
        Some(role) => role,
        None => return Vec::new(),
    };

    let mut actions = Vec::new();
    if ctx.status.is_terminal() {
        return actions;
    }

    match role {
        Role::Farmer => {
            if ctx.is_requester && ctx.status == RequestStatus::Pending {
                actions.push(ActionKind::Edit);
                actions.push(ActionKind::Cancel);
            }
        }
        Role::Admin => {
            if ctx.status == RequestStatus::Pending {
                actions.push(ActionKind::Edit);
            }
            actions.push(ActionKind::Assign);
            actions.push(ActionKind::Complete);
            actions.push(ActionKind::Cancel);
        }
        Role::Technician | Role::Operator => {
            if ctx.is_assignee {
                actions.push(ActionKind::Complete);
            }
        }
    }
    actions
}

/// Whether a role may (un)assign staff at all
pub fn can_assign(role_tag: &str) -> bool {
    matches!(Role::parse(role_tag), Some(Role::Admin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_sees_whole_staff_area() {
        let visible = visible_routes(ROUTES, "admin");
        let paths: Vec<&str> = visible.iter().map(|r| r.path).collect();
        assert!(paths.contains(&"/admin/dashboard"));
        assert!(paths.contains(&"/admin/agricultores"));
        assert!(paths.contains(&"/admin/minha-agenda"));
        assert!(!paths.iter().any(|p| p.starts_with("/produtor")));
        assert!(!paths.iter().any(|p| p.starts_with("/auth")));
    }

    #[test]
    fn test_technician_sees_only_schedule_and_profile() {
        let visible = visible_routes(ROUTES, "tecnico");
        let paths: Vec<&str> = visible.iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/admin/minha-agenda", "/admin/profile"]);
    }

    #[test]
    fn test_farmer_sees_only_producer_area() {
        for tag in ["produtor", "agricultor"] {
            let visible = visible_routes(ROUTES, tag);
            assert!(!visible.is_empty());
            assert!(visible.iter().all(|r| r.area == Area::Producer));
        }
    }

    #[test]
    fn test_unknown_role_sees_nothing() {
        assert!(visible_routes(ROUTES, "").is_empty());
        assert!(visible_routes(ROUTES, "root").is_empty());
        assert!(visible_routes(ROUTES, "ADMIN!").is_empty());
    }

    #[test]
    fn test_farmer_actions_pending_only() {
        let ctx = ActionContext {
            status: RequestStatus::Pending,
            is_requester: true,
            is_assignee: false,
        };
        let actions = visible_actions(ctx, "produtor");
        assert_eq!(actions, vec![ActionKind::Edit, ActionKind::Cancel]);

        let in_progress = ActionContext {
            status: RequestStatus::InProgress,
            ..ctx
        };
        assert!(visible_actions(in_progress, "produtor").is_empty());
    }

    #[test]
    fn test_terminal_request_has_no_actions() {
        let ctx = ActionContext {
            status: RequestStatus::Completed,
            is_requester: false,
            is_assignee: true,
        };
        assert!(visible_actions(ctx, "admin").is_empty());
        assert!(visible_actions(ctx, "tecnico").is_empty());
    }
}
