// src/policy.rs

//! Who may do what.
//!
//! Route groups declare the [`Capability`] they need and
//! [`require_capability`] checks it against the caller's role before the
//! handler runs. Rules that depend on which rows the caller owns are the
//! plain functions at the bottom of this module.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    models::{connection::ConnectionRequest, online_class::OnlineClass, user::Role},
    utils::session::Identity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    FacultyWorkspace,
    RespondToConnections,
    CollegeWorkspace,
    PostRequirements,
    SearchFaculty,
    SendConnectionRequests,
    ScheduleClasses,
    StudentWorkspace,
    PostStudentRequests,
    BrowseFaculty,
    Chat,
    ViewConnections,
    ViewClasses,
    JoinClasses,
}

impl Capability {
    fn denial_message(self) -> &'static str {
        match self {
            Capability::SendConnectionRequests => "Only colleges can send requests!",
            Capability::Chat => "Chat is only available between colleges and faculty.",
            _ => "Access denied!",
        }
    }
}

/// Axum Middleware: Authorization.
///
/// Must run after `auth_middleware`. Rejects callers whose role lacks the
/// capability the route group was built with.
pub async fn require_capability(
    State(capability): State<Capability>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or(AppError::Unauthenticated)?;

    if !identity.role.can(capability) {
        tracing::warn!(
            "user {} ({}) lacks {:?} for {}",
            identity.user_id,
            identity.role,
            capability,
            req.uri().path()
        );
        return Err(AppError::denied(capability.denial_message()));
    }

    Ok(next.run(req).await)
}

/// Only the faculty a request was sent to may answer it.
pub fn may_respond(caller: &Identity, request: &ConnectionRequest) -> bool {
    caller.role == Role::Faculty && caller.profile_id == request.faculty_id
}

/// The (college profile, faculty profile) pair a chat between the caller
/// and another user would belong to. `None` unless one side is a college
/// and the other a faculty.
pub fn chat_pair(caller: &Identity, other_role: Role, other_profile_id: i64) -> Option<(i64, i64)> {
    match (caller.role, other_role) {
        (Role::College, Role::Faculty) => Some((caller.profile_id, other_profile_id)),
        (Role::Faculty, Role::College) => Some((other_profile_id, caller.profile_id)),
        _ => None,
    }
}

/// Whether the caller may enter a class room.
///
/// The scheduling college and the assigned faculty always may. A student
/// may when their institution matches the college's name (trimmed,
/// case-insensitive), or when they have not named an institution and
/// `allow_unaffiliated` is set.
pub fn may_join(
    caller: &Identity,
    class: &OnlineClass,
    student_institution: Option<&str>,
    allow_unaffiliated: bool,
) -> bool {
    match caller.role {
        Role::College => caller.profile_id == class.college_id,
        Role::Faculty => caller.profile_id == class.faculty_id,
        Role::Student => {
            let institution = normalize(student_institution.unwrap_or(""));
            if institution.is_empty() {
                allow_unaffiliated
            } else {
                institution == normalize(&class.college_name)
            }
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
