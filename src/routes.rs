// src/routes.rs

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{
        auth, chat, classes, connection, dashboard, home, profile, requirement, search,
        student_request,
    },
    policy::{Capability, require_capability},
    state::AppState,
    utils::session::auth_middleware,
};

/// Wraps a route group so that only roles holding `capability` reach it.
fn guarded(capability: Capability, routes: Router<AppState>) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(capability, require_capability))
}

/// Assembles the main application router.
///
/// * Public pages (home, register, login, browse boards).
/// * Role workspaces and shared pages, each group guarded by a capability.
/// * Session authentication in front of every protected group.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(home::index))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/requirements", get(requirement::browse_requirements))
        .route("/student-requests", get(student_request::browse_student_requests));

    let faculty_routes = Router::new()
        .route("/faculty/dashboard", get(dashboard::faculty_dashboard))
        .route(
            "/faculty/profile",
            get(profile::show_profile).post(profile::update_faculty_profile),
        );

    let respond_routes = Router::new()
        .route("/faculty/requests", get(connection::list_requests))
        .route(
            "/faculty/respond-request/{id}/{action}",
            get(connection::respond_request),
        );

    let college_routes = Router::new()
        .route("/college/dashboard", get(dashboard::college_dashboard))
        .route(
            "/college/profile",
            get(profile::show_profile).post(profile::update_college_profile),
        );

    let search_routes = Router::new()
        .route("/college/search-faculty", get(search::college_search))
        .route("/college/view-faculty/{id}", get(search::view_faculty));

    let posting_routes = Router::new().route(
        "/college/post-requirement",
        get(requirement::post_requirement_form).post(requirement::post_requirement),
    );

    let send_routes = Router::new().route(
        "/college/send-request/{faculty_id}",
        post(connection::send_request),
    );

    let schedule_routes = Router::new().route(
        "/college/schedule-class/{faculty_id}",
        get(classes::schedule_form).post(classes::schedule_class),
    );

    let student_routes = Router::new()
        .route("/student/dashboard", get(dashboard::student_dashboard))
        .route(
            "/student/profile",
            get(profile::show_profile).post(profile::update_student_profile),
        );

    let student_posting_routes = Router::new().route(
        "/student/post-request",
        get(student_request::post_request_form).post(student_request::post_request),
    );

    let browse_routes =
        Router::new().route("/student/search-faculty", get(search::student_search));

    let chat_routes = Router::new().route(
        "/chat/{other_user_id}",
        get(chat::show_chat).post(chat::send_message),
    );

    let protected_routes = Router::new()
        .route("/dashboard", get(dashboard::dispatch))
        .route("/logout", get(auth::logout))
        .merge(guarded(Capability::FacultyWorkspace, faculty_routes))
        .merge(guarded(Capability::RespondToConnections, respond_routes))
        .merge(guarded(Capability::CollegeWorkspace, college_routes))
        .merge(guarded(Capability::SearchFaculty, search_routes))
        .merge(guarded(Capability::PostRequirements, posting_routes))
        .merge(guarded(Capability::SendConnectionRequests, send_routes))
        .merge(guarded(Capability::ScheduleClasses, schedule_routes))
        .merge(guarded(Capability::StudentWorkspace, student_routes))
        .merge(guarded(Capability::PostStudentRequests, student_posting_routes))
        .merge(guarded(Capability::BrowseFaculty, browse_routes))
        .merge(guarded(Capability::Chat, chat_routes))
        .merge(guarded(
            Capability::ViewConnections,
            Router::new().route("/messages", get(chat::list_conversations)),
        ))
        .merge(guarded(
            Capability::ViewClasses,
            Router::new().route("/classes", get(classes::list_classes)),
        ))
        .merge(guarded(
            Capability::JoinClasses,
            Router::new().route("/join-class/{token}", get(classes::join_class)),
        ))
        // Added last so it wraps the capability checks and runs first.
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
