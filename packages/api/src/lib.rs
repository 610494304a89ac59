// ABOUTME: HTTP API layer for Testdesk providing REST endpoints and routing
// ABOUTME: Integration layer that depends on all domain packages

use axum::{
    routing::{get, post, put},
    Router,
};

use testdesk_projects::DbState;

pub mod auth;
pub mod handlers;
pub mod requirements_handlers;
pub mod response;
pub mod tabs_handlers;

/// Creates the projects API router
pub fn create_projects_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route("/{id}/tabs", put(handlers::reorder_tabs))
}

/// Creates the requirements API router
pub fn create_requirements_router() -> Router<DbState> {
    Router::new()
        .route("/save", post(requirements_handlers::save_requirements))
        .route(
            "/generate",
            post(requirements_handlers::generate_requirement),
        )
        .route(
            "/{project_id}",
            get(requirements_handlers::list_requirements),
        )
}

/// Creates the test case tabs API router
pub fn create_tabs_router() -> Router<DbState> {
    Router::new()
        .route("/create", post(tabs_handlers::create_tab))
        .route("/save", post(tabs_handlers::save_rows))
        .route("/rename", post(tabs_handlers::rename_tab))
        .route("/delete", post(tabs_handlers::delete_tab))
        .route("/repair", post(tabs_handlers::repair_naming))
        .route("/sweep", post(tabs_handlers::sweep_orphans))
        .route(
            "/summary/{project_id}",
            get(tabs_handlers::project_summary),
        )
        .route("/{project_id}/{tab_id}", get(tabs_handlers::get_rows))
}

/// Creates the complete API router with state applied
pub fn create_router(state: DbState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .nest("/api/projects", create_projects_router())
        .nest("/api/requirements", create_requirements_router())
        .nest("/api/testcase-tabs", create_tabs_router())
        .with_state(state)
}
