use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/skills", skills_routes())
        .nest("/hackathons", hackathon_routes())
        .nest("/teams", team_routes())
        .nest("/projects", project_routes())
        .nest("/results", results_routes())
        .nest("/achievements", achievement_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn skills_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::skills::list_skills))
}

fn hackathon_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::hackathon::list_hackathons).post(handlers::hackathon::create_hackathon),
        )
        .route(
            "/{id}",
            get(handlers::hackathon::get_hackathon)
                .patch(handlers::hackathon::update_hackathon)
                .delete(handlers::hackathon::delete_hackathon),
        )
        .route("/{id}/submit", post(handlers::hackathon::submit_hackathon))
        .route(
            "/{id}/teams",
            get(handlers::team::list_teams).post(handlers::team::create_team),
        )
        .route(
            "/{id}/projects",
            get(handlers::project::list_hackathon_projects),
        )
}

fn team_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(handlers::team::get_team))
        .route("/{id}/join", post(handlers::team::join_team))
        .route("/{id}/leave", post(handlers::team::leave_team))
        .route(
            "/{id}/project",
            get(handlers::project::get_team_project).post(handlers::project::submit_project),
        )
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", patch(handlers::project::update_project))
        .route("/{id}/score", put(handlers::judge::score_project))
        .route("/{id}/scores", get(handlers::judge::list_project_scores))
}

fn results_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/hackathon/{id}",
            get(handlers::results::get_hackathon_results),
        )
        .route("/watch", get(handlers::results::watch_results))
}

fn achievement_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::achievement::list_achievements))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::admin::get_dashboard))
        .route(
            "/pending-hackathons",
            get(handlers::admin::list_pending_hackathons),
        )
        .route(
            "/hackathons/{id}/approve",
            put(handlers::admin::approve_hackathon),
        )
        .route(
            "/hackathons/{id}/reject",
            put(handlers::admin::reject_hackathon),
        )
        .route(
            "/hackathons/{id}/publish-results",
            put(handlers::admin::publish_results),
        )
}
