pub mod config;
pub mod dashboard;
pub mod database;
pub mod entity;
pub mod error;
pub mod events;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod results;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "vHack API",
        version = "1.0.0",
        description = "API for the vHack hackathon platform"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::skills::list_skills,
        handlers::hackathon::create_hackathon,
        handlers::hackathon::list_hackathons,
        handlers::hackathon::get_hackathon,
        handlers::hackathon::update_hackathon,
        handlers::hackathon::delete_hackathon,
        handlers::hackathon::submit_hackathon,
        handlers::team::create_team,
        handlers::team::list_teams,
        handlers::team::get_team,
        handlers::team::join_team,
        handlers::team::leave_team,
        handlers::project::submit_project,
        handlers::project::get_team_project,
        handlers::project::update_project,
        handlers::project::list_hackathon_projects,
        handlers::judge::score_project,
        handlers::judge::list_project_scores,
        handlers::results::get_hackathon_results,
        handlers::results::watch_results,
        handlers::achievement::list_achievements,
        handlers::admin::get_dashboard,
        handlers::admin::list_pending_hackathons,
        handlers::admin::approve_hackathon,
        handlers::admin::reject_hackathon,
        handlers::admin::publish_results,
    ),
    tags(
        (name = "Auth", description = "Authentication and user management"),
        (name = "Skills", description = "Predefined skill tags"),
        (name = "Hackathons", description = "Hackathon CRUD and approval workflow"),
        (name = "Teams", description = "Team formation within hackathons"),
        (name = "Projects", description = "Project submission"),
        (name = "Judging", description = "Scoring projects against judging criteria"),
        (name = "Results", description = "Published results and reveal streaming"),
        (name = "Achievements", description = "Derived participant achievements"),
        (name = "Admin", description = "Approval actions and the aggregate dashboard"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(cfg.max_age));

    if cfg.allow_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state)
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
}
