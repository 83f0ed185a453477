use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::instrument;

use crate::entity::{team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::results::HackathonResultsResponse;
use crate::results::source::{DbResultsSource, fetch_published_results};
use crate::results::watcher;
use crate::state::AppState;
use crate::utils::hackathon::{check_hackathon_access, find_hackathon};

#[utoipa::path(
    get,
    path = "/api/v1/results/hackathon/{id}",
    tag = "Results",
    operation_id = "getHackathonResults",
    summary = "Get a hackathon's published results",
    description = "Returns the ranked standings. The list is empty until an admin publishes results.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Results (possibly empty)", body = HackathonResultsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id))]
pub async fn get_hackathon_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<HackathonResultsResponse>, AppError> {
    let hackathon_model = find_hackathon(&state.db, hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon_model)?;

    // Result rows only exist once published, so this is inherently empty
    // beforehand.
    let results = fetch_published_results(&state.db, hackathon_id).await?;

    Ok(Json(HackathonResultsResponse {
        hackathon: hackathon_model.into(),
        results,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/results/watch",
    tag = "Results",
    operation_id = "watchResults",
    summary = "Stream result reveals for the caller's hackathons",
    description = "Server-sent events. A results watcher polls each of the caller's hackathons once per interval; when a hackathon's results appear, one `results` event is emitted and that hackathon is never polled again for this stream. Disconnecting tears the watcher down. The stream ends once every watched hackathon has been revealed.",
    responses(
        (status = 200, description = "SSE stream of `results` events", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn watch_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Every hackathon the caller participates in through a team.
    let hackathon_ids: Vec<i32> = team::Entity::find()
        .filter(
            team::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(team_member::Column::TeamId)
                    .from(team_member::Entity)
                    .and_where(team_member::Column::UserId.eq(auth_user.user_id))
                    .to_owned(),
            ),
        )
        .select_only()
        .column(team::Column::HackathonId)
        .into_tuple()
        .all(&state.db)
        .await?;

    let source = Arc::new(DbResultsSource::new(state.db.clone()));
    let poll_interval = Duration::from_secs(state.config.results.poll_interval_secs);
    let (handle, rx) = watcher::spawn(source, hackathon_ids, poll_interval);

    // The handle rides along inside the stream state: when the client
    // disconnects the stream is dropped, the handle with it, and the
    // polling loop aborts.
    let stream = futures::stream::unfold((rx, handle), |(mut rx, handle)| async move {
        let reveal = rx.recv().await?;
        let event = Event::default().event("results").json_data(&reveal).ok()?;
        Some((Ok::<_, Infallible>(event), (rx, handle)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
