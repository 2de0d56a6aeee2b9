// ABOUTME: Route definitions for the travel-cms HTTP API.
// ABOUTME: Mounts the generic record handlers once per record kind behind a tracing layer.

use axum::Router;
use axum::routing::get;
use cms_core::{Itinerary, RecordModel, Travelogue, TripPlan};
use tower_http::trace::TraceLayer;

use crate::api::records::{create_record, delete_record, get_record, list_records, update_record};
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(record_routes::<Itinerary>("/itineraries"))
        .merge(record_routes::<Travelogue>("/travelogues"))
        .merge(record_routes::<TripPlan>("/trip-plans"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Collection and item routes for one record kind. The collection is
/// reachable with and without a trailing slash.
fn record_routes<M: RecordModel>(prefix: &str) -> Router<SharedState> {
    Router::new()
        .route(prefix, get(list_records::<M>).post(create_record::<M>))
        .route(
            &format!("{prefix}/"),
            get(list_records::<M>).post(create_record::<M>),
        )
        .route(
            &format!("{prefix}/{{id}}"),
            get(get_record::<M>)
                .put(update_record::<M>)
                .delete(delete_record::<M>),
        )
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
