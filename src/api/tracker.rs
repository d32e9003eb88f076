use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::{
    lookup::GeoLookup,
    state::{MapView, TrackerState},
};

use super::Tracker;

pub fn routes<L>() -> Router<Tracker<L>>
where
    L: GeoLookup + 'static,
{
    Router::new()
        .route("/state", get(get_state::<L>))
        .route("/search", put(set_search::<L>))
        .route("/details/toggle", post(toggle_details::<L>))
        .route("/map", get(get_map::<L>))
}

#[derive(Deserialize)]
struct SearchInput {
    value: String,
}

async fn get_state<L: GeoLookup>(State(tracker): State<Tracker<L>>) -> Json<TrackerState> {
    Json(tracker.store().snapshot())
}

async fn set_search<L: GeoLookup>(
    State(tracker): State<Tracker<L>>,
    Json(input): Json<SearchInput>,
) -> Json<TrackerState> {
    tracker.store().set_search_input(input.value);
    Json(tracker.store().snapshot())
}

async fn toggle_details<L: GeoLookup>(State(tracker): State<Tracker<L>>) -> Json<TrackerState> {
    tracker.store().toggle_details();
    Json(tracker.store().snapshot())
}

async fn get_map<L: GeoLookup>(State(tracker): State<Tracker<L>>) -> Json<MapView> {
    Json(tracker.store().snapshot().map_view())
}
