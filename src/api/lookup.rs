use axum::{Json, Router, extract::State, routing::post};

use crate::{Error, lookup::GeoLookup, state::TrackerState};

use super::Tracker;

pub fn routes<L>() -> Router<Tracker<L>>
where
    L: GeoLookup + 'static,
{
    Router::new().route("/", post(lookup::<L>))
}

async fn lookup<L: GeoLookup>(
    State(tracker): State<Tracker<L>>,
) -> Result<Json<TrackerState>, Error> {
    tracker.submit_current().await?;
    Ok(Json(tracker.store().snapshot()))
}
