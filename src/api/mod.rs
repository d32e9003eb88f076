use std::sync::Arc;

use axum::Router;

use crate::{Error, controller::LookupController, lookup::GeoLookup};

mod lookup;
mod tracker;

pub type Tracker<L> = Arc<LookupController<L>>;

pub fn routes<L>(controller: Tracker<L>) -> Router
where
    L: GeoLookup + 'static,
{
    Router::new()
        .merge(tracker::routes())
        .nest("/lookup", lookup::routes())
        .fallback(|| async { Error::not_found("no such endpoint") })
        .with_state(controller)
}
