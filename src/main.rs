#[macro_use]
extern crate tracing;

use std::sync::Arc;

use axum::Router;
use axum_extra::middleware::option_layer;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

mod api;
mod config;
mod controller;
mod error;
mod ip;
mod lookup;
mod middleware;
mod state;
mod trace;

pub use config::CONFIG;
pub use error::Error;

use controller::LookupController;
use lookup::HttpGeoLookup;
use state::Store;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    launch_info();
    dotenv().ok();
    trace::init(&CONFIG.log);

    let client = match HttpGeoLookup::from_config(&CONFIG.lookup) {
        Ok(client) => client,
        Err(err) => {
            error!("failed to build lookup client: {}", err);
            return;
        }
    };
    let store = Store::default();
    spawn_position_log(&store);
    let controller = Arc::new(LookupController::new(store, client));

    let cors = if CONFIG.debug {
        Some(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods(Any)
                .allow_origin(Any),
        )
    } else {
        None
    };
    let cors = option_layer(cors);
    let layer = ServiceBuilder::new()
        .layer(middleware::TraceLayer)
        .layer(cors);
    let app = Router::new()
        .nest("/api", api::routes(controller))
        .fallback_service(ServeDir::new(&CONFIG.web_dir))
        .layer(layer);

    let listener = match TcpListener::bind(CONFIG.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {}", CONFIG.addr, err);
            return;
        }
    };
    if let Ok(local_addr) = listener.local_addr() {
        info!("listening on http://{}", local_addr);
    }
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {}", err);
    }
    info!("IP tracker stopped");
}

/// Follows map re-centring the same way the map widget does.
fn spawn_position_log(store: &Store) {
    let mut rx = store.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let view = rx.borrow_and_update().map_view();
            debug!(
                "map centre {}, {} ({})",
                view.center.latitude(),
                view.center.longitude(),
                view.label
            );
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn launch_info() {
    println!();
    println!(
        "=================== Starting IP Tracker {} ===================",
        env!("CARGO_PKG_VERSION")
    );
    println!();
}
