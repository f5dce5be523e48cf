use axum::http::{self, HeaderValue, Method};
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use server::{app, services::deadline, state::AppState, utils::config::CONFIG};

fn init_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .filter_module("werewolf_core", LevelFilter::Debug)
        .filter_module("server", LevelFilter::Debug)
        .filter_module("tower_http", LevelFilter::Debug)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = dotenv() {
        eprintln!("Warning: could not load .env: {}", e);
    }

    init_logger();

    let origins: Vec<HeaderValue> = CONFIG
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("ignoring invalid CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE]);

    let state = AppState::with_config(CONFIG.clone());
    let _ticker = deadline::spawn_deadline_ticker(state.clone());

    let app = app::create_app_with_state(state).layer(cors).layer(
        TraceLayer::new_for_http().make_span_with(|request: &http::Request<_>| {
            tracing::info_span!(
                "HTTP request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }),
    );

    let addr = SocketAddr::from((CONFIG.host, CONFIG.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("server listening on http://{}", addr);
    axum::serve(listener, app).await
}
