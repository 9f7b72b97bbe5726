use std::{
    env::{self},
    fs::OpenOptions,
    net::SocketAddr,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AppState, DEFAULT_CATEGORIZER_MODEL, HttpCategorizer, HttpIdentityProvider, build_router,
    graceful_shutdown, logging_middleware,
};

/// The REST API server for expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Base URL of the identity provider's API, e.g. "https://api.example.com".
    #[arg(long)]
    identity_url: String,

    /// Base URL of an OpenAI-compatible API used to suggest categories.
    #[arg(long, default_value = "https://api.openai.com/v1")]
    categorizer_url: String,

    /// The chat model used to suggest categories.
    #[arg(long, default_value = DEFAULT_CATEGORIZER_MODEL)]
    categorizer_model: String,

    /// The minimum number of minutes a resolved identity is cached for.
    #[arg(long, default_value_t = 5)]
    cookie_minutes: i64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");
    let identity_secret_key = env::var("IDENTITY_SECRET_KEY").ok();
    let categorizer_api_key = env::var("CATEGORIZER_API_KEY").ok();

    let identity_provider = HttpIdentityProvider::new(&args.identity_url, identity_secret_key)
        .expect("Could not create identity provider client");
    let categorizer = HttpCategorizer::new(
        &args.categorizer_url,
        categorizer_api_key,
        &args.categorizer_model,
    )
    .expect("Could not create categorizer client");

    let conn = Connection::open(&args.db_path).expect("Could not open database");
    let app_state = AppState::new(
        conn,
        &secret,
        Duration::minutes(args.cookie_minutes),
        Arc::new(identity_provider),
        Arc::new(categorizer),
    )
    .expect("Could not initialize database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped with an error: {error}");
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
