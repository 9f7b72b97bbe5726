#![allow(missing_docs)]

pub(crate) mod stubs;

use std::sync::Arc;

use axum::Router;
use rusqlite::Connection;

use crate::{
    AppState, DEFAULT_COOKIE_DURATION, category::Categorizer, db::initialize,
    identity::IdentityProvider,
};

pub(crate) use stubs::{StubCategorizer, StubIdentityProvider};

pub(crate) const TEST_SECRET: &str = "nafstenoas";

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize(&conn).expect("Could not initialize database");
    conn
}

pub(crate) fn get_test_state(
    identity_provider: Arc<dyn IdentityProvider>,
    categorizer: Arc<dyn Categorizer>,
) -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("Could not create in-memory SQLite database"),
        TEST_SECRET,
        DEFAULT_COOKIE_DURATION,
        identity_provider,
        categorizer,
    )
    .expect("Could not create app state")
}

/// Serve `router` on a random local port and return its base URL, e.g. "http://127.0.0.1:4242".
pub(crate) async fn serve_locally(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind test listener");
    let address = listener
        .local_addr()
        .expect("Could not get test listener address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server stopped unexpectedly");
    });

    format!("http://{address}")
}
