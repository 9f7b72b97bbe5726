//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error, category::Categorizer, db::initialize, identity::IdentityProvider,
    invalidation::ViewInvalidation,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The minimum time a cached identity stays valid after a request.
    pub cookie_duration: Duration,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Where identities come from when the identity cookie cannot answer.
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// The service that suggests a category for an expense description.
    pub categorizer: Arc<dyn Categorizer>,

    /// Announces which views are stale after a write.
    pub view_invalidation: ViewInvalidation,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        cookie_duration: Duration,
        identity_provider: Arc<dyn IdentityProvider>,
        categorizer: Arc<dyn Categorizer>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration,
            db_connection: connection,
            identity_provider,
            categorizer,
            view_invalidation: ViewInvalidation::default(),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
