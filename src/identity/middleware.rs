//! Identity middleware that lets handlers resolve the caller and caches the result in the
//! identity cookie.

use std::{convert::Infallible, fmt, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::Duration;
use tokio::sync::OnceCell;

use crate::{
    AppState,
    identity::{
        Credentials, IdentityProvider, UserId, cookie::extend_identity_cookie, resolve_identity,
    },
};

/// The state needed for the identity middleware.
#[derive(Clone)]
pub struct IdentityState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The minimum time an identity cookie stays valid after a request.
    pub cookie_duration: Duration,
    /// Where identities come from.
    pub identity_provider: Arc<dyn IdentityProvider>,
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            identity_provider: state.identity_provider.clone(),
        }
    }
}

/// The caller of the current request, resolved on first use.
///
/// Handlers behind [identity_layer] take this as an argument and call [CurrentUser::resolve]
/// once they need to know who is calling. Until then the identity provider is not asked.
/// Without the middleware the caller is always unidentified.
#[derive(Clone)]
pub struct CurrentUser {
    lookup: Option<(Arc<dyn IdentityProvider>, Arc<Credentials>)>,
    resolved: Arc<OnceCell<Option<UserId>>>,
}

impl CurrentUser {
    /// A caller whose identity is already known, `None` for an unidentified caller.
    pub fn known(user_id: Option<UserId>) -> Self {
        Self {
            lookup: None,
            resolved: Arc::new(OnceCell::new_with(Some(user_id))),
        }
    }

    fn deferred(identity_provider: Arc<dyn IdentityProvider>, credentials: Credentials) -> Self {
        Self {
            lookup: Some((identity_provider, Arc::new(credentials))),
            resolved: Arc::new(OnceCell::new()),
        }
    }

    /// Resolve the caller's identity, asking the identity provider at most once per request.
    pub async fn resolve(&self) -> Option<UserId> {
        self.resolved
            .get_or_init(|| async {
                match &self.lookup {
                    Some((provider, credentials)) => {
                        resolve_identity(provider.as_ref(), credentials).await
                    }
                    None => None,
                }
            })
            .await
            .clone()
    }

    /// The identity found by an earlier call to [CurrentUser::resolve], if any.
    fn resolved_user(&self) -> Option<&UserId> {
        self.resolved.get().and_then(Option::as_ref)
    }
}

impl Default for CurrentUser {
    fn default() -> Self {
        Self::known(None)
    }
}

impl fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentUser")
            .field("resolved", &self.resolved.get())
            .finish_non_exhaustive()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Middleware function that lets handlers identify the caller.
///
/// The request's credentials are placed into the request as a [CurrentUser] and the request
/// executed normally. Handlers decide whether and when to resolve the identity and how to reply
/// to unidentified callers.
///
/// When a handler resolved an identity, the identity cookie on the response is set or extended
/// so the next request can take the fast path.
pub async fn identity_layer(
    State(state): State<IdentityState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
    let credentials = Credentials::from_request(&jar, &parts.headers);

    let current_user = CurrentUser::deferred(state.identity_provider.clone(), credentials);
    parts.extensions.insert(current_user.clone());
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let Some(user_id) = current_user.resolved_user().cloned() else {
        return response;
    };

    let jar = match extend_identity_cookie(jar, user_id, state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending identity cookie: {error}. Leaving cookie as is.");
            return response;
        }
    };

    let (mut parts, body) = response.into_parts();
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}
