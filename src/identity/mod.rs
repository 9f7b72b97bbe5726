//! Identifying the caller of a request.
//!
//! Identities come from an external identity provider. A resolved identity is cached in an
//! encrypted cookie so that most requests never have to ask the provider.

mod cookie;
mod http_provider;
mod log_out;
mod middleware;
mod provider;
mod token;
mod user_id;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub use http_provider::HttpIdentityProvider;
pub use log_out::get_log_out;
pub use middleware::{CurrentUser, identity_layer};
pub use provider::{Credentials, IdentityProvider, resolve_identity};
pub use token::Token;
pub use user_id::UserId;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
