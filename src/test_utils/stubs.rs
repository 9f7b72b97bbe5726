use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    Error,
    category::Categorizer,
    identity::{Credentials, IdentityProvider, UserId},
};

enum IdentityAnswer {
    User(UserId),
    Nobody,
    Outage,
}

/// An identity provider that gives the same answer to every authoritative check.
pub(crate) struct StubIdentityProvider {
    answer: IdentityAnswer,
    authoritative_calls: AtomicUsize,
}

impl StubIdentityProvider {
    fn new(answer: IdentityAnswer) -> Self {
        Self {
            answer,
            authoritative_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn signed_in(user_id: &str) -> Self {
        Self::new(IdentityAnswer::User(UserId::new_unchecked(user_id)))
    }

    pub(crate) fn signed_out() -> Self {
        Self::new(IdentityAnswer::Nobody)
    }

    pub(crate) fn failing() -> Self {
        Self::new(IdentityAnswer::Outage)
    }

    pub(crate) fn authoritative_calls(&self) -> usize {
        self.authoritative_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn authoritative_identity(
        &self,
        _credentials: &Credentials,
    ) -> Result<Option<UserId>, Error> {
        self.authoritative_calls.fetch_add(1, Ordering::SeqCst);

        match &self.answer {
            IdentityAnswer::User(user_id) => Ok(Some(user_id.clone())),
            IdentityAnswer::Nobody => Ok(None),
            IdentityAnswer::Outage => Err(Error::IdentityProvider("provider is down".to_owned())),
        }
    }
}

/// A categorizer that gives the same answer to every description.
pub(crate) struct StubCategorizer {
    answer: Result<String, String>,
    calls: AtomicUsize,
}

impl StubCategorizer {
    pub(crate) fn answering(category: &str) -> Self {
        Self {
            answer: Ok(category.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A categorizer that fails with `message`, which may be empty.
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Categorizer for StubCategorizer {
    async fn categorize(&self, _description: &str) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        self.answer.clone().map_err(Error::Categorizer)
    }
}
