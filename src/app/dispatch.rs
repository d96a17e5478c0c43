//! Background request dispatch.
//!
//! Requests run as tasks on the tokio runtime owned by the binary. Every task
//! sends exactly one [`Outcome`] back over a std channel, which the UI loop
//! drains on each tick. There is no cancellation; late results still land.
use std::future::Future;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use tokio::runtime::Handle;

use crate::api::ApiClient;
use crate::api::auth::{AuthService, ForgotPasswordRequest, LoginOutcome, LoginRequest, RegisterRequest};
use crate::error::ApiError;
use crate::query::Payload;
use crate::resources::{RecordId, Resource, ResourceService, User};
use crate::routes::AdminPage;

/// Cache key of the signed-in user's own record.
pub const PROFILE_KEY: &str = "profile";

/// One write against a resource collection.
pub enum Mutation<R: Resource> {
    Create(R::Draft),
    /// `cleared` names optional fields the user emptied; they go out as `null`.
    Update {
        id: RecordId,
        draft: R::Draft,
        cleared: Vec<String>,
    },
    Delete(RecordId),
    Transition {
        id: RecordId,
        action: &'static str,
        label: &'static str,
    },
}

impl<R: Resource> Mutation<R> {
    fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create(_) => MutationKind::Created,
            Mutation::Update { .. } => MutationKind::Updated,
            Mutation::Delete(_) => MutationKind::Deleted,
            Mutation::Transition { label, .. } => MutationKind::Transitioned(*label),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Created,
    Updated,
    Deleted,
    Transitioned(&'static str),
}

impl MutationKind {
    pub fn success_message(&self, label: &str) -> String {
        match self {
            MutationKind::Created => format!("{label} created successfully"),
            MutationKind::Updated => format!("{label} updated successfully"),
            MutationKind::Deleted => format!("{label} deleted successfully"),
            MutationKind::Transitioned(action) => format!("{label}: {action} completed"),
        }
    }
}

/// Completion of one background request.
#[derive(Debug)]
pub enum Outcome {
    Loaded {
        key: &'static str,
        /// Cache generation the request was started in.
        generation: u64,
        result: Result<Payload, ApiError>,
    },
    Mutated {
        page: AdminPage,
        key: &'static str,
        related: &'static [&'static str],
        label: &'static str,
        kind: MutationKind,
        result: Result<(), ApiError>,
    },
    LoggedIn(Result<LoginOutcome, ApiError>),
    Registered(Result<(), ApiError>),
    ResetRequested(Result<(), ApiError>),
}

#[derive(Clone)]
pub struct Dispatcher {
    handle: Handle,
    client: ApiClient,
    tx: Sender<Outcome>,
}

impl Dispatcher {
    pub fn new(handle: Handle, client: ApiClient) -> (Self, Receiver<Outcome>) {
        let (tx, rx) = channel();
        (Self { handle, client, tx }, rx)
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let outcome = fut.await;
            if tx.send(outcome).is_err() {
                tracing::debug!("ui loop gone; dropping outcome");
            }
        });
    }

    pub fn fetch_all<R: Resource>(&self, generation: u64) {
        let svc = ResourceService::<R>::new(self.client.clone());
        self.spawn(async move {
            let result = svc.get_all().await.map(|rows| Arc::new(rows) as Payload);
            Outcome::Loaded {
                key: R::KEY,
                generation,
                result,
            }
        });
    }

    pub fn fetch_profile(&self, id: RecordId, generation: u64) {
        let svc = ResourceService::<User>::new(self.client.clone());
        self.spawn(async move {
            let result = svc.get_by_id(&id).await.map(|user| Arc::new(user) as Payload);
            Outcome::Loaded {
                key: PROFILE_KEY,
                generation,
                result,
            }
        });
    }

    pub fn mutate<R: Resource>(&self, page: AdminPage, mutation: Mutation<R>) {
        let svc = ResourceService::<R>::new(self.client.clone());
        let kind = mutation.kind();
        tracing::info!(resource = R::KEY, ?kind, "mutation dispatched");
        self.spawn(async move {
            let result = match mutation {
                Mutation::Create(draft) => svc.create(&draft).await.map(|_| ()),
                Mutation::Update { id, draft, cleared } => svc.update(&id, &draft, &cleared).await.map(|_| ()),
                Mutation::Delete(id) => svc.delete(&id).await,
                Mutation::Transition { id, action, .. } => svc.transition(&id, action).await.map(|_| ()),
            };
            Outcome::Mutated {
                page,
                key: R::KEY,
                related: R::RELATED,
                label: R::LABEL,
                kind,
                result,
            }
        });
    }

    pub fn login(&self, request: LoginRequest) {
        let auth = AuthService::new(self.client.clone());
        self.spawn(async move { Outcome::LoggedIn(auth.login(&request).await) });
    }

    pub fn register(&self, request: RegisterRequest) {
        let auth = AuthService::new(self.client.clone());
        self.spawn(async move { Outcome::Registered(auth.register(&request).await) });
    }

    pub fn forgot_password(&self, request: ForgotPasswordRequest) {
        let auth = AuthService::new(self.client.clone());
        self.spawn(async move { Outcome::ResetRequested(auth.forgot_password(&request).await) });
    }

    pub fn logout(&self) {
        AuthService::new(self.client.clone()).logout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_messages_name_the_resource() {
        assert_eq!(MutationKind::Created.success_message("Member"), "Member created successfully");
        assert_eq!(
            MutationKind::Transitioned("Approve").success_message("Loan"),
            "Loan: Approve completed"
        );
    }
}
