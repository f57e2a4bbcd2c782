//! Confirmation gate for protected mutations.
//!
//! Any mutation of an existing row runs in two phases, each a separate tool
//! invocation:
//!
//! 1. **identify**: resolve the free text, render the matched row's
//!    summary, and hand back a [`PendingAction`] whose id is the
//!    confirmation token. Read-only and idempotent.
//! 2. **execute**: given that id back, re-validate it against the store
//!    (existence and ownership only, never fuzzy matching again) and run the
//!    mutation.
//!
//! Nothing is persisted between the phases; the id is the entire state. A
//! row deleted or reassigned between turns makes execute fail closed.
//!
//! Authorization failures surface as not-found: an agent probing with ids
//! can never learn that a row exists in someone else's ledger.

use std::future::Future;
use std::sync::Arc;

use bursar_domain::core::{EntityDomain, Identifier, UserId};
use bursar_domain::resolution::{CandidateOption, PendingAction, ResolvableRow};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ports::stores::{DomainStore, StoreError};
use crate::resolver::{EntityResolver, ResolveError, RowResolution};

/// Failure of an identify or execute call.
#[derive(Debug, Error)]
pub enum GateError {
    /// Also covers rows that exist but are not the caller's to touch.
    #[error("{0} not found; it may have already been removed")]
    NotFound(EntityDomain),
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
    #[error("{0}")]
    Conflict(String),
    /// Infrastructure failure; detail is for logs only.
    #[error("store unavailable: {0}")]
    Store(String),
}

impl GateError {
    /// Map a store failure into the gate's vocabulary. This is the one
    /// place `Forbidden` collapses into `NotFound`; the true cause is
    /// logged, not surfaced.
    fn classify(domain: EntityDomain, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => GateError::NotFound(domain),
            StoreError::Forbidden(_) => {
                warn!(%domain, "authorization refused; reporting not found");
                GateError::NotFound(domain)
            }
            StoreError::Validation { field, message } => GateError::Validation { field, message },
            StoreError::Conflict(message) => GateError::Conflict(message),
            StoreError::Unavailable(detail) => GateError::Store(detail),
        }
    }
}

/// Outcome of the identify phase.
#[derive(Debug, Clone)]
pub enum Identification {
    /// Exactly one target; confirm by echoing its id.
    Pending(PendingAction),
    Clarify(Vec<CandidateOption>),
    NotFound { reason: String },
}

/// One gate per domain store.
pub struct ActionGate<S: ?Sized> {
    store: Arc<S>,
    resolver: EntityResolver<S>,
}

impl<S: DomainStore + ?Sized> ActionGate<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            resolver: EntityResolver::new(store.clone()),
            store,
        }
    }

    pub fn with_clarify_cap(mut self, cap: usize) -> Self {
        self.resolver = self.resolver.with_clarify_cap(cap);
        self
    }

    pub fn domain(&self) -> EntityDomain {
        self.store.domain()
    }

    /// Phase one: resolve the target and describe it. Performs no mutation.
    pub async fn identify(&self, user: &UserId, raw: &str) -> Result<Identification, GateError> {
        let domain = self.store.domain();
        match self.resolver.resolve_row(user, raw).await {
            Ok(RowResolution::Matched(row)) => {
                debug!(%domain, id = %row.id(), "identified; awaiting confirmation");
                Ok(Identification::Pending(PendingAction::new(
                    row.id().clone(),
                    domain,
                    row.summary(),
                )))
            }
            Ok(RowResolution::Clarify(options)) => Ok(Identification::Clarify(options)),
            Ok(RowResolution::NotFound { reason }) => Ok(Identification::NotFound { reason }),
            Err(ResolveError::EmptyIdentifier) => Err(GateError::Validation {
                field: "identifier".to_string(),
                message: "must not be empty".to_string(),
            }),
            Err(ResolveError::Store(err)) => Err(GateError::classify(domain, err)),
        }
    }

    /// Phase two: re-validate the confirmed id and run `mutate` on the
    /// still-current row. Only current validity matters; where the id came
    /// from is irrelevant.
    pub async fn execute<T, F, Fut>(
        &self,
        user: &UserId,
        confirmed: &str,
        mutate: F,
    ) -> Result<T, GateError>
    where
        F: FnOnce(S::Row) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let domain = self.store.domain();
        let Some(id) = Identifier::parse_for(domain, confirmed.trim()) else {
            return Err(GateError::Validation {
                field: "confirmed_id".to_string(),
                message: format!("not a {} id", domain.noun()),
            });
        };

        let row = self
            .store
            .find_by_id(user, &id)
            .await
            .map_err(|err| GateError::classify(domain, err))?
            .ok_or(GateError::NotFound(domain))?;

        info!(%domain, %id, "confirmed mutation authorized");
        mutate(row)
            .await
            .map_err(|err| GateError::classify(domain, err))
    }
}
