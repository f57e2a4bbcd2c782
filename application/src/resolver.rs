//! Entity resolution: free text in, exactly one outcome out.
//!
//! The algorithm is the same for every domain. If the text already has the
//! domain's identifier shape, skip matching and verify existence and
//! ownership directly. Otherwise run a case-insensitive substring search
//! over the domain's human key, scoped to the user, and collapse the result
//! count into resolved / clarify / not-found. `Resolved` is only ever
//! produced for exactly one candidate.

use std::sync::Arc;

use bursar_domain::core::{EntityDomain, Identifier, UserId};
use bursar_domain::finance::UserRef;
use bursar_domain::resolution::{
    CandidateOption, MAX_CLARIFY_OPTIONS, ResolutionOutcome, ResolvableRow,
};
use thiserror::Error;
use tracing::debug;

use crate::ports::directory::UserDirectory;
use crate::ports::stores::{DomainStore, StoreError};

/// Resolution failure that is not an outcome: bad input or a broken store.
/// `NotFound` and `Clarify` are values, never errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("identifier text is empty")]
    EmptyIdentifier,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Like [`ResolutionOutcome`] but carrying the matched row, so callers that
/// need the row (summaries, follow-up mutations) avoid a second lookup.
#[derive(Debug, Clone)]
pub enum RowResolution<R> {
    Matched(R),
    Clarify(Vec<CandidateOption>),
    NotFound { reason: String },
}

/// One resolver per domain store, sharing a single algorithm.
pub struct EntityResolver<S: ?Sized> {
    store: Arc<S>,
    clarify_cap: usize,
}

impl<S: DomainStore + ?Sized> EntityResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            clarify_cap: MAX_CLARIFY_OPTIONS,
        }
    }

    /// Override how many clarification candidates are surfaced. Values are
    /// clamped to `2..=MAX_CLARIFY_OPTIONS`: one option is no clarification,
    /// and the protocol cap is a hard ceiling.
    pub fn with_clarify_cap(mut self, cap: usize) -> Self {
        self.clarify_cap = cap.clamp(2, MAX_CLARIFY_OPTIONS);
        self
    }

    pub fn domain(&self) -> EntityDomain {
        self.store.domain()
    }

    /// Resolve to the full row.
    pub async fn resolve_row(
        &self,
        user: &UserId,
        raw: &str,
    ) -> Result<RowResolution<S::Row>, ResolveError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ResolveError::EmptyIdentifier);
        }
        let domain = self.store.domain();

        // Fast path: the text is already an identifier. Verify it instead of
        // matching; a stale or foreign id must come back not-found.
        if let Some(id) = Identifier::parse_for(domain, raw) {
            return match self.store.find_by_id(user, &id).await? {
                Some(row) => Ok(RowResolution::Matched(row)),
                None => Ok(RowResolution::NotFound {
                    reason: no_match_reason(domain, raw),
                }),
            };
        }

        let mut rows = self.store.find_by_fuzzy_key(user, raw).await?;
        match rows.len() {
            0 => Ok(RowResolution::NotFound {
                reason: no_match_reason(domain, raw),
            }),
            1 => {
                let row = rows.remove(0);
                debug!(%domain, id = %row.id(), text = raw, "resolved uniquely");
                Ok(RowResolution::Matched(row))
            }
            n => {
                debug!(%domain, candidates = n, text = raw, "ambiguous; asking for clarification");
                let options = rows
                    .iter()
                    .take(self.clarify_cap)
                    .map(CandidateOption::for_row)
                    .collect();
                Ok(RowResolution::Clarify(options))
            }
        }
    }

    /// Resolve to the protocol outcome (id only).
    pub async fn resolve(
        &self,
        user: &UserId,
        raw: &str,
    ) -> Result<ResolutionOutcome, ResolveError> {
        Ok(match self.resolve_row(user, raw).await? {
            RowResolution::Matched(row) => ResolutionOutcome::Resolved {
                id: row.id().clone(),
            },
            RowResolution::Clarify(options) => ResolutionOutcome::clarify(options),
            RowResolution::NotFound { reason } => ResolutionOutcome::NotFound { reason },
        })
    }
}

fn no_match_reason(domain: EntityDomain, raw: &str) -> String {
    format!("No {} found matching \"{raw}\"", domain.noun())
}

/// Result of resolving a counterparty reference.
#[derive(Debug, Clone)]
pub enum UserResolution {
    Matched(UserRef),
    Clarify(Vec<CandidateOption>),
    NotFound { reason: String },
}

/// Counterparty lookup. Unlike [`EntityResolver`] this crosses into other
/// users' namespaces, so it matches exactly (email or display name), never
/// by substring.
pub struct UserResolver<D: ?Sized> {
    directory: Arc<D>,
}

impl<D: UserDirectory + ?Sized> UserResolver<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    pub async fn resolve(&self, raw: &str) -> Result<UserResolution, ResolveError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ResolveError::EmptyIdentifier);
        }

        if UserId::matches_format(raw) {
            let id = UserId::new(raw);
            return match self.directory.find_by_id(&id).await? {
                Some(user) => Ok(UserResolution::Matched(user)),
                None => Ok(UserResolution::NotFound {
                    reason: user_not_found(raw),
                }),
            };
        }

        let mut users = self.directory.find_exact(raw).await?;
        match users.len() {
            0 => Ok(UserResolution::NotFound {
                reason: user_not_found(raw),
            }),
            1 => Ok(UserResolution::Matched(users.remove(0))),
            _ => Ok(UserResolution::Clarify(
                users
                    .iter()
                    .take(MAX_CLARIFY_OPTIONS)
                    .map(|u| CandidateOption::new(u.id.as_str(), u.label()))
                    .collect(),
            )),
        }
    }
}

fn user_not_found(raw: &str) -> String {
    format!("No user found matching \"{raw}\" (try their exact email)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bursar_domain::finance::{Account, AccountKind};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn owner() -> UserId {
        UserId::new("usr_aaaa1111")
    }

    fn account(id: &str, user: &UserId, name: &str) -> Account {
        Account {
            id: Identifier::new(id),
            user_id: user.clone(),
            name: name.to_string(),
            kind: AccountKind::Checking,
            balance: 0.0,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    struct FakeAccounts {
        rows: Vec<Account>,
        fuzzy_calls: AtomicUsize,
    }

    impl FakeAccounts {
        fn with(rows: Vec<Account>) -> Arc<Self> {
            Arc::new(Self {
                rows,
                fuzzy_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DomainStore for FakeAccounts {
        type Row = Account;

        fn domain(&self) -> EntityDomain {
            EntityDomain::Account
        }

        async fn find_by_fuzzy_key(
            &self,
            user: &UserId,
            text: &str,
        ) -> Result<Vec<Account>, StoreError> {
            self.fuzzy_calls.fetch_add(1, Ordering::SeqCst);
            let needle = text.to_lowercase();
            Ok(self
                .rows
                .iter()
                .filter(|r| r.user_id == *user && r.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }

        async fn find_by_id(
            &self,
            user: &UserId,
            id: &Identifier,
        ) -> Result<Option<Account>, StoreError> {
            Ok(self
                .rows
                .iter()
                .find(|r| r.id == *id && r.user_id == *user)
                .cloned())
        }
    }

    #[tokio::test]
    async fn substring_match_is_case_insensitive() {
        let store = FakeAccounts::with(vec![account("acc_00000001", &owner(), "Groceries Card")]);
        let resolver = EntityResolver::new(store);
        let outcome = resolver.resolve(&owner(), "grocer").await.unwrap();
        assert_eq!(
            outcome,
            ResolutionOutcome::Resolved {
                id: Identifier::new("acc_00000001")
            }
        );
    }

    #[tokio::test]
    async fn identifier_shape_skips_fuzzy_matching() {
        let store = FakeAccounts::with(vec![account("acc_00000001", &owner(), "Main Checking")]);
        let resolver = EntityResolver::new(store.clone());
        let outcome = resolver.resolve(&owner(), "acc_00000001").await.unwrap();
        assert!(outcome.is_resolved());
        assert_eq!(store.fuzzy_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_identifier_is_not_found_not_matched_as_text() {
        let store = FakeAccounts::with(vec![account("acc_00000001", &owner(), "Main Checking")]);
        let resolver = EntityResolver::new(store.clone());
        let outcome = resolver.resolve(&owner(), "acc_deadbeef").await.unwrap();
        assert!(matches!(outcome, ResolutionOutcome::NotFound { .. }));
        assert_eq!(store.fuzzy_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn other_users_rows_are_invisible() {
        let stranger = UserId::new("usr_bbbb2222");
        let store = FakeAccounts::with(vec![account("acc_00000001", &stranger, "Main Checking")]);
        let resolver = EntityResolver::new(store);

        let by_name = resolver.resolve(&owner(), "checking").await.unwrap();
        assert!(matches!(by_name, ResolutionOutcome::NotFound { .. }));

        let by_id = resolver.resolve(&owner(), "acc_00000001").await.unwrap();
        assert!(matches!(by_id, ResolutionOutcome::NotFound { .. }));
    }

    #[tokio::test]
    async fn not_found_reason_names_domain_and_text() {
        let store = FakeAccounts::with(vec![]);
        let resolver = EntityResolver::new(store);
        let ResolutionOutcome::NotFound { reason } =
            resolver.resolve(&owner(), "brokerage").await.unwrap()
        else {
            panic!("expected not found");
        };
        assert!(reason.contains("account"));
        assert!(reason.contains("brokerage"));
    }

    #[tokio::test]
    async fn several_matches_ask_for_clarification() {
        let store = FakeAccounts::with(vec![
            account("acc_00000001", &owner(), "Main Checking"),
            account("acc_00000002", &owner(), "Joint Checking"),
        ]);
        let resolver = EntityResolver::new(store);
        let ResolutionOutcome::Clarify { options } =
            resolver.resolve(&owner(), "checking").await.unwrap()
        else {
            panic!("expected clarify");
        };
        assert_eq!(options.len(), 2);
        assert!(options.iter().all(|o| !o.label.is_empty()));
    }

    #[tokio::test]
    async fn clarification_respects_the_cap() {
        let rows = (0..9)
            .map(|i| account(&format!("acc_0000000{i}"), &owner(), &format!("Savings {i}")))
            .collect();
        let resolver = EntityResolver::new(FakeAccounts::with(rows)).with_clarify_cap(3);
        let ResolutionOutcome::Clarify { options } =
            resolver.resolve(&owner(), "savings").await.unwrap()
        else {
            panic!("expected clarify");
        };
        assert_eq!(options.len(), 3);
    }

    #[tokio::test]
    async fn empty_text_is_an_error_not_an_outcome() {
        let resolver = EntityResolver::new(FakeAccounts::with(vec![]));
        let err = resolver.resolve(&owner(), "   ").await.unwrap_err();
        assert!(matches!(err, ResolveError::EmptyIdentifier));
    }

    #[tokio::test]
    async fn any_nonempty_text_yields_an_outcome() {
        let store = FakeAccounts::with(vec![account("acc_00000001", &owner(), "Main Checking")]);
        let resolver = EntityResolver::new(store);
        for text in ["💸💸", "'; drop table accounts;--", "acc_zzzz", "ACC_00000001"] {
            assert!(resolver.resolve(&owner(), text).await.is_ok(), "input {text:?}");
        }
    }

    #[tokio::test]
    async fn resolved_means_the_store_agrees_it_is_unique() {
        let store = FakeAccounts::with(vec![
            account("acc_00000001", &owner(), "Main Checking"),
            account("acc_00000002", &owner(), "Rainy Day Savings"),
        ]);
        let resolver = EntityResolver::new(store.clone());
        let ResolutionOutcome::Resolved { id } = resolver.resolve(&owner(), "rainy").await.unwrap()
        else {
            panic!("expected resolved");
        };
        let direct = store.find_by_fuzzy_key(&owner(), "rainy").await.unwrap();
        assert_eq!(direct.len(), 1);
        assert_eq!(*direct[0].id(), id);
    }

    mod users {
        use super::*;

        struct FakeDirectory {
            users: Vec<UserRef>,
        }

        #[async_trait]
        impl UserDirectory for FakeDirectory {
            async fn find_exact(&self, text: &str) -> Result<Vec<UserRef>, StoreError> {
                Ok(self
                    .users
                    .iter()
                    .filter(|u| {
                        u.email.eq_ignore_ascii_case(text) || u.name.eq_ignore_ascii_case(text)
                    })
                    .cloned()
                    .collect())
            }

            async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRef>, StoreError> {
                Ok(self.users.iter().find(|u| u.id == *id).cloned())
            }
        }

        fn directory() -> Arc<FakeDirectory> {
            Arc::new(FakeDirectory {
                users: vec![
                    UserRef {
                        id: UserId::new("usr_bbbb2222"),
                        name: "Jordan Reyes".to_string(),
                        email: "jordan@example.com".to_string(),
                    },
                    UserRef {
                        id: UserId::new("usr_cccc3333"),
                        name: "Jordan Blake".to_string(),
                        email: "jblake@example.com".to_string(),
                    },
                ],
            })
        }

        #[tokio::test]
        async fn exact_email_matches() {
            let resolver = UserResolver::new(directory());
            let UserResolution::Matched(user) =
                resolver.resolve("JORDAN@example.com").await.unwrap()
            else {
                panic!("expected match");
            };
            assert_eq!(user.name, "Jordan Reyes");
        }

        #[tokio::test]
        async fn partial_names_never_match() {
            let resolver = UserResolver::new(directory());
            let outcome = resolver.resolve("Jordan").await.unwrap();
            assert!(matches!(outcome, UserResolution::NotFound { .. }));
        }

        #[tokio::test]
        async fn shared_full_name_would_clarify() {
            let mut users = (*directory()).users.clone();
            users[1].name = "Jordan Reyes".to_string();
            let resolver = UserResolver::new(Arc::new(FakeDirectory { users }));
            let UserResolution::Clarify(options) =
                resolver.resolve("Jordan Reyes").await.unwrap()
            else {
                panic!("expected clarify");
            };
            assert_eq!(options.len(), 2);
            assert!(options[0].label.contains('@'), "labels disambiguate by email");
        }

        #[tokio::test]
        async fn user_id_shape_resolves_directly() {
            let resolver = UserResolver::new(directory());
            let UserResolution::Matched(user) = resolver.resolve("usr_cccc3333").await.unwrap()
            else {
                panic!("expected match");
            };
            assert_eq!(user.email, "jblake@example.com");
        }
    }
}
