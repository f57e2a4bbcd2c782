//! Opaque record identifiers and the domains they are scoped to.
//!
//! Identifiers are minted by the backing store as `<prefix><hex>` (for
//! example `acc_9f3c…`) and are never typed by a user. They are echoed to
//! the conversational layer inside clarification and confirmation responses
//! and later handed back verbatim to authorize a mutation. The prefix is
//! what lets a resolver recognize "this free text is already an identifier"
//! without a store round-trip.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One entity type the resolution/confirmation protocol operates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityDomain {
    Account,
    Category,
    Budget,
    Debt,
    Transaction,
    Goal,
}

impl EntityDomain {
    /// Identifier prefix for this domain (`acc_`, `cat_`, ...).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityDomain::Account => "acc_",
            EntityDomain::Category => "cat_",
            EntityDomain::Budget => "bud_",
            EntityDomain::Debt => "debt_",
            EntityDomain::Transaction => "txn_",
            EntityDomain::Goal => "goal_",
        }
    }

    /// Singular noun used in user-facing messages ("no account matching ...").
    pub fn noun(&self) -> &'static str {
        match self {
            EntityDomain::Account => "account",
            EntityDomain::Category => "category",
            EntityDomain::Budget => "budget",
            EntityDomain::Debt => "debt",
            EntityDomain::Transaction => "transaction",
            EntityDomain::Goal => "goal",
        }
    }

    /// Plural form for clarification messages ("multiple categories match").
    pub fn plural(&self) -> &'static str {
        match self {
            EntityDomain::Account => "accounts",
            EntityDomain::Category => "categories",
            EntityDomain::Budget => "budgets",
            EntityDomain::Debt => "debts",
            EntityDomain::Transaction => "transactions",
            EntityDomain::Goal => "goals",
        }
    }
}

impl fmt::Display for EntityDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Opaque key naming exactly one row within one user's data.
///
/// The string form is the whole value: it is compared verbatim, carried
/// through responses unchanged, and owns no other semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Identifier(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recognize `raw` as an identifier belonging to `domain`.
    ///
    /// Accepts the minted shape only: the domain prefix followed by a hex
    /// tail. Anything else is treated as free text and goes through fuzzy
    /// matching instead. A false negative here is harmless (the text simply
    /// fails to match any human key); a false positive would skip matching
    /// entirely, so the check is strict.
    pub fn parse_for(domain: EntityDomain, raw: &str) -> Option<Identifier> {
        let tail = raw.strip_prefix(domain.id_prefix())?;
        if tail.len() >= 4 && tail.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Identifier(raw.to_string()))
        } else {
            None
        }
    }

    /// Which domain this identifier's prefix names, if any.
    pub fn domain(&self) -> Option<EntityDomain> {
        [
            EntityDomain::Account,
            EntityDomain::Category,
            EntityDomain::Budget,
            EntityDomain::Debt,
            EntityDomain::Transaction,
            EntityDomain::Goal,
        ]
        .into_iter()
        .find(|d| self.0.starts_with(d.id_prefix()))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::new(value)
    }
}

/// Key naming one registered user. Lives in its own namespace (`usr_` when
/// minted) because user lookup crosses ownership boundaries that record
/// identifiers never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        UserId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `raw` has the minted user-id shape.
    pub fn matches_format(raw: &str) -> bool {
        raw.strip_prefix("usr_")
            .is_some_and(|tail| tail.len() >= 4 && tail.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId::new(value)
    }
}
