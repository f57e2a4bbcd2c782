//! User directory port, for counterparty lookup when recording a debt.
//!
//! This is the one resolution path that crosses into other users'
//! namespaces, so it deliberately refuses substring matching: only an exact
//! email or exact display name (case-insensitive) returns anything.

use async_trait::async_trait;
use bursar_domain::core::UserId;
use bursar_domain::finance::UserRef;

use super::stores::StoreError;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users whose email or display name equals `text` exactly
    /// (case-insensitive). Two users may share a name, so this can return
    /// more than one row.
    async fn find_exact(&self, text: &str) -> Result<Vec<UserRef>, StoreError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRef>, StoreError>;
}
