use crate::domain::RecordId;
use crate::error::DataResult;
use crate::models::{Category, Lead, LeadList, MessagingAccount, SmsLog};
use async_trait::async_trait;

/// Repository for saved leads.
///
/// Every read and write is scoped to the owning user; a record owned by
/// someone else behaves as if it did not exist.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Store a new lead.
    async fn create(&self, lead: &Lead) -> DataResult<Lead>;

    /// Retrieve a single lead by ID.
    async fn get(&self, user_id: &str, id: &RecordId) -> DataResult<Lead>;

    /// All leads of a user, newest first.
    async fn list(&self, user_id: &str) -> DataResult<Vec<Lead>>;

    /// Replace an existing lead.
    async fn update(&self, lead: &Lead) -> DataResult<Lead>;

    /// Delete a lead.
    async fn delete(&self, user_id: &str, id: &RecordId) -> DataResult<()>;

    /// Replace the categories a lead belongs to.
    async fn assign_categories(
        &self,
        user_id: &str,
        id: &RecordId,
        category_ids: &[RecordId],
    ) -> DataResult<Lead>;
}

/// Repository for lead categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &Category) -> DataResult<Category>;

    async fn get(&self, user_id: &str, id: &RecordId) -> DataResult<Category>;

    /// All categories of a user, newest first.
    async fn list(&self, user_id: &str) -> DataResult<Vec<Category>>;

    async fn update(&self, category: &Category) -> DataResult<Category>;

    async fn delete(&self, user_id: &str, id: &RecordId) -> DataResult<()>;
}

/// Repository for lead lists.
#[async_trait]
pub trait ListRepository: Send + Sync {
    async fn create(&self, list: &LeadList) -> DataResult<LeadList>;

    async fn get(&self, user_id: &str, id: &RecordId) -> DataResult<LeadList>;

    /// All lists of a user, newest first.
    async fn list(&self, user_id: &str) -> DataResult<Vec<LeadList>>;

    async fn update(&self, list: &LeadList) -> DataResult<LeadList>;

    async fn delete(&self, user_id: &str, id: &RecordId) -> DataResult<()>;

    /// Replace the members of a static list.
    async fn set_members(
        &self,
        user_id: &str,
        id: &RecordId,
        members: &[RecordId],
    ) -> DataResult<LeadList>;
}

/// Repository for per-user messaging credentials.
#[async_trait]
pub trait MessagingAccountRepository: Send + Sync {
    /// The user's account, if one is configured.
    async fn get(&self, user_id: &str) -> DataResult<Option<MessagingAccount>>;

    /// Create or replace the user's account.
    async fn upsert(&self, account: &MessagingAccount) -> DataResult<MessagingAccount>;
}

/// Append-only log of messages sent to leads.
#[async_trait]
pub trait SmsLogRepository: Send + Sync {
    async fn append(&self, entry: &SmsLog) -> DataResult<()>;

    /// Entries for a lead, oldest first.
    async fn list_for_lead(&self, lead_id: &RecordId) -> DataResult<Vec<SmsLog>>;
}
