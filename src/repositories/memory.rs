//! In-memory repository implementations.
//!
//! Data lives for the lifetime of the process. Clones share the same storage.

use super::traits::{
    CategoryRepository, LeadRepository, ListRepository, MessagingAccountRepository,
    SmsLogRepository,
};
use crate::domain::RecordId;
use crate::error::{DataError, DataResult};
use crate::models::{Category, Lead, LeadList, MessagingAccount, SmsLog};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A user-owned record keyed by ID.
trait Owned: Clone + Send + Sync {
    const KIND: &'static str;

    fn id(&self) -> &RecordId;

    fn owner(&self) -> &str;
}

impl Owned for Lead {
    const KIND: &'static str = "Lead";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn owner(&self) -> &str {
        &self.user_id
    }
}

impl Owned for Category {
    const KIND: &'static str = "Category";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn owner(&self) -> &str {
        &self.user_id
    }
}

impl Owned for LeadList {
    const KIND: &'static str = "List";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn owner(&self) -> &str {
        &self.user_id
    }
}

/// Rows plus an insertion counter used for newest-first ordering.
struct Table<T> {
    rows: HashMap<RecordId, (u64, T)>,
    next_seq: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            next_seq: 0,
        }
    }
}

/// Shared, lock-guarded table of owned records.
struct Store<T> {
    table: Arc<RwLock<Table<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::default())),
        }
    }
}

impl<T: Owned> Store<T> {
    fn read(&self) -> DataResult<RwLockReadGuard<'_, Table<T>>> {
        self.table
            .read()
            .map_err(|_| DataError::Storage("Lock poisoned".to_string()))
    }

    fn write(&self) -> DataResult<RwLockWriteGuard<'_, Table<T>>> {
        self.table
            .write()
            .map_err(|_| DataError::Storage("Lock poisoned".to_string()))
    }

    fn not_found(id: &RecordId) -> DataError {
        DataError::NotFound(format!("{} {}", T::KIND, id))
    }

    fn insert(&self, record: &T) -> DataResult<T> {
        let mut table = self.write()?;
        if table.rows.contains_key(record.id()) {
            return Err(DataError::InvalidInput(format!(
                "{} {} already exists",
                T::KIND,
                record.id()
            )));
        }
        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(record.id().clone(), (seq, record.clone()));
        Ok(record.clone())
    }

    fn get(&self, user_id: &str, id: &RecordId) -> DataResult<T> {
        self.read()?
            .rows
            .get(id)
            .filter(|(_, record)| record.owner() == user_id)
            .map(|(_, record)| record.clone())
            .ok_or_else(|| Self::not_found(id))
    }

    fn list(&self, user_id: &str) -> DataResult<Vec<T>> {
        let table = self.read()?;
        let mut rows: Vec<&(u64, T)> = table
            .rows
            .values()
            .filter(|(_, record)| record.owner() == user_id)
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(rows.into_iter().map(|(_, record)| record.clone()).collect())
    }

    /// Apply `change` to an owned record in place and return the result.
    fn modify(
        &self,
        user_id: &str,
        id: &RecordId,
        change: impl FnOnce(&mut T),
    ) -> DataResult<T> {
        let mut table = self.write()?;
        let (_, record) = table
            .rows
            .get_mut(id)
            .filter(|(_, record)| record.owner() == user_id)
            .ok_or_else(|| Self::not_found(id))?;
        change(record);
        Ok(record.clone())
    }

    fn replace(&self, record: &T) -> DataResult<T> {
        self.modify(record.owner(), record.id(), |stored| {
            *stored = record.clone();
        })
    }

    fn remove(&self, user_id: &str, id: &RecordId) -> DataResult<()> {
        let mut table = self.write()?;
        let owned = matches!(table.rows.get(id), Some((_, record)) if record.owner() == user_id);
        if !owned {
            return Err(Self::not_found(id));
        }
        table.rows.remove(id);
        Ok(())
    }
}

/// In-memory [`LeadRepository`].
#[derive(Clone, Default)]
pub struct InMemoryLeadRepository {
    store: Store<Lead>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn create(&self, lead: &Lead) -> DataResult<Lead> {
        self.store.insert(lead)
    }

    async fn get(&self, user_id: &str, id: &RecordId) -> DataResult<Lead> {
        self.store.get(user_id, id)
    }

    async fn list(&self, user_id: &str) -> DataResult<Vec<Lead>> {
        self.store.list(user_id)
    }

    async fn update(&self, lead: &Lead) -> DataResult<Lead> {
        self.store.replace(lead)
    }

    async fn delete(&self, user_id: &str, id: &RecordId) -> DataResult<()> {
        self.store.remove(user_id, id)
    }

    async fn assign_categories(
        &self,
        user_id: &str,
        id: &RecordId,
        category_ids: &[RecordId],
    ) -> DataResult<Lead> {
        self.store.modify(user_id, id, |lead| {
            lead.category_ids = category_ids.to_vec();
        })
    }
}

/// In-memory [`CategoryRepository`].
#[derive(Clone, Default)]
pub struct InMemoryCategoryRepository {
    store: Store<Category>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, category: &Category) -> DataResult<Category> {
        self.store.insert(category)
    }

    async fn get(&self, user_id: &str, id: &RecordId) -> DataResult<Category> {
        self.store.get(user_id, id)
    }

    async fn list(&self, user_id: &str) -> DataResult<Vec<Category>> {
        self.store.list(user_id)
    }

    async fn update(&self, category: &Category) -> DataResult<Category> {
        self.store.replace(category)
    }

    async fn delete(&self, user_id: &str, id: &RecordId) -> DataResult<()> {
        self.store.remove(user_id, id)
    }
}

/// In-memory [`ListRepository`].
#[derive(Clone, Default)]
pub struct InMemoryListRepository {
    store: Store<LeadList>,
}

impl InMemoryListRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListRepository for InMemoryListRepository {
    async fn create(&self, list: &LeadList) -> DataResult<LeadList> {
        self.store.insert(list)
    }

    async fn get(&self, user_id: &str, id: &RecordId) -> DataResult<LeadList> {
        self.store.get(user_id, id)
    }

    async fn list(&self, user_id: &str) -> DataResult<Vec<LeadList>> {
        self.store.list(user_id)
    }

    async fn update(&self, list: &LeadList) -> DataResult<LeadList> {
        self.store.replace(list)
    }

    async fn delete(&self, user_id: &str, id: &RecordId) -> DataResult<()> {
        self.store.remove(user_id, id)
    }

    async fn set_members(
        &self,
        user_id: &str,
        id: &RecordId,
        members: &[RecordId],
    ) -> DataResult<LeadList> {
        self.store.modify(user_id, id, |list| {
            list.members = members.to_vec();
        })
    }
}

/// In-memory [`MessagingAccountRepository`].
#[derive(Clone, Default)]
pub struct InMemoryMessagingAccountRepository {
    accounts: Arc<RwLock<HashMap<String, MessagingAccount>>>,
}

impl InMemoryMessagingAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagingAccountRepository for InMemoryMessagingAccountRepository {
    async fn get(&self, user_id: &str) -> DataResult<Option<MessagingAccount>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| DataError::Storage("Lock poisoned".to_string()))?;
        Ok(accounts.get(user_id).cloned())
    }

    async fn upsert(&self, account: &MessagingAccount) -> DataResult<MessagingAccount> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| DataError::Storage("Lock poisoned".to_string()))?;
        accounts.insert(account.user_id.clone(), account.clone());
        Ok(account.clone())
    }
}

/// In-memory [`SmsLogRepository`].
#[derive(Clone, Default)]
pub struct InMemorySmsLogRepository {
    entries: Arc<RwLock<Vec<SmsLog>>>,
}

impl InMemorySmsLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SmsLogRepository for InMemorySmsLogRepository {
    async fn append(&self, entry: &SmsLog) -> DataResult<()> {
        self.entries
            .write()
            .map_err(|_| DataError::Storage("Lock poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }

    async fn list_for_lead(&self, lead_id: &RecordId) -> DataResult<Vec<SmsLog>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DataError::Storage("Lock poisoned".to_string()))?;
        Ok(entries
            .iter()
            .filter(|entry| &entry.lead_id == lead_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, user: &str, name: &str) -> Category {
        Category {
            id: RecordId::new(id).unwrap(),
            user_id: user.to_string(),
            name: name.to_string(),
            color: "#3366ff".to_string(),
            description: String::new(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_user_scoped() {
        let repo = InMemoryCategoryRepository::new();
        repo.create(&category("c1", "u1", "Hot")).await.unwrap();
        repo.create(&category("c2", "u1", "Cold")).await.unwrap();
        repo.create(&category("c3", "u2", "Other")).await.unwrap();

        let names: Vec<String> = repo
            .list("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Cold", "Hot"]);
    }

    #[tokio::test]
    async fn test_foreign_records_are_not_found() {
        let repo = InMemoryCategoryRepository::new();
        let id = RecordId::new("c1").unwrap();
        repo.create(&category("c1", "u1", "Hot")).await.unwrap();

        assert!(matches!(repo.get("u2", &id).await, Err(DataError::NotFound(_))));
        assert!(matches!(repo.delete("u2", &id).await, Err(DataError::NotFound(_))));
        assert!(repo.get("u1", &id).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let repo = InMemoryCategoryRepository::new();
        repo.create(&category("c1", "u1", "Hot")).await.unwrap();
        assert!(matches!(
            repo.create(&category("c1", "u1", "Again")).await,
            Err(DataError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = InMemoryCategoryRepository::new();
        let id = RecordId::new("c1").unwrap();
        repo.create(&category("c1", "u1", "Hot")).await.unwrap();

        let updated = repo.update(&category("c1", "u1", "Warm")).await.unwrap();
        assert_eq!(updated.name, "Warm");
        assert_eq!(repo.get("u1", &id).await.unwrap().name, "Warm");

        repo.delete("u1", &id).await.unwrap();
        assert!(repo.list("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_messaging_account_upsert() {
        let repo = InMemoryMessagingAccountRepository::new();
        assert!(repo.get("u1").await.unwrap().is_none());

        let account = MessagingAccount {
            user_id: "u1".to_string(),
            account_sid: "AC1".to_string(),
            auth_token: "t".to_string(),
            from_number: "+15125550100".to_string(),
        };
        repo.upsert(&account).await.unwrap();
        assert_eq!(repo.get("u1").await.unwrap(), Some(account));
    }

    #[tokio::test]
    async fn test_sms_log_filters_by_lead() {
        let repo = InMemorySmsLogRepository::new();
        let lead = RecordId::new("l1").unwrap();
        for (id, msg) in [("l1", "a"), ("l2", "b"), ("l1", "c")] {
            repo.append(&SmsLog {
                lead_id: RecordId::new(id).unwrap(),
                phone_number: "+15125550100".to_string(),
                message: msg.to_string(),
                message_id: "SM1".to_string(),
                status: "queued".to_string(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
            })
            .await
            .unwrap();
        }

        let messages: Vec<String> = repo
            .list_for_lead(&lead)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["a", "c"]);
    }
}
