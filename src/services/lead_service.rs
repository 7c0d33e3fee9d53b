//! Lead service layer.
//!
//! Business rules for saved leads, categories and lists on top of the
//! repositories.

use crate::domain::{E164Number, EmailAddress, PhoneNumber, RecordId, Website};
use crate::error::{DataError, DataResult};
use crate::models::{Category, FilterCriterion, Lead, LeadList, LeadResult, LeadStatus};
use crate::repositories::{CategoryRepository, LeadRepository, ListRepository};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("Failed to compile color regex"));

/// Fields accepted when creating a lead by hand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadInput {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub source_link: Option<String>,
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub category_ids: Vec<RecordId>,
}

/// Fields accepted when creating or updating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    /// Required for updates, ignored on create
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

/// Fields accepted when creating or updating a list.
#[derive(Debug, Clone, Deserialize)]
pub struct ListInput {
    /// Required for updates, ignored on create
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_dynamic: bool,
    #[serde(default)]
    pub filter_criteria: Option<Vec<FilterCriterion>>,
    /// Members of a static list
    #[serde(default)]
    pub leads: Vec<RecordId>,
}

/// A list together with the leads it currently contains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedList {
    #[serde(flatten)]
    pub list: LeadList,
    pub leads: Vec<Lead>,
}

/// Lead, category and list operations for one user at a time.
#[async_trait]
pub trait LeadService: Send + Sync {
    async fn list_leads(&self, user_id: &str) -> DataResult<Vec<Lead>>;

    async fn create_lead(&self, user_id: &str, input: LeadInput) -> DataResult<Lead>;

    /// Save a streamed result as a new lead.
    async fn save_result(&self, user_id: &str, result: &LeadResult) -> DataResult<Lead>;

    async fn assign_categories(
        &self,
        user_id: &str,
        lead_id: &RecordId,
        category_ids: &[RecordId],
    ) -> DataResult<Lead>;

    async fn list_categories(&self, user_id: &str) -> DataResult<Vec<Category>>;

    async fn create_category(&self, user_id: &str, input: CategoryInput) -> DataResult<Category>;

    async fn update_category(&self, user_id: &str, input: CategoryInput) -> DataResult<Category>;

    /// Delete a category and detach it from every lead.
    async fn delete_category(&self, user_id: &str, id: &RecordId) -> DataResult<()>;

    async fn list_lists(&self, user_id: &str) -> DataResult<Vec<LeadList>>;

    async fn create_list(&self, user_id: &str, input: ListInput) -> DataResult<LeadList>;

    async fn update_list(&self, user_id: &str, input: ListInput) -> DataResult<LeadList>;

    async fn delete_list(&self, user_id: &str, id: &RecordId) -> DataResult<()>;

    /// A list with its leads: filter matches for dynamic lists, members for
    /// static ones.
    async fn resolve_list(&self, user_id: &str, id: &RecordId) -> DataResult<ResolvedList>;
}

/// Default implementation of LeadService.
pub struct LeadServiceImpl {
    leads: Arc<dyn LeadRepository>,
    categories: Arc<dyn CategoryRepository>,
    lists: Arc<dyn ListRepository>,
}

/// Validation helper functions.
impl LeadServiceImpl {
    fn validate_lead(lead: &Lead) -> DataResult<()> {
        if let Some(email) = &lead.email {
            EmailAddress::new(email.as_str())
                .map_err(|e| DataError::InvalidInput(e.to_string()))?;
        }
        if let Some(phone) = &lead.phone {
            if PhoneNumber::new(phone.as_str()).is_err() && E164Number::new(phone.as_str()).is_err()
            {
                return Err(DataError::InvalidInput(format!(
                    "Invalid phone number: {}",
                    phone
                )));
            }
        }
        if let Some(website) = &lead.website {
            Website::new(website.as_str()).map_err(|e| DataError::InvalidInput(e.to_string()))?;
        }
        Ok(())
    }

    fn validate_category(input: &CategoryInput) -> DataResult<()> {
        if input.name.trim().is_empty() {
            return Err(DataError::InvalidInput(
                "Category name cannot be empty".to_string(),
            ));
        }
        if !COLOR_RE.is_match(&input.color) {
            return Err(DataError::InvalidInput(format!(
                "Color must look like #rrggbb, got: {}",
                input.color
            )));
        }
        Ok(())
    }

    fn validate_list(input: &ListInput) -> DataResult<()> {
        if input.name.trim().is_empty() {
            return Err(DataError::InvalidInput(
                "List name cannot be empty".to_string(),
            ));
        }
        if input.is_dynamic && input.filter_criteria.as_ref().map_or(true, Vec::is_empty) {
            return Err(DataError::InvalidInput(
                "Dynamic lists need at least one filter criterion".to_string(),
            ));
        }
        Ok(())
    }

    fn require_id(id: Option<RecordId>, kind: &str) -> DataResult<RecordId> {
        id.ok_or_else(|| DataError::InvalidInput(format!("{} ID is required", kind)))
    }
}

impl LeadServiceImpl {
    /// Create a new lead service.
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        categories: Arc<dyn CategoryRepository>,
        lists: Arc<dyn ListRepository>,
    ) -> Self {
        Self {
            leads,
            categories,
            lists,
        }
    }

    /// Fail unless every ID names a lead owned by `user_id`.
    async fn ensure_leads_exist(&self, user_id: &str, ids: &[RecordId]) -> DataResult<()> {
        for id in ids {
            self.leads
                .get(user_id, id)
                .await
                .map_err(|_| DataError::InvalidInput(format!("Unknown lead: {}", id)))?;
        }
        Ok(())
    }

    /// Fail unless every ID names a category owned by `user_id`.
    async fn ensure_categories_exist(&self, user_id: &str, ids: &[RecordId]) -> DataResult<()> {
        for id in ids {
            self.categories
                .get(user_id, id)
                .await
                .map_err(|_| DataError::InvalidInput(format!("Unknown category: {}", id)))?;
        }
        Ok(())
    }

    /// Shape list input into a record; filters only on dynamic lists and
    /// members only on static ones.
    fn build_list(user_id: &str, id: RecordId, input: ListInput, created_at: String) -> LeadList {
        let (filter_criteria, members) = if input.is_dynamic {
            (input.filter_criteria, Vec::new())
        } else {
            (None, dedup_ids(input.leads))
        };

        LeadList {
            id,
            user_id: user_id.to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            is_dynamic: input.is_dynamic,
            filter_criteria,
            members,
            created_at,
        }
    }
}

fn dedup_ids(ids: Vec<RecordId>) -> Vec<RecordId> {
    let mut unique: Vec<RecordId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl LeadService for LeadServiceImpl {
    async fn list_leads(&self, user_id: &str) -> DataResult<Vec<Lead>> {
        self.leads.list(user_id).await
    }

    async fn create_lead(&self, user_id: &str, input: LeadInput) -> DataResult<Lead> {
        let category_ids = dedup_ids(input.category_ids);
        self.ensure_categories_exist(user_id, &category_ids).await?;

        let lead = Lead {
            id: RecordId::generate(),
            user_id: user_id.to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            company: input.company,
            job_title: input.job_title,
            website: input.website,
            source_link: input.source_link,
            status: input.status.unwrap_or_default(),
            category_ids,
            created_at: now(),
        };
        Self::validate_lead(&lead)?;

        let lead = self.leads.create(&lead).await?;
        tracing::info!(lead_id = %lead.id, "Lead created");
        Ok(lead)
    }

    async fn save_result(&self, user_id: &str, result: &LeadResult) -> DataResult<Lead> {
        let lead = self.leads.create(&Lead::from_result(user_id, result)).await?;
        tracing::info!(
            lead_id = %lead.id,
            link = %result.hit.link,
            "Lead saved from search result"
        );
        Ok(lead)
    }

    async fn assign_categories(
        &self,
        user_id: &str,
        lead_id: &RecordId,
        category_ids: &[RecordId],
    ) -> DataResult<Lead> {
        let category_ids = dedup_ids(category_ids.to_vec());
        self.ensure_categories_exist(user_id, &category_ids).await?;
        self.leads
            .assign_categories(user_id, lead_id, &category_ids)
            .await
    }

    async fn list_categories(&self, user_id: &str) -> DataResult<Vec<Category>> {
        self.categories.list(user_id).await
    }

    async fn create_category(&self, user_id: &str, input: CategoryInput) -> DataResult<Category> {
        Self::validate_category(&input)?;

        let category = Category {
            id: RecordId::generate(),
            user_id: user_id.to_string(),
            name: input.name.trim().to_string(),
            color: input.color,
            description: input.description,
            created_at: now(),
        };
        self.categories.create(&category).await
    }

    async fn update_category(&self, user_id: &str, input: CategoryInput) -> DataResult<Category> {
        let id = Self::require_id(input.id.clone(), "Category")?;
        Self::validate_category(&input)?;

        let existing = self.categories.get(user_id, &id).await?;
        let category = Category {
            name: input.name.trim().to_string(),
            color: input.color,
            description: input.description,
            ..existing
        };
        self.categories.update(&category).await
    }

    async fn delete_category(&self, user_id: &str, id: &RecordId) -> DataResult<()> {
        self.categories.delete(user_id, id).await?;

        for lead in self.leads.list(user_id).await? {
            if lead.category_ids.contains(id) {
                let remaining: Vec<RecordId> = lead
                    .category_ids
                    .iter()
                    .filter(|c| *c != id)
                    .cloned()
                    .collect();
                self.leads
                    .assign_categories(user_id, &lead.id, &remaining)
                    .await?;
            }
        }
        Ok(())
    }

    async fn list_lists(&self, user_id: &str) -> DataResult<Vec<LeadList>> {
        self.lists.list(user_id).await
    }

    async fn create_list(&self, user_id: &str, input: ListInput) -> DataResult<LeadList> {
        Self::validate_list(&input)?;
        if !input.is_dynamic {
            self.ensure_leads_exist(user_id, &input.leads).await?;
        }

        let list = Self::build_list(user_id, RecordId::generate(), input, now());
        self.lists.create(&list).await
    }

    async fn update_list(&self, user_id: &str, input: ListInput) -> DataResult<LeadList> {
        let id = Self::require_id(input.id.clone(), "List")?;
        Self::validate_list(&input)?;
        if !input.is_dynamic {
            self.ensure_leads_exist(user_id, &input.leads).await?;
        }

        let existing = self.lists.get(user_id, &id).await?;
        let list = Self::build_list(user_id, id, input, existing.created_at);
        self.lists.update(&list).await
    }

    async fn delete_list(&self, user_id: &str, id: &RecordId) -> DataResult<()> {
        self.lists.delete(user_id, id).await
    }

    async fn resolve_list(&self, user_id: &str, id: &RecordId) -> DataResult<ResolvedList> {
        let list = self.lists.get(user_id, id).await?;

        let leads = match (list.is_dynamic, &list.filter_criteria) {
            (true, Some(criteria)) => self
                .leads
                .list(user_id)
                .await?
                .into_iter()
                .filter(|lead| criteria.iter().all(|c| c.matches(lead)))
                .collect(),
            _ => {
                let mut members = Vec::with_capacity(list.members.len());
                for lead_id in &list.members {
                    match self.leads.get(user_id, lead_id).await {
                        Ok(lead) => members.push(lead),
                        // Deleted since it was added
                        Err(DataError::NotFound(_)) => continue,
                        Err(e) => return Err(e),
                    }
                }
                members
            }
        };

        Ok(ResolvedList { list, leads })
    }
}
