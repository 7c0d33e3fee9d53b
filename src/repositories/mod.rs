mod memory;
mod traits;

pub use memory::{
    InMemoryCategoryRepository, InMemoryLeadRepository, InMemoryListRepository,
    InMemoryMessagingAccountRepository, InMemorySmsLogRepository,
};
pub use traits::{
    CategoryRepository, LeadRepository, ListRepository, MessagingAccountRepository,
    SmsLogRepository,
};
