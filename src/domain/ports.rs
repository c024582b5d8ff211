use crate::domain::model::LeadRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Instant;

/// 遠端持久化：只關心成功或失敗，不讀取回應內容
#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn insert(&self, record: &LeadRecord) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub trait RemoteConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn table(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}

#[async_trait]
impl<T: LeadRepository + ?Sized> LeadRepository for std::sync::Arc<T> {
    async fn insert(&self, record: &LeadRecord) -> Result<()> {
        (**self).insert(record).await
    }
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
