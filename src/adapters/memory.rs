use crate::domain::model::LeadRecord;
use crate::domain::ports::LeadRepository;
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// 記憶體內的 Lead 存放區，給 --dry-run 與測試使用
#[derive(Debug, Default)]
pub struct InMemoryLeadStore {
    records: Mutex<Vec<LeadRecord>>,
    failures: Mutex<VecDeque<String>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 下一次 insert 以 RemoteRejected 失敗
    pub fn fail_next(&self, reason: &str) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reason.to_string());
    }

    pub fn records(&self) -> Vec<LeadRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadStore {
    async fn insert(&self, record: &LeadRecord) -> Result<()> {
        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        if let Some(body) = failure {
            return Err(LeadError::RemoteRejected { status: 500, body });
        }

        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        tracing::debug!("Stored lead in memory ({} total)", self.len());
        Ok(())
    }
}
