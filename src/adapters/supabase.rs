use crate::domain::model::LeadRecord;
use crate::domain::ports::{LeadRepository, RemoteConfigProvider};
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 透過 PostgREST（Supabase REST API）寫入 Lead
#[derive(Debug, Clone)]
pub struct SupabaseLeadStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SupabaseLeadStore {
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config<C: RemoteConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.base_url(),
            config.api_key(),
            config.table(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LeadRepository for SupabaseLeadStore {
    async fn insert(&self, record: &LeadRecord) -> Result<()> {
        tracing::debug!("Making API request to: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            return Ok(());
        }

        // 回應內容只寫進 log，不顯示給使用者
        let body = response.text().await.unwrap_or_default();
        Err(LeadError::RemoteRejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CompanySize, Industry};
    use httpmock::prelude::*;

    fn record() -> LeadRecord {
        LeadRecord {
            full_name: "Jane Doe".to_string(),
            email: "jane@company.com".to_string(),
            company_name: "Acme Corp".to_string(),
            company_size: CompanySize::Medium,
            industry: Industry::Healthcare,
            systems: "AS/400, Oracle Forms".to_string(),
            challenge: String::new(),
            modernization_focus: true,
        }
    }

    fn store(server: &MockServer) -> SupabaseLeadStore {
        SupabaseLeadStore::new(&server.base_url(), "anon-key", "leads", Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_posts_record_with_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/leads")
                .header("apikey", "anon-key")
                .header("Authorization", "Bearer anon-key")
                .header("Prefer", "return=minimal")
                .json_body(serde_json::json!({
                    "full_name": "Jane Doe",
                    "email": "jane@company.com",
                    "company_name": "Acme Corp",
                    "company_size": "51-200",
                    "industry": "Healthcare",
                    "systems": "AS/400, Oracle Forms",
                    "challenge": "",
                    "modernization_focus": true
                }));
            then.status(201);
        });

        store(&server).insert(&record()).await.unwrap();
        api_mock.assert();
    }

    #[tokio::test]
    async fn test_insert_maps_rejection() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/rest/v1/leads");
            then.status(409)
                .header("Content-Type", "application/json")
                .body(r#"{"code":"23505","message":"duplicate key value"}"#);
        });

        let err = store(&server).insert(&record()).await.unwrap_err();
        api_mock.assert();
        match err {
            LeadError::RemoteRejected { status, body } => {
                assert_eq!(status, 409);
                assert!(body.contains("23505"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/rest/v1/leads");
            then.status(201).delay(Duration::from_millis(500));
        });

        let store =
            SupabaseLeadStore::new(&server.base_url(), "anon-key", "leads", Duration::from_millis(50))
                .unwrap();
        let err = store.insert(&record()).await.unwrap_err();
        assert!(matches!(err, LeadError::Http(ref e) if e.is_timeout()));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let store = SupabaseLeadStore::new(
            "https://abc.supabase.co/",
            "key",
            "contact_leads",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(store.endpoint(), "https://abc.supabase.co/rest/v1/contact_leads");
    }
}
