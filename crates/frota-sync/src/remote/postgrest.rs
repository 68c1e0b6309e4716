//! PostgREST (Supabase) table store
//!
//! Tables live under `{endpoint}/rest/v1/{table}`. Every request carries the
//! access key both as `apikey` and as a bearer token.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::config::RemoteSettings;
use crate::error::RemoteError;
use crate::remote::{Filter, RemoteStore, Table};

#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    endpoint: String,
    access_key: String,
}

impl PostgrestStore {
    /// Create a new PostgREST store
    pub fn new(settings: &RemoteSettings) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            access_key: settings.access_key.clone(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.endpoint, table.as_str())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.access_key)
            .bearer_auth(&self.access_key)
    }

    fn filtered(request: RequestBuilder, filter: &Filter) -> RequestBuilder {
        request.query(&[(filter.column, format!("eq.{}", filter.value))])
    }

    /// Turn non-2xx responses into `RemoteError::Status`
    async fn checked(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn rows(response: Response) -> Result<Vec<Value>, RemoteError> {
        let response = Self::checked(response).await?;
        Ok(response.json::<Vec<Value>>().await?)
    }
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    async fn fetch_all(&self, table: Table) -> Result<Vec<Value>, RemoteError> {
        let request = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&[("select", "*")]);

        Self::rows(request.send().await?).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, RemoteError> {
        let request = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&row);

        Self::rows(request.send().await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::EmptyResponse(table.to_string()))
    }

    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, RemoteError> {
        let request = self
            .authorized(self.client.patch(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&patch);

        Self::rows(Self::filtered(request, filter).send().await?).await
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError> {
        let request = self.authorized(self.client.delete(self.table_url(table)));

        Self::checked(Self::filtered(request, filter).send().await?).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgrest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(endpoint: &str) -> RemoteSettings {
        RemoteSettings {
            endpoint: endpoint.to_string(),
            access_key: "anon".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let store = PostgrestStore::new(&settings("https://fleet.supabase.co/")).unwrap();
        assert_eq!(
            store.table_url(Table::Cars),
            "https://fleet.supabase.co/rest/v1/cars"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        // Port 9 (discard) on localhost is not listening in test environments
        let store = PostgrestStore::new(&settings("http://127.0.0.1:9")).unwrap();
        let err = store.fetch_all(Table::Projects).await.unwrap_err();
        assert!(matches!(err, RemoteError::Network(_)));
    }
}
