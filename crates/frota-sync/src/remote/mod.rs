//! Remote table store adapter

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::RemoteError;
use crate::models::{Car, NewCar, Project, ResourceEntry};

pub mod memory;
pub mod postgrest;

pub use memory::MemoryRemote;
pub use postgrest::PostgrestStore;

/// Remote collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Projects,
    Cars,
    Resources,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Projects => "projects",
            Table::Cars => "cars",
            Table::Resources => "resources",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row filter: `column = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::eq("id", id)
    }

    /// Whether a JSON row matches; string and numeric columns compare by text
    pub fn matches(&self, row: &Value) -> bool {
        match row.get(self.column) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Number(n)) => n.to_string() == self.value,
            _ => false,
        }
    }
}

/// Trait for remote table stores
///
/// Rows travel as JSON objects; `RemoteTables` gives the typed view.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch every row of a table
    async fn fetch_all(&self, table: Table) -> Result<Vec<Value>, RemoteError>;

    /// Insert a row and return the stored representation
    async fn insert(&self, table: Table, row: Value) -> Result<Value, RemoteError>;

    /// Patch matching rows and return their new representation
    async fn update(&self, table: Table, filter: &Filter, patch: Value)
        -> Result<Vec<Value>, RemoteError>;

    /// Delete matching rows
    async fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError>;

    /// Get backend name
    fn name(&self) -> &'static str;
}

fn decode<T: DeserializeOwned>(row: Value) -> Result<T, RemoteError> {
    Ok(serde_json::from_value(row)?)
}

fn decode_all<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, RemoteError> {
    rows.into_iter().map(decode).collect()
}

fn first<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Result<T, RemoteError> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::EmptyResponse(table.to_string()))?;
    decode(row)
}

/// Typed access to the three fleet collections
#[derive(Clone)]
pub struct RemoteTables {
    store: Arc<dyn RemoteStore>,
}

impl RemoteTables {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn projects(&self) -> Result<Vec<Project>, RemoteError> {
        decode_all(self.store.fetch_all(Table::Projects).await?)
    }

    pub async fn cars(&self) -> Result<Vec<Car>, RemoteError> {
        decode_all(self.store.fetch_all(Table::Cars).await?)
    }

    /// Catalog names in remote order
    pub async fn resource_names(&self) -> Result<Vec<String>, RemoteError> {
        let entries: Vec<ResourceEntry> = decode_all(self.store.fetch_all(Table::Resources).await?)?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    pub async fn insert_car(&self, car: &NewCar) -> Result<Car, RemoteError> {
        let row = json!({
            "plate": car.plate,
            "model": car.model,
            "resources": car.resources,
            "project_id": Value::Null,
        });
        decode(self.store.insert(Table::Cars, row).await?)
    }

    pub async fn delete_car(&self, id: &str) -> Result<(), RemoteError> {
        self.store.delete(Table::Cars, &Filter::id(id)).await
    }

    pub async fn set_car_project(
        &self,
        id: &str,
        project_id: Option<&str>,
    ) -> Result<Car, RemoteError> {
        let rows = self
            .store
            .update(Table::Cars, &Filter::id(id), json!({ "project_id": project_id }))
            .await?;
        first(Table::Cars, rows)
    }

    /// Unallocate every remote car assigned to `project_id`
    pub async fn release_project_cars(&self, project_id: &str) -> Result<(), RemoteError> {
        self.store
            .update(
                Table::Cars,
                &Filter::eq("project_id", project_id),
                json!({ "project_id": Value::Null }),
            )
            .await?;
        Ok(())
    }

    pub async fn insert_project(&self, name: &str) -> Result<Project, RemoteError> {
        decode(self.store.insert(Table::Projects, json!({ "name": name })).await?)
    }

    pub async fn rename_project(&self, id: &str, name: &str) -> Result<Project, RemoteError> {
        let rows = self
            .store
            .update(Table::Projects, &Filter::id(id), json!({ "name": name }))
            .await?;
        first(Table::Projects, rows)
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), RemoteError> {
        self.store.delete(Table::Projects, &Filter::id(id)).await
    }

    pub async fn insert_resource(&self, name: &str) -> Result<ResourceEntry, RemoteError> {
        decode(self.store.insert(Table::Resources, json!({ "name": name })).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_strings_and_numbers() {
        let filter = Filter::id("42");
        assert!(filter.matches(&json!({ "id": "42" })));
        assert!(filter.matches(&json!({ "id": 42 })));
        assert!(!filter.matches(&json!({ "id": "7" })));
        assert!(!filter.matches(&json!({ "name": "42" })));
    }

    #[test]
    fn test_null_does_not_match() {
        let filter = Filter::eq("project_id", "p1");
        assert!(!filter.matches(&json!({ "project_id": null })));
    }

    #[tokio::test]
    async fn test_typed_tables_over_memory_store() {
        let store = MemoryRemote::new();
        let tables = RemoteTables::new(Arc::new(store));

        let project = tables.insert_project("Obra Norte").await.unwrap();
        let car = tables
            .insert_car(&NewCar::new("ABC123", "Hilux", vec!["Capota".into()]))
            .await
            .unwrap();
        assert_eq!(car.project_id, None);

        let moved = tables.set_car_project(&car.id, Some(&project.id)).await.unwrap();
        assert_eq!(moved.project_id.as_deref(), Some(project.id.as_str()));

        tables.release_project_cars(&project.id).await.unwrap();
        assert_eq!(tables.cars().await.unwrap()[0].project_id, None);
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_empty_response() {
        let store = MemoryRemote::new();
        let tables = RemoteTables::new(Arc::new(store));

        let err = tables.rename_project("nope", "X").await.unwrap_err();
        assert!(matches!(err, RemoteError::EmptyResponse(_)));
    }
}
