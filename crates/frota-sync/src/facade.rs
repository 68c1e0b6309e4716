// File: frota-sync/src/facade.rs
// Purpose: Single mutation API over the remote table store and the local snapshot

use std::sync::Arc;

use crate::config::FleetConfig;
use crate::error::{FleetError, RemoteError};
use crate::ids::next_local_id;
use crate::models::{require, AppState, Car, NewCar, Project};
use crate::remote::{PostgrestStore, RemoteStore, RemoteTables, Table};
use crate::snapshot::{FilesystemSnapshot, SnapshotStore};

/// Which path applied a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The remote store accepted it; state holds the server's representation
    Remote,
    /// The remote store failed; applied locally without rollback
    Optimistic,
    /// No remote store configured
    Local,
}

/// Where the initial state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Snapshot,
    Seed,
}

/// Owns the application state and routes every mutation through the
/// remote store (when configured) before falling back to local application.
///
/// The local snapshot is rewritten after every change, whichever path
/// applied it.
pub struct SyncFacade {
    remote: Option<Arc<dyn RemoteStore>>,
    snapshot: Arc<dyn SnapshotStore>,
    state: AppState,
}

impl SyncFacade {
    pub fn new(remote: Option<Arc<dyn RemoteStore>>, snapshot: Arc<dyn SnapshotStore>) -> Self {
        match &remote {
            Some(store) => tracing::info!(backend = store.name(), "remote store configured"),
            None => tracing::warn!("remote store not configured; using local snapshot"),
        }

        Self {
            remote,
            snapshot,
            state: AppState::default(),
        }
    }

    /// Build the PostgREST adapter (when endpoint and key are set) and the
    /// filesystem snapshot from configuration
    pub async fn from_config(config: &FleetConfig) -> anyhow::Result<Self> {
        let remote: Option<Arc<dyn RemoteStore>> = match config.remote_settings() {
            Some(settings) => Some(Arc::new(PostgrestStore::new(&settings)?)),
            None => None,
        };
        let snapshot = FilesystemSnapshot::new(&config.storage).await?;

        Ok(Self::new(remote, Arc::new(snapshot)))
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Current state (`listAll`)
    pub fn list_all(&self) -> &AppState {
        &self.state
    }

    fn tables(&self) -> Option<RemoteTables> {
        self.remote.clone().map(RemoteTables::new)
    }

    /// Load state once per session: the whole remote store, or else the
    /// local snapshot, or else the seed. Never a mix.
    pub async fn load_initial_state(&mut self) -> LoadSource {
        if let Some(tables) = self.tables() {
            match Self::fetch_remote(&tables).await {
                Ok(state) => {
                    tracing::info!(
                        cars = state.cars.len(),
                        projects = state.projects.len(),
                        "loaded state from remote store"
                    );
                    self.state = state;
                    self.persist().await;
                    return LoadSource::Remote;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "remote load failed; falling back to local snapshot");
                }
            }
        }

        let source = match self.snapshot.load().await {
            Ok(Some(state)) => {
                self.state = state;
                LoadSource::Snapshot
            }
            Ok(None) => {
                self.state = AppState::seed();
                LoadSource::Seed
            }
            Err(e) => {
                tracing::warn!(error = %e, "local snapshot unreadable; starting from seed");
                self.state = AppState::seed();
                LoadSource::Seed
            }
        };

        tracing::info!(source = ?source, backend = self.snapshot.name(), "loaded local state");
        source
    }

    async fn fetch_remote(tables: &RemoteTables) -> Result<AppState, RemoteError> {
        let projects = tables.projects().await?;
        let cars = tables.cars().await?;
        let available_resources = tables.resource_names().await?;

        Ok(AppState {
            cars,
            projects,
            available_resources,
        })
    }

    /// Write the whole state to the local snapshot. Failures are logged only.
    async fn persist(&self) {
        if let Err(e) = self.snapshot.save(&self.state).await {
            tracing::error!(error = ?e, backend = self.snapshot.name(), "failed to persist snapshot");
        }
    }

    fn masked(table: Table, op: &str, err: &RemoteError) {
        tracing::warn!(%table, op, error = %err, "remote call failed; applying locally");
    }

    /// Create a car. It starts unallocated.
    pub async fn create_car(&mut self, input: NewCar) -> Result<Car, FleetError> {
        input.validate()?;

        let (car, origin) = match self.tables() {
            Some(tables) => match tables.insert_car(&input).await {
                Ok(car) => (car, Origin::Remote),
                Err(e) => {
                    Self::masked(Table::Cars, "insert", &e);
                    (input.into_car(next_local_id()), Origin::Optimistic)
                }
            },
            None => (input.into_car(next_local_id()), Origin::Local),
        };

        tracing::debug!(id = %car.id, ?origin, "car created");
        self.state.push_car(car.clone());
        self.persist().await;
        Ok(car)
    }

    /// Delete a car. Unknown ids are a no-op.
    pub async fn delete_car(&mut self, id: &str) -> Result<Origin, FleetError> {
        require("id", id)?;

        let origin = match self.tables() {
            Some(tables) => match tables.delete_car(id).await {
                Ok(()) => Origin::Remote,
                Err(e) => {
                    Self::masked(Table::Cars, "delete", &e);
                    Origin::Optimistic
                }
            },
            None => Origin::Local,
        };

        if self.state.remove_car(id) {
            self.persist().await;
        }
        Ok(origin)
    }

    pub async fn create_project(&mut self, name: &str) -> Result<Project, FleetError> {
        require("name", name)?;
        let name = name.trim();

        let local = || Project {
            id: next_local_id(),
            name: name.to_string(),
        };

        let project = match self.tables() {
            Some(tables) => match tables.insert_project(name).await {
                Ok(project) => project,
                Err(e) => {
                    Self::masked(Table::Projects, "insert", &e);
                    local()
                }
            },
            None => local(),
        };

        self.state.push_project(project.clone());
        self.persist().await;
        Ok(project)
    }

    pub async fn rename_project(&mut self, id: &str, name: &str) -> Result<Origin, FleetError> {
        require("name", name)?;
        if self.state.project(id).is_none() {
            return Err(FleetError::UnknownProject(id.to_string()));
        }
        let name = name.trim();

        let origin = match self.tables() {
            Some(tables) => match tables.rename_project(id, name).await {
                Ok(project) => {
                    self.state.replace_project(project);
                    Origin::Remote
                }
                Err(e) => {
                    Self::masked(Table::Projects, "update", &e);
                    self.state.rename_project(id, name);
                    Origin::Optimistic
                }
            },
            None => {
                self.state.rename_project(id, name);
                Origin::Local
            }
        };

        self.persist().await;
        Ok(origin)
    }

    /// Delete a project and unallocate its cars. No car is deleted.
    pub async fn delete_project(&mut self, id: &str) -> Result<Origin, FleetError> {
        require("id", id)?;

        let origin = match self.tables() {
            Some(tables) => {
                let released = tables.release_project_cars(id).await;
                let deleted = tables.delete_project(id).await;

                match released.and(deleted) {
                    Ok(()) => Origin::Remote,
                    Err(e) => {
                        Self::masked(Table::Projects, "delete", &e);
                        Origin::Optimistic
                    }
                }
            }
            None => Origin::Local,
        };

        let released = self.state.remove_project(id);
        tracing::debug!(project = id, released = released.len(), "project deleted");
        self.persist().await;
        Ok(origin)
    }

    /// Add a catalog entry. Duplicates are rejected before any store call.
    pub async fn add_resource(&mut self, name: &str) -> Result<Origin, FleetError> {
        require("name", name)?;
        let name = name.trim();
        if self.state.has_resource(name) {
            return Err(FleetError::DuplicateResource(name.to_string()));
        }

        let (name, origin) = match self.tables() {
            Some(tables) => match tables.insert_resource(name).await {
                Ok(entry) => (entry.name, Origin::Remote),
                Err(e) => {
                    Self::masked(Table::Resources, "insert", &e);
                    (name.to_string(), Origin::Optimistic)
                }
            },
            None => (name.to_string(), Origin::Local),
        };

        self.state.push_resource(name);
        self.persist().await;
        Ok(origin)
    }

    /// Move a car to a project, or unallocate it with `None`.
    pub async fn reassign_car(
        &mut self,
        car_id: &str,
        project_id: Option<&str>,
    ) -> Result<Origin, FleetError> {
        if self.state.car(car_id).is_none() {
            return Err(FleetError::UnknownCar(car_id.to_string()));
        }
        if let Some(project_id) = project_id {
            if self.state.project(project_id).is_none() {
                return Err(FleetError::UnknownProject(project_id.to_string()));
            }
        }

        let origin = match self.tables() {
            Some(tables) => match tables.set_car_project(car_id, project_id).await {
                Ok(car) => {
                    self.state.replace_car(car);
                    Origin::Remote
                }
                Err(e) => {
                    Self::masked(Table::Cars, "update", &e);
                    self.state.set_car_project(car_id, project_id.map(str::to_string));
                    Origin::Optimistic
                }
            },
            None => {
                self.state.set_car_project(car_id, project_id.map(str::to_string));
                Origin::Local
            }
        };

        self.persist().await;
        Ok(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;
    use crate::snapshot::MemorySnapshot;
    use rstest::rstest;

    fn local_only() -> SyncFacade {
        SyncFacade::new(None, Arc::new(MemorySnapshot::new()))
    }

    #[rstest]
    #[case("", "Uno", "plate")]
    #[case("ABC123", "", "model")]
    #[case("   ", "Uno", "plate")]
    #[tokio::test]
    async fn test_create_car_requires_fields(
        #[case] plate: &str,
        #[case] model: &str,
        #[case] field: &'static str,
    ) {
        let mut fleet = local_only();
        fleet.load_initial_state().await;

        let err = fleet
            .create_car(NewCar::new(plate, model, vec![]))
            .await
            .unwrap_err();

        assert_eq!(err, FleetError::EmptyField(field));
        assert!(fleet.list_all().cars.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_resource_skips_remote() {
        let remote = MemoryRemote::new();
        let mut fleet = SyncFacade::new(
            Some(Arc::new(remote.clone())),
            Arc::new(MemorySnapshot::new()),
        );
        fleet.add_resource("Capota").await.unwrap();

        // Remote would also reject it, but it must not even be asked
        remote.set_offline(true);
        let err = fleet.add_resource("Capota").await.unwrap_err();

        assert!(err.is_warning());
        assert_eq!(fleet.list_all().available_resources, vec!["Capota"]);
        assert_eq!(remote.rows(Table::Resources).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rename_unknown_project() {
        let mut fleet = local_only();
        fleet.load_initial_state().await;

        let err = fleet.rename_project("p9", "Nova").await.unwrap_err();
        assert_eq!(err, FleetError::UnknownProject("p9".into()));
    }

    #[tokio::test]
    async fn test_reassign_to_unknown_project_is_rejected() {
        let mut fleet = local_only();
        fleet.load_initial_state().await;
        let car = fleet
            .create_car(NewCar::new("ABC123", "Uno", vec![]))
            .await
            .unwrap();

        let err = fleet.reassign_car(&car.id, Some("p9")).await.unwrap_err();
        assert_eq!(err, FleetError::UnknownProject("p9".into()));
        assert_eq!(fleet.list_all().cars[0].project_id, None);
    }

    #[tokio::test]
    async fn test_local_ids_increase() {
        let mut fleet = local_only();
        let a = fleet.create_project("A").await.unwrap();
        let b = fleet.create_project("B").await.unwrap();

        let a: i64 = a.id.parse().unwrap();
        let b: i64 = b.id.parse().unwrap();
        assert!(a < b);
    }
}
