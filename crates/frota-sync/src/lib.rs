// File: frota-sync/src/lib.rs
// Purpose: Main entry point for frota-sync library

//! # frota-sync
//!
//! Fleet allocation state (cars, projects, equipment catalog) kept in sync with
//! an optional remote table store, falling back to a local JSON snapshot.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use frota_sync::{FleetConfig, SyncFacade, NewCar};
//!
//! let config = FleetConfig::load_default()?.with_env_overrides();
//! let mut fleet = SyncFacade::from_config(&config).await?;
//! fleet.load_initial_state().await;
//!
//! fleet.create_car(NewCar::new("ABC123", "Fiat Uno", vec!["Capota".into()])).await?;
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod facade;
pub mod ids;
pub mod models;
pub mod remote;
pub mod snapshot;

// Re-export main types
pub use config::{FleetConfig, RemoteSettings, StorageConfig};
pub use controller::{CarForm, Controller, RenameEditor};
pub use error::{FleetError, RemoteError};
pub use facade::{LoadSource, Origin, SyncFacade};
pub use models::{AppState, Car, NewCar, Project, ProjectColumn, ResourceEntry};
pub use remote::{Filter, RemoteStore, RemoteTables, Table};
pub use snapshot::SnapshotStore;
