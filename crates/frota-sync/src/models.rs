// File: frota-sync/src/models.rs
// Purpose: Fleet entities and the in-memory application state

use serde::{Deserialize, Serialize};

use crate::error::FleetError;

/// Resource names offered when there is no prior state.
pub const SEED_RESOURCES: [&str; 3] = ["Suporte de escada", "Capota", "Tração 4x4"];

/// A fleet vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    #[serde(deserialize_with = "id_text::required")]
    pub id: String,
    pub plate: String,
    pub model: String,
    #[serde(default)]
    pub resources: Vec<String>,
    /// `None` means unallocated
    #[serde(default, alias = "projectId", deserialize_with = "id_text::optional")]
    pub project_id: Option<String>,
}

/// Car creation input (what the creation form submits)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewCar {
    pub plate: String,
    pub model: String,
    pub resources: Vec<String>,
}

impl NewCar {
    pub fn new(plate: impl Into<String>, model: impl Into<String>, resources: Vec<String>) -> Self {
        Self {
            plate: plate.into(),
            model: model.into(),
            resources,
        }
    }

    /// Reject blank plate or model
    pub fn validate(&self) -> Result<(), FleetError> {
        require("plate", &self.plate)?;
        require("model", &self.model)?;
        Ok(())
    }

    /// Build the record stored when no server id is available.
    pub fn into_car(self, id: String) -> Car {
        Car {
            id,
            plate: self.plate,
            model: self.model,
            resources: self.resources,
            project_id: None,
        }
    }
}

/// An allocation bucket cars can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(deserialize_with = "id_text::required")]
    pub id: String,
    pub name: String,
}

/// Row of the remote `resources` collection; the name is its natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
}

/// Ids arrive as text locally but may be numeric columns remotely.
mod id_text {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    impl From<Raw> for String {
        fn from(raw: Raw) -> Self {
            match raw {
                Raw::Text(s) => s,
                Raw::Int(n) => n.to_string(),
            }
        }
    }

    pub fn required<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Raw::deserialize(d).map(String::from)
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Raw>::deserialize(d)?.map(String::from))
    }
}

/// Check a required text field.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), FleetError> {
    if value.trim().is_empty() {
        Err(FleetError::EmptyField(field))
    } else {
        Ok(())
    }
}

/// Everything the UI shows, and exactly what the local snapshot stores.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub cars: Vec<Car>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub available_resources: Vec<String>,
}

/// One project with the cars allocated to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectColumn<'a> {
    pub project: &'a Project,
    pub cars: Vec<&'a Car>,
}

impl AppState {
    /// Initial state used when neither the remote store nor a snapshot is available
    pub fn seed() -> Self {
        Self {
            cars: Vec::new(),
            projects: vec![
                Project { id: "p1".to_string(), name: "Projeto A".to_string() },
                Project { id: "p2".to_string(), name: "Projeto B".to_string() },
            ],
            available_resources: SEED_RESOURCES.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn car(&self, id: &str) -> Option<&Car> {
        self.cars.iter().find(|c| c.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn has_resource(&self, name: &str) -> bool {
        self.available_resources.iter().any(|r| r == name)
    }

    /// Cars not assigned to any project, in creation order
    pub fn unallocated(&self) -> Vec<&Car> {
        self.cars.iter().filter(|c| c.project_id.is_none()).collect()
    }

    /// Cars assigned to `project_id`, in creation order
    pub fn cars_in(&self, project_id: &str) -> Vec<&Car> {
        self.cars
            .iter()
            .filter(|c| c.project_id.as_deref() == Some(project_id))
            .collect()
    }

    /// Board projection: one column per project in insertion order
    pub fn columns(&self) -> Vec<ProjectColumn<'_>> {
        self.projects
            .iter()
            .map(|project| ProjectColumn {
                project,
                cars: self.cars_in(&project.id),
            })
            .collect()
    }

    pub fn push_car(&mut self, car: Car) {
        self.cars.push(car);
    }

    /// Returns whether a car was removed
    pub fn remove_car(&mut self, id: &str) -> bool {
        let before = self.cars.len();
        self.cars.retain(|c| c.id != id);
        self.cars.len() != before
    }

    /// Replace a car with a newer representation of the same id.
    pub fn replace_car(&mut self, car: Car) {
        if let Some(existing) = self.cars.iter_mut().find(|c| c.id == car.id) {
            *existing = car;
        }
    }

    pub fn set_car_project(&mut self, car_id: &str, project_id: Option<String>) {
        if let Some(car) = self.cars.iter_mut().find(|c| c.id == car_id) {
            car.project_id = project_id;
        }
    }

    pub fn push_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub fn rename_project(&mut self, id: &str, name: &str) {
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.name = name.to_string();
        }
    }

    /// Replace a project with a newer representation of the same id.
    pub fn replace_project(&mut self, project: Project) {
        if let Some(existing) = self.projects.iter_mut().find(|p| p.id == project.id) {
            *existing = project;
        }
    }

    /// Remove a project and unallocate its cars. Returns the ids of the
    /// cars that were unallocated.
    pub fn remove_project(&mut self, id: &str) -> Vec<String> {
        self.projects.retain(|p| p.id != id);

        let mut released = Vec::new();
        for car in self.cars.iter_mut() {
            if car.project_id.as_deref() == Some(id) {
                car.project_id = None;
                released.push(car.id.clone());
            }
        }
        released
    }

    /// Append a catalog name; false if it was already present.
    pub fn push_resource(&mut self, name: String) -> bool {
        if self.has_resource(&name) {
            return false;
        }
        self.available_resources.push(name);
        true
    }
}
