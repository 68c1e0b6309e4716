// File: frota-sync/src/controller.rs
// Purpose: UI-side state (forms, inline rename, drag hold) driving the facade

use crate::error::FleetError;
use crate::facade::{LoadSource, Origin, SyncFacade};
use crate::models::{AppState, Car, NewCar, Project, ProjectColumn};

/// Draft of the car creation form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarForm {
    pub plate: String,
    pub model: String,
    selected: Vec<String>,
}

impl CarForm {
    /// Check or uncheck a catalog entry
    pub fn toggle_resource(&mut self, name: &str) {
        if let Some(pos) = self.selected.iter().position(|r| r == name) {
            self.selected.remove(pos);
        } else {
            self.selected.push(name.to_string());
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|r| r == name)
    }

    /// Selected resources in the order they were checked
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    fn to_input(&self) -> NewCar {
        NewCar::new(self.plate.clone(), self.model.clone(), self.selected.clone())
    }
}

/// Inline project name editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEditor {
    pub project_id: String,
    pub name: String,
}

/// The single owner of the application state for one UI session.
pub struct Controller {
    fleet: SyncFacade,
    pub car_form: CarForm,
    pub project_draft: String,
    pub resource_draft: String,
    editor: Option<RenameEditor>,
    held: Option<String>,
    notice: Option<FleetError>,
}

impl Controller {
    pub fn new(fleet: SyncFacade) -> Self {
        Self {
            fleet,
            car_form: CarForm::default(),
            project_draft: String::new(),
            resource_draft: String::new(),
            editor: None,
            held: None,
            notice: None,
        }
    }

    pub async fn start(&mut self) -> LoadSource {
        self.fleet.load_initial_state().await
    }

    pub fn state(&self) -> &AppState {
        self.fleet.list_all()
    }

    pub fn unallocated(&self) -> Vec<&Car> {
        self.state().unallocated()
    }

    pub fn columns(&self) -> Vec<ProjectColumn<'_>> {
        self.state().columns()
    }

    /// Last inline message or warning; cleared by the next successful action
    pub fn notice(&self) -> Option<&FleetError> {
        self.notice.as_ref()
    }

    fn record<T>(&mut self, result: Result<T, FleetError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.notice = None;
                Some(value)
            }
            Err(e) => {
                if e.is_warning() {
                    tracing::warn!(error = %e, "action rejected");
                } else {
                    tracing::debug!(error = %e, "action rejected");
                }
                self.notice = Some(e);
                None
            }
        }
    }

    /// Submit the car form; it is cleared only when the car was created
    pub async fn submit_car(&mut self) -> Option<Car> {
        let result = self.fleet.create_car(self.car_form.to_input()).await;
        let car = self.record(result)?;
        self.car_form = CarForm::default();
        Some(car)
    }

    pub async fn delete_car(&mut self, id: &str) -> Option<Origin> {
        if self.held.as_deref() == Some(id) {
            self.held = None;
        }
        let result = self.fleet.delete_car(id).await;
        self.record(result)
    }

    pub async fn submit_project(&mut self) -> Option<Project> {
        let result = self.fleet.create_project(&self.project_draft).await;
        let project = self.record(result)?;
        self.project_draft.clear();
        Some(project)
    }

    pub async fn delete_project(&mut self, id: &str) -> Option<Origin> {
        if self.editor.as_ref().is_some_and(|e| e.project_id == id) {
            self.editor = None;
        }
        let result = self.fleet.delete_project(id).await;
        self.record(result)
    }

    /// Add the drafted catalog entry; the draft is cleared either way
    pub async fn submit_resource(&mut self) -> Option<Origin> {
        let name = std::mem::take(&mut self.resource_draft);
        let result = self.fleet.add_resource(&name).await;
        self.record(result)
    }

    /// Open the inline editor on a project's current name
    pub fn begin_rename(&mut self, project_id: &str) {
        self.editor = self.state().project(project_id).map(|p| RenameEditor {
            project_id: p.id.clone(),
            name: p.name.clone(),
        });
    }

    pub fn editor(&self) -> Option<&RenameEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut RenameEditor> {
        self.editor.as_mut()
    }

    /// Save the editor (blur) and close it
    pub async fn commit_rename(&mut self) -> Option<Origin> {
        let editor = self.editor.take()?;
        let result = self.fleet.rename_project(&editor.project_id, &editor.name).await;
        self.record(result)
    }

    /// Pick up a car for reassignment
    pub fn start_drag(&mut self, car_id: &str) {
        if self.state().car(car_id).is_some() {
            self.held = Some(car_id.to_string());
        }
    }

    pub fn held(&self) -> Option<&str> {
        self.held.as_deref()
    }

    /// Drop the held car on a project, or on the unallocated list with `None`.
    /// Without a held car nothing happens.
    pub async fn drop_on(&mut self, project_id: Option<&str>) -> Option<Origin> {
        let car_id = self.held.take()?;
        let result = self.fleet.reassign_car(&car_id, project_id).await;
        self.record(result)
    }

    pub fn into_facade(self) -> SyncFacade {
        self.fleet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MemorySnapshot;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    async fn started() -> Controller {
        let mut ui = Controller::new(SyncFacade::new(None, Arc::new(MemorySnapshot::new())));
        ui.start().await;
        ui
    }

    #[test]
    fn test_toggle_resource_keeps_check_order() {
        let mut form = CarForm::default();
        form.toggle_resource("Capota");
        form.toggle_resource("Tração 4x4");
        form.toggle_resource("Suporte de escada");
        form.toggle_resource("Capota");

        assert_eq!(form.selected(), ["Tração 4x4", "Suporte de escada"]);
        assert!(!form.is_selected("Capota"));
    }

    #[tokio::test]
    async fn test_submit_car_clears_form_only_on_success() {
        let mut ui = started().await;
        ui.car_form.model = "Fiat Uno".into();
        ui.car_form.toggle_resource("Capota");

        assert!(ui.submit_car().await.is_none());
        assert_eq!(ui.notice(), Some(&FleetError::EmptyField("plate")));
        assert_eq!(ui.car_form.model, "Fiat Uno");

        ui.car_form.plate = "ABC123".into();
        let car = ui.submit_car().await.unwrap();

        assert_eq!(car.resources, vec!["Capota"]);
        assert_eq!(ui.car_form, CarForm::default());
        assert!(ui.notice().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_resource_clears_draft_and_warns() {
        let mut ui = started().await;
        ui.resource_draft = "Capota".into();

        assert!(ui.submit_resource().await.is_none());
        assert!(ui.resource_draft.is_empty());
        assert!(ui.notice().unwrap().is_warning());
        assert_eq!(ui.state().available_resources.len(), 3);
    }

    #[tokio::test]
    async fn test_rename_flow() {
        let mut ui = started().await;
        ui.begin_rename("p1");
        assert_eq!(ui.editor().unwrap().name, "Projeto A");

        ui.editor_mut().unwrap().name = "Obra Centro".into();
        assert_eq!(ui.commit_rename().await, Some(Origin::Local));

        assert!(ui.editor().is_none());
        assert_eq!(ui.state().project("p1").unwrap().name, "Obra Centro");
    }

    #[tokio::test]
    async fn test_drop_without_held_car_is_noop() {
        let mut ui = started().await;
        ui.car_form.plate = "ABC123".into();
        ui.car_form.model = "Fiat Uno".into();
        ui.submit_car().await.unwrap();
        let before = ui.state().clone();

        assert_eq!(ui.drop_on(Some("p1")).await, None);
        assert_eq!(ui.state(), &before);
    }

    #[tokio::test]
    async fn test_drag_back_to_unallocated() {
        let mut ui = started().await;
        ui.car_form.plate = "ABC123".into();
        ui.car_form.model = "Fiat Uno".into();
        let car = ui.submit_car().await.unwrap();

        ui.start_drag(&car.id);
        ui.drop_on(Some("p2")).await.unwrap();
        assert_eq!(ui.columns()[1].cars.len(), 1);
        assert!(ui.held().is_none());

        ui.start_drag(&car.id);
        ui.drop_on(None).await.unwrap();
        assert_eq!(ui.unallocated().len(), 1);
        assert!(ui.columns().iter().all(|c| c.cars.is_empty()));
    }

    #[tokio::test]
    async fn test_deleting_held_car_releases_it() {
        let mut ui = started().await;
        ui.car_form.plate = "ABC123".into();
        ui.car_form.model = "Fiat Uno".into();
        let car = ui.submit_car().await.unwrap();

        ui.start_drag(&car.id);
        ui.delete_car(&car.id).await.unwrap();

        assert!(ui.held().is_none());
        assert_eq!(ui.drop_on(Some("p1")).await, None);
    }
}
