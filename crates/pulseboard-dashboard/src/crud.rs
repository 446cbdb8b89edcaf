//! List + add/edit dialog controller for the configuration screens
//!
//! The controller owns the fetched list, the open dialog with its form buffer and the
//! inline error banner. Saves and deletes re-fetch the list on success. A failed save
//! leaves the dialog and its buffer untouched so the user can retry.

use crate::error::{DashboardError, Result};
use pulseboard_client::CrudEndpoint;
use pulseboard_core::forms::{CrudEntity, EntityForm, validation_error};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

/// Whether the dialog adds a new row or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogMode {
    /// Add dialog
    Create,
    /// Edit dialog for the row with this id
    Edit(String),
}

/// An open add/edit dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog<F> {
    /// Add or edit
    pub mode: DialogMode,
    /// Form buffer
    pub form: F,
}

/// Controller for one configurable entity collection
pub struct CrudController<E: CrudEntity> {
    endpoint: Arc<dyn CrudEndpoint<E>>,
    items: Vec<E>,
    dialog: Option<Dialog<E::Form>>,
    error: Option<String>,
    loaded: bool,
}

impl<E: CrudEntity> fmt::Debug for CrudController<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudController")
            .field("kind", &E::KIND)
            .field("items", &self.items.len())
            .field("dialog_open", &self.dialog.is_some())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<E: CrudEntity> CrudController<E> {
    /// Controller over a backend endpoint; the list starts empty until [`Self::load`]
    #[must_use]
    pub fn new(endpoint: Arc<dyn CrudEndpoint<E>>) -> Self {
        Self {
            endpoint,
            items: Vec::new(),
            dialog: None,
            error: None,
            loaded: false,
        }
    }

    /// Fetch the list, keeping the previous one on failure
    pub async fn load(&mut self) -> bool {
        match self.endpoint.list().await {
            Ok(items) => {
                self.items = items;
                self.loaded = true;
                true
            }
            Err(e) => {
                warn!(kind = E::KIND, error = %e, "Failed to load list");
                self.error = Some(format!("Failed to load {}s: {e}", E::KIND));
                false
            }
        }
    }

    /// Current list
    #[must_use]
    pub fn items(&self) -> &[E] {
        &self.items
    }

    /// Whether at least one load succeeded
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Open the add dialog with an empty buffer
    pub fn open_create(&mut self) {
        self.dialog = Some(Dialog {
            mode: DialogMode::Create,
            form: E::Form::default(),
        });
    }

    /// Open the edit dialog seeded from the row with `id`
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if the list has no such row.
    pub fn open_edit(&mut self, id: &str) -> Result<()> {
        let entity = self
            .items
            .iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| DashboardError::not_found(format!("{} {id}", E::KIND)))?;

        self.dialog = Some(Dialog {
            mode: DialogMode::Edit(id.to_string()),
            form: entity.to_form(),
        });
        Ok(())
    }

    /// The open dialog
    #[must_use]
    pub const fn dialog(&self) -> Option<&Dialog<E::Form>> {
        self.dialog.as_ref()
    }

    /// Form buffer of the open dialog
    #[must_use]
    pub fn form(&self) -> Option<&E::Form> {
        self.dialog.as_ref().map(|d| &d.form)
    }

    /// Mutable form buffer of the open dialog
    pub fn form_mut(&mut self) -> Option<&mut E::Form> {
        self.dialog.as_mut().map(|d| &mut d.form)
    }

    /// Whether the submit button is enabled
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.form().is_some_and(|f| f.is_submittable())
    }

    /// Submit the open dialog
    ///
    /// # Errors
    ///
    /// Returns an error if no dialog is open, the buffer fails validation or the
    /// backend rejects the request. The banner carries the same message and the
    /// dialog stays open.
    pub async fn save(&mut self) -> Result<E> {
        let Some(dialog) = self.dialog.as_ref() else {
            return Err(DashboardError::validation("dialog", "no dialog is open"));
        };

        let form = dialog.form.clone().normalized();
        if let Err(errors) = form.validate() {
            let err = DashboardError::from(validation_error(&errors));
            self.error = Some(err.to_string());
            return Err(err);
        }
        if !form.is_submittable() {
            let err = DashboardError::validation("form", "required fields are incomplete");
            self.error = Some(err.to_string());
            return Err(err);
        }

        let result = match &dialog.mode {
            DialogMode::Create => self.endpoint.create(&form).await,
            DialogMode::Edit(id) => self.endpoint.update(id, &form).await,
        };

        match result {
            Ok(saved) => {
                info!(kind = E::KIND, id = saved.id(), "Saved");
                self.dialog = None;
                self.error = None;
                self.load().await;
                Ok(saved)
            }
            Err(e) => {
                warn!(kind = E::KIND, error = %e, "Save failed");
                self.error = Some(format!("Failed to save {}: {e}", E::KIND));
                Err(e.into())
            }
        }
    }

    /// Delete a row and re-fetch the list
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request; the banner is set.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        match self.endpoint.delete(id).await {
            Ok(()) => {
                info!(kind = E::KIND, id, "Deleted");
                self.load().await;
                Ok(())
            }
            Err(e) => {
                warn!(kind = E::KIND, id, error = %e, "Delete failed");
                self.error = Some(format!("Failed to delete {}: {e}", E::KIND));
                Err(e.into())
            }
        }
    }

    /// Close the dialog and drop its buffer
    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Inline error banner
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Dismiss the banner
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pulseboard_client::FixtureSource;
    use pulseboard_core::types::{CommunicationType, FieldDefinition, FieldType};

    fn controller(source: &Arc<FixtureSource>) -> CrudController<CommunicationType> {
        CrudController::new(source.clone())
    }

    #[tokio::test]
    async fn test_create_normalizes_and_refetches() {
        let source = Arc::new(FixtureSource::new());
        let mut types = controller(&source);
        types.load().await;
        let before = types.items().len();

        types.open_create();
        assert!(!types.can_submit());

        let form = types.form_mut().unwrap();
        form.name = "Service Ticket".to_string();
        form.display_name = "Service ticket".to_string();
        assert!(types.can_submit());

        let saved = types.save().await.unwrap();
        assert_eq!(saved.name, "service_ticket");
        assert!(types.dialog().is_none());
        assert_eq!(types.items().len(), before + 1);
        assert!(types.items().iter().any(|t| t.name == "service_ticket"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_dialog_and_buffer() {
        let source = Arc::new(FixtureSource::new());
        let mut types = controller(&source);
        types.open_create();
        {
            let form = types.form_mut().unwrap();
            form.name = "push".to_string();
            form.display_name = "Push".to_string();
        }

        source.set_available(false);
        assert!(types.save().await.is_err());
        assert!(types.error().is_some());
        assert_eq!(types.form().unwrap().name, "push");

        source.set_available(true);
        types.dismiss_error();
        types.save().await.unwrap();
        assert!(types.error().is_none());
    }

    #[tokio::test]
    async fn test_validation_failure_sets_banner() {
        let source = Arc::new(FixtureSource::new());
        let mut types = controller(&source);
        types.open_create();
        types.form_mut().unwrap().display_name = "No name".to_string();

        let err = types.save().await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation { ref field, .. } if field == "name"));
        assert!(types.dialog().is_some());
    }

    #[tokio::test]
    async fn test_edit_seeds_buffer_and_updates() {
        let source = Arc::new(FixtureSource::new());
        let mut types = controller(&source);
        types.load().await;

        types.open_edit("ct-sms").unwrap();
        assert_eq!(types.form().unwrap().display_name, "SMS");
        types.form_mut().unwrap().display_name = "Text message".to_string();
        types.save().await.unwrap();

        let sms = types.items().iter().find(|t| t.id == "ct-sms").unwrap();
        assert_eq!(sms.display_name, "Text message");
        assert!(types.open_edit("missing").is_err());
    }

    #[tokio::test]
    async fn test_delete_refetches() {
        let source = Arc::new(FixtureSource::new());
        let mut types = controller(&source);
        types.load().await;

        types.delete("ct-email").await.unwrap();
        assert!(types.items().iter().all(|t| t.id != "ct-email"));
        assert!(types.delete("ct-email").await.is_err());
        assert!(types.error().is_some());
    }

    #[tokio::test]
    async fn test_select_without_options_is_not_sent() {
        let source = Arc::new(FixtureSource::new());
        let mut fields: CrudController<FieldDefinition> = CrudController::new(source.clone());
        fields.load().await;
        let before = fields.items().len();

        fields.open_create();
        {
            let form = fields.form_mut().unwrap();
            form.name = "priority".to_string();
            form.label = "Priority".to_string();
            form.field_type = FieldType::Select;
            form.options = vec![" ".to_string()];
        }
        assert!(!fields.can_submit());

        let err = fields.save().await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation { .. }));
        assert!(fields.dialog().is_some());
        assert!(fields.error().is_some());

        fields.close_dialog();
        fields.load().await;
        assert_eq!(fields.items().len(), before);
    }
}
