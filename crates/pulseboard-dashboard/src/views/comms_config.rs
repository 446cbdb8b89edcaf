//! Communication configuration screen: types and their custom fields

use crate::crud::CrudController;
use pulseboard_client::CrudEndpoint;
use pulseboard_core::types::{CommunicationType, FieldDefinition};
use std::sync::Arc;

/// The two CRUD tables of the communication configuration screen
#[derive(Debug)]
pub struct CommsConfigView {
    /// Communication types table
    pub types: CrudController<CommunicationType>,
    /// Field definitions table
    pub fields: CrudController<FieldDefinition>,
}

impl CommsConfigView {
    /// Build the screen over the two endpoints
    #[must_use]
    pub fn new(
        types: Arc<dyn CrudEndpoint<CommunicationType>>,
        fields: Arc<dyn CrudEndpoint<FieldDefinition>>,
    ) -> Self {
        Self {
            types: CrudController::new(types),
            fields: CrudController::new(fields),
        }
    }

    /// Load both tables concurrently; returns whether both loads succeeded
    pub async fn load_all(&mut self) -> bool {
        let (types, fields) = tokio::join!(self.types.load(), self.fields.load());
        types && fields
    }

    /// Fields attached to one communication type, in display order
    #[must_use]
    pub fn fields_for(&self, type_id: &str) -> Vec<&FieldDefinition> {
        let mut fields: Vec<_> = self
            .fields
            .items()
            .iter()
            .filter(|f| f.communication_type_id.as_deref() == Some(type_id))
            .collect();
        fields.sort_by_key(|f| f.sort_order);
        fields
    }

    /// Fields not attached to any type
    #[must_use]
    pub fn global_fields(&self) -> Vec<&FieldDefinition> {
        self.fields
            .items()
            .iter()
            .filter(|f| f.communication_type_id.is_none())
            .collect()
    }
}
