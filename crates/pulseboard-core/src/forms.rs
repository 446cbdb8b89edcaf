//! Form buffers backing the add/edit dialogs of the configuration screens
//!
//! A form is seeded either empty ([`Default`]) or from an existing row
//! ([`CrudEntity::to_form`]), edited in place, then normalized and validated on save.

use crate::error::Error;
use crate::types::{CommunicationType, EntityId, FieldDefinition, FieldType, UserProfile};
use crate::utils::normalize_name;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use validator::{Validate, ValidationErrors};

/// An editable buffer for one entity
pub trait EntityForm: Clone + Default + Validate + Serialize + Send + Sync + 'static {
    /// Apply the client-side normalization rules
    #[must_use]
    fn normalized(self) -> Self;

    /// Whether the submit button should be enabled (required fields filled)
    fn is_submittable(&self) -> bool;
}

/// An entity that is listed, created, edited and deleted through a dialog
pub trait CrudEntity: Clone + Send + Sync + 'static {
    /// Form buffer type for the add/edit dialog
    type Form: EntityForm;

    /// Human readable kind, used in logs and errors
    const KIND: &'static str;

    /// Backend identifier
    fn id(&self) -> &str;

    /// Seed an edit buffer from this row
    fn to_form(&self) -> Self::Form;
}

/// Convert validator output into the first failing field
#[must_use]
pub fn validation_error(errors: &ValidationErrors) -> Error {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields.into_iter().next().map_or_else(
        || Error::validation("form", "invalid input"),
        |(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref().map(ToString::to_string))
                .or_else(|| errs.first().map(|e| e.code.to_string()))
                .unwrap_or_else(|| "invalid value".to_string());
            Error::validation(field.to_string(), message)
        },
    )
}

/// Buffer for the communication type dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationTypeForm {
    /// Machine name
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    /// Label shown in lists
    #[validate(length(min = 1, max = 128))]
    pub display_name: String,
    /// Longer description
    #[validate(length(max = 1024))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Icon name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Accent color
    #[validate(length(max = 32))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Position in lists
    pub sort_order: i32,
    /// Whether the type is offered to users
    pub enabled: bool,
}

impl EntityForm for CommunicationTypeForm {
    fn normalized(mut self) -> Self {
        self.name = normalize_name(&self.name);
        self.display_name = self.display_name.trim().to_string();
        self.description = non_blank(self.description);
        self.icon = non_blank(self.icon);
        self.color = non_blank(self.color);
        self
    }

    fn is_submittable(&self) -> bool {
        !self.name.trim().is_empty() && !self.display_name.trim().is_empty()
    }
}

impl CrudEntity for CommunicationType {
    type Form = CommunicationTypeForm;

    const KIND: &'static str = "communication type";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_form(&self) -> Self::Form {
        CommunicationTypeForm {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            color: self.color.clone(),
            sort_order: self.sort_order,
            enabled: self.enabled,
        }
    }
}

impl CommunicationTypeForm {
    /// Materialize the form into an entity with the given id
    #[must_use]
    pub fn into_entity(self, id: EntityId) -> CommunicationType {
        CommunicationType {
            id,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            icon: self.icon,
            color: self.color,
            sort_order: self.sort_order,
            enabled: self.enabled,
        }
    }
}

/// Buffer for the field definition dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinitionForm {
    /// Owning communication type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_type_id: Option<EntityId>,
    /// Machine name
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    /// Label shown in forms
    #[validate(length(min = 1, max = 128))]
    pub label: String,
    /// Input kind
    pub field_type: FieldType,
    /// Whether a value is mandatory
    pub required: bool,
    /// Position in forms
    pub sort_order: i32,
    /// Choices for select fields
    pub options: Vec<String>,
}

impl EntityForm for FieldDefinitionForm {
    fn normalized(mut self) -> Self {
        self.name = normalize_name(&self.name);
        self.label = self.label.trim().to_string();
        self.communication_type_id = non_blank(self.communication_type_id);
        self.options = self
            .options
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if self.field_type != FieldType::Select {
            self.options.clear();
        }
        self
    }

    fn is_submittable(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.label.trim().is_empty()
            && (self.field_type != FieldType::Select
                || self.options.iter().any(|o| !o.trim().is_empty()))
    }
}

impl CrudEntity for FieldDefinition {
    type Form = FieldDefinitionForm;

    const KIND: &'static str = "field definition";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_form(&self) -> Self::Form {
        FieldDefinitionForm {
            communication_type_id: self.communication_type_id.clone(),
            name: self.name.clone(),
            label: self.label.clone(),
            field_type: self.field_type,
            required: self.required,
            sort_order: self.sort_order,
            options: self.options.clone(),
        }
    }
}

impl FieldDefinitionForm {
    /// Materialize the form into an entity with the given id
    #[must_use]
    pub fn into_entity(self, id: EntityId) -> FieldDefinition {
        FieldDefinition {
            id,
            communication_type_id: self.communication_type_id,
            name: self.name,
            label: self.label,
            field_type: self.field_type,
            required: self.required,
            sort_order: self.sort_order,
            options: self.options,
        }
    }
}

/// Buffer for the profile form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    /// Business role
    #[validate(length(min = 1, max = 64))]
    pub role: String,
    /// Areas the user cares about
    #[validate(length(max = 16))]
    pub focus_areas: Vec<String>,
    /// Free-form display preferences
    pub preferences: BTreeMap<String, String>,
}

impl EntityForm for ProfileForm {
    fn normalized(mut self) -> Self {
        self.role = self.role.trim().to_string();
        let mut seen = HashSet::new();
        self.focus_areas = self
            .focus_areas
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty() && seen.insert(a.clone()))
            .collect();
        self
    }

    fn is_submittable(&self) -> bool {
        !self.role.trim().is_empty()
    }
}

impl From<&UserProfile> for ProfileForm {
    fn from(profile: &UserProfile) -> Self {
        Self {
            role: profile.role.clone(),
            focus_areas: profile.focus_areas.clone(),
            preferences: profile.preferences.clone(),
        }
    }
}

impl From<ProfileForm> for UserProfile {
    fn from(form: ProfileForm) -> Self {
        Self {
            role: form.role,
            focus_areas: form.focus_areas,
            preferences: form.preferences,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
