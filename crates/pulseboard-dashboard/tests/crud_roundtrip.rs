//! Integration tests for the configuration dialogs against the fixture backend
#![forbid(unsafe_code)]
#![allow(clippy::unwrap_used)]

mod common;

use common::*;
use pretty_assertions::assert_eq;
use pulseboard_client::FixtureSource;
use pulseboard_core::types::CommunicationType;
use pulseboard_dashboard::{CommsConfigView, CrudController, DashboardError, DialogMode};
use rstest::rstest;
use std::sync::Arc;

fn controller() -> (Arc<FixtureSource>, CrudController<CommunicationType>) {
    let source = Arc::new(FixtureSource::new());
    (source.clone(), CrudController::new(source))
}

#[rstest]
#[case("Service Ticket", "service_ticket")]
#[case("  Push Notification ", "push_notification")]
#[case("webhook", "webhook")]
#[tokio::test]
async fn test_created_entity_is_listed_with_normalized_name(
    #[case] typed: &str,
    #[case] expected: &str,
) {
    init_test_logging();
    let (_, mut types) = controller();
    types.load().await;

    types.open_create();
    let form = types.form_mut().unwrap();
    form.name = typed.to_string();
    form.display_name = "Display".to_string();
    form.description = Some("Created in test".to_string());
    form.sort_order = 7;
    form.enabled = true;

    let saved = types.save().await.unwrap();
    let listed = types.items().iter().find(|t| t.id == saved.id).unwrap();

    assert_eq!(listed.name, expected);
    assert_eq!(listed.display_name, "Display");
    assert_eq!(listed.description.as_deref(), Some("Created in test"));
    assert_eq!(listed.sort_order, 7);
    assert!(listed.enabled);
    assert!(types.dialog().is_none());
}

#[tokio::test]
async fn test_edit_dialog_is_seeded_and_updates_row() {
    let (_, mut types) = controller();
    types.load().await;

    types.open_edit("ct-sms").unwrap();
    assert_eq!(
        types.dialog().map(|d| d.mode.clone()),
        Some(DialogMode::Edit("ct-sms".to_string()))
    );
    assert_eq!(types.form().unwrap().name, "sms");

    types.form_mut().unwrap().display_name = "Text message".to_string();
    types.save().await.unwrap();

    let row = types.items().iter().find(|t| t.id == "ct-sms").unwrap();
    assert_eq!(row.display_name, "Text message");
    assert_eq!(types.items().len(), 2);
}

#[tokio::test]
async fn test_failed_save_keeps_dialog_for_retry() {
    let (source, mut types) = controller();
    types.load().await;

    types.open_create();
    let form = types.form_mut().unwrap();
    form.name = "Fax".to_string();
    form.display_name = "Fax".to_string();

    source.set_available(false);
    assert!(types.save().await.is_err());
    assert!(types.error().is_some());
    assert_eq!(types.form().unwrap().name, "Fax");

    // Retry without re-entering data
    source.set_available(true);
    types.dismiss_error();
    let saved = types.save().await.unwrap();
    assert_eq!(saved.name, "fax");
    assert_eq!(types.items().len(), 3);
}

#[tokio::test]
async fn test_empty_form_cannot_submit() {
    let (_, mut types) = controller();
    types.open_create();
    assert!(!types.can_submit());

    let err = types.save().await.unwrap_err();
    assert!(matches!(err, DashboardError::Validation { .. }));
    assert!(types.dialog().is_some());
}

#[tokio::test]
async fn test_delete_type_and_field() {
    let source = Arc::new(FixtureSource::new());
    let mut view = CommsConfigView::new(source.clone(), source);
    view.load_all().await;

    view.fields.delete("fd-priority").await.unwrap();
    assert!(view.fields_for("ct-email").is_empty());

    view.types.delete("ct-sms").await.unwrap();
    assert_eq!(view.types.items().len(), 1);

    assert!(view.types.delete("ct-sms").await.is_err());
    assert!(view.types.error().is_some());
}
