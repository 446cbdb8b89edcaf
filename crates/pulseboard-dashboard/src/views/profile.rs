//! Profile editor
//!
//! The profile is fetched once into a form buffer. Saving sends a PUT when the backend
//! already holds a profile and a POST otherwise, then mirrors the saved profile into
//! the local settings snapshot.

use crate::error::{DashboardError, Result};
use crate::settings::{PROFILE_KEY, SettingsStore};
use pulseboard_client::ProfileSource;
use pulseboard_core::forms::{EntityForm, ProfileForm, validation_error};
use pulseboard_core::types::UserProfile;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

/// Form state for the signed-in user's profile
pub struct ProfileEditor {
    source: Arc<dyn ProfileSource>,
    settings: SettingsStore,
    profile: Option<UserProfile>,
    form: ProfileForm,
    loaded: bool,
    error: Option<String>,
}

impl fmt::Debug for ProfileEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileEditor")
            .field("profile", &self.profile)
            .field("loaded", &self.loaded)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl ProfileEditor {
    /// Editor over a profile source and a settings snapshot
    #[must_use]
    pub fn new(source: Arc<dyn ProfileSource>, settings: SettingsStore) -> Self {
        Self {
            source,
            settings,
            profile: None,
            form: ProfileForm::default(),
            loaded: false,
            error: None,
        }
    }

    /// Fetch the profile and seed the form buffer
    ///
    /// When the backend is unreachable the buffer is seeded from the last profile
    /// mirrored into the settings snapshot, and the banner is set.
    pub async fn load(&mut self) -> bool {
        match self.source.get_profile().await {
            Ok(profile) => {
                self.form = profile.as_ref().map(ProfileForm::from).unwrap_or_default();
                self.profile = profile;
                self.loaded = true;
                self.error = None;
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to load profile");
                if let Some(cached) = self.settings.get::<UserProfile>(PROFILE_KEY) {
                    self.form = ProfileForm::from(&cached);
                }
                self.error = Some(format!("Failed to load profile: {e}"));
                false
            }
        }
    }

    /// Whether the backend holds a profile
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.profile.is_some()
    }

    /// Profile as last fetched or saved
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Form buffer
    #[must_use]
    pub const fn form(&self) -> &ProfileForm {
        &self.form
    }

    /// Mutable form buffer
    pub const fn form_mut(&mut self) -> &mut ProfileForm {
        &mut self.form
    }

    /// Whether the save button is enabled
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.form.is_submittable()
    }

    /// Settings snapshot the profile is mirrored into
    #[must_use]
    pub const fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Save the buffer
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer fails validation, the backend cannot say whether
    /// a profile exists, or it rejects the request; the banner carries the same message
    /// and the buffer is kept.
    pub async fn save(&mut self) -> Result<UserProfile> {
        let form = self.form.clone().normalized();
        if let Err(errors) = form.validate() {
            let err = DashboardError::from(validation_error(&errors));
            self.error = Some(err.to_string());
            return Err(err);
        }

        // After a failed load the backend state is unknown; ask again before choosing
        if !self.loaded {
            match self.source.get_profile().await {
                Ok(profile) => {
                    self.profile = profile;
                    self.loaded = true;
                }
                Err(e) => {
                    warn!(error = %e, "Profile still unavailable, save skipped");
                    self.error = Some(format!("Failed to save profile: {e}"));
                    return Err(e.into());
                }
            }
        }

        let result = if self.exists() {
            self.source.update_profile(&form).await
        } else {
            self.source.create_profile(&form).await
        };

        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "Profile save failed");
                self.error = Some(format!("Failed to save profile: {e}"));
                return Err(e.into());
            }
        };

        info!(role = %saved.role, "Profile saved");
        self.form = ProfileForm::from(&saved);
        self.profile = Some(saved.clone());
        self.error = None;
        self.mirror(&saved).await;
        Ok(saved)
    }

    /// Copy the saved profile into the settings snapshot; failures are only logged
    async fn mirror(&mut self, profile: &UserProfile) {
        if let Err(e) = self.settings.set(PROFILE_KEY, profile) {
            warn!(error = %e, "Failed to encode profile for settings snapshot");
            return;
        }
        if let Err(e) = self.settings.save().await {
            warn!(error = %e, "Failed to write settings snapshot");
        }
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
