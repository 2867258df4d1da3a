//! Registration form: validate → insert → reset

use crate::collection::{CollectionConfig, default_form};
use crate::notify::{Notification, Notifier};
use crate::store::RemoteStore;
use crate::types::Fields;

use super::error::ListError;

pub struct RegistrationForm<S, N> {
    config: CollectionConfig,
    store: S,
    notifier: N,
    form: Fields,
}

impl<S: RemoteStore, N: Notifier> RegistrationForm<S, N> {
    pub fn new(config: CollectionConfig, store: S, notifier: N) -> Self {
        let form = default_form(&config);
        Self {
            config,
            store,
            notifier,
            form,
        }
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn form(&self) -> &Fields {
        &self.form
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.form.insert(name.to_string(), value.into());
    }

    /// Replace the form contents and submit them
    pub async fn submit_new(&mut self, fields: Fields) -> Result<Fields, ListError> {
        self.form = fields;
        self.submit().await
    }

    /// Validate and insert the current form, returning the record as stored.
    ///
    /// On success the form is reset to its defaults; on failure it is kept so
    /// the user can correct it.
    pub async fn submit(&mut self) -> Result<Fields, ListError> {
        let normalized = match self.config.schema.validate(&self.form) {
            Ok(normalized) => normalized,
            Err(message) => {
                self.notifier
                    .notify(Notification::destructive("Validation Error", message.clone()));
                return Err(ListError::Validation(message));
            }
        };

        if let Err(e) = self.store.insert(&normalized).await {
            tracing::warn!(table = self.config.table, "insert failed: {e}");
            self.notifier.notify(Notification::destructive(
                "Registration Failed",
                "Please try again later.",
            ));
            return Err(ListError::Remote(e.to_string()));
        }

        let name = format!(
            "{} {}",
            normalized.get("first_name").map(String::as_str).unwrap_or(""),
            normalized.get("last_name").map(String::as_str).unwrap_or(""),
        );
        self.notifier.notify(Notification::info(
            format!("{} Registered Successfully", self.config.title_noun()),
            format!("{} {}", name.trim(), self.config.registered_suffix),
        ));
        self.form = default_form(&self.config);
        Ok(normalized)
    }
}
