use secrecy::{ExposeSecret, SecretString};
use shared::{
    domain::{FormField, SubmissionId},
    protocol::SignupRequest,
};

use crate::config::StatusMessages;

const PASSWORD_MASK: char = '•';

#[derive(Debug, Clone)]
pub struct FormState {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub password_visible: bool,
    pub submitting: bool,
    pub status_message: String,
    pub last_submission: Option<SubmissionId>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: SecretString::new(String::new()),
            password_visible: false,
            submitting: false,
            status_message: String::new(),
            last_submission: None,
        }
    }
}

impl FormState {
    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Email => self.email = value,
            FormField::Password => self.password = SecretString::new(value),
        }
    }

    pub fn toggle_visibility(&mut self) -> bool {
        self.password_visible = !self.password_visible;
        self.password_visible
    }

    pub fn snapshot(&self) -> SignupRequest {
        SignupRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }

    pub fn view(&self, messages: &StatusMessages) -> FormView {
        let password = self.password.expose_secret();
        let password_display = if self.password_visible {
            password.clone()
        } else {
            password.chars().map(|_| PASSWORD_MASK).collect()
        };
        let submit_label = if self.submitting {
            messages.loading_label.clone()
        } else {
            messages.idle_label.clone()
        };

        FormView {
            name: self.name.clone(),
            email: self.email.clone(),
            password_display,
            password_visible: self.password_visible,
            submit_enabled: !self.submitting,
            submit_label,
            status_message: (!self.status_message.is_empty()).then(|| self.status_message.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub name: String,
    pub email: String,
    pub password_display: String,
    pub password_visible: bool,
    pub submit_enabled: bool,
    pub submit_label: String,
    pub status_message: Option<String>,
}
