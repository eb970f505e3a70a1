use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://taskhub-s37f.onrender.com/auth/signup";
pub const DEFAULT_SETTINGS_FILE: &str = "signup.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessages {
    pub success: String,
    pub error_prefix: String,
    pub transport_failure: String,
    pub missing_error_detail: String,
    pub idle_label: String,
    pub loading_label: String,
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self {
            success: "Cadastro Concluído com Sucesso!".into(),
            error_prefix: "Erro: ".into(),
            transport_failure: "Erro na solicitação.".into(),
            missing_error_detail: "erro desconhecido".into(),
            idle_label: "Entrar".into(),
            loading_label: "Carregando...".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignupSettings {
    pub endpoint: Url,
    pub request_timeout_secs: Option<u64>,
    pub messages: StatusMessages,
}

impl Default for SignupSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: None,
            messages: StatusMessages::default(),
        }
    }
}

impl SignupSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Overrides the endpoint, keeping the current one when `raw` is not a valid URL.
    pub fn set_endpoint(&mut self, raw: &str) -> bool {
        match parse_endpoint(raw) {
            Some(url) => {
                self.endpoint = url;
                true
            }
            None => {
                warn!(endpoint = raw, "ignoring invalid signup endpoint");
                false
            }
        }
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).unwrap_or_else(|_| unreachable!("default endpoint is a valid url"))
}

fn parse_endpoint(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

pub fn load_settings() -> SignupSettings {
    let mut settings = SignupSettings::default();

    if let Ok(raw) = fs::read_to_string(DEFAULT_SETTINGS_FILE) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => apply_file_values(&mut settings, &file_cfg),
            Err(err) => warn!("ignoring malformed {DEFAULT_SETTINGS_FILE}: {err}"),
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Loads settings from an explicit file. Unlike [`load_settings`], a missing or
/// malformed file is an error.
pub fn load_settings_from(path: &Path) -> Result<SignupSettings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(&raw).map_err(|source| {
        SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut settings = SignupSettings::default();
    apply_file_values(&mut settings, &file_cfg);
    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file_values(settings: &mut SignupSettings, file_cfg: &HashMap<String, toml::Value>) {
    let text = |key: &str| file_cfg.get(key).and_then(|v| v.as_str()).map(str::to_string);

    if let Some(v) = text("endpoint") {
        settings.set_endpoint(&v);
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        match v.as_integer().and_then(|secs| u64::try_from(secs).ok()) {
            Some(secs) => settings.request_timeout_secs = Some(secs),
            None => warn!("ignoring invalid request_timeout_secs: {v}"),
        }
    }

    let messages = &mut settings.messages;
    if let Some(v) = text("success_message") {
        messages.success = v;
    }
    if let Some(v) = text("error_prefix") {
        messages.error_prefix = v;
    }
    if let Some(v) = text("transport_failure_message") {
        messages.transport_failure = v;
    }
    if let Some(v) = text("missing_error_detail") {
        messages.missing_error_detail = v;
    }
    if let Some(v) = text("idle_label") {
        messages.idle_label = v;
    }
    if let Some(v) = text("loading_label") {
        messages.loading_label = v;
    }
}

fn apply_env(settings: &mut SignupSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SIGNUP_ENDPOINT") {
        settings.set_endpoint(&v);
    }
    if let Some(v) = var("APP__ENDPOINT") {
        settings.set_endpoint(&v);
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(err) => warn!("ignoring invalid APP__REQUEST_TIMEOUT_SECS '{v}': {err}"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
