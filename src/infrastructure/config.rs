//! Client configuration read from the environment

use di::inject;
use di::injectable;
use log::warn;
use reqwest::Url;
use std::env;
use std::str::FromStr;

pub const SERVICE_URL_VAR: &str = "CHAT_SERVICE_URL";
pub const PENDING_REMOVAL_VAR: &str = "PENDING_REMOVAL";
pub const INTAKE_ROUTE_VAR: &str = "INTAKE_ROUTE";

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

/// How a resolved request locates the placeholder it has to retract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingRemoval {
    /// Remove the placeholder created by the same request.
    #[default]
    ByHandle,
    /// Remove whatever bot entry is newest. Overlapping requests can retract each other's
    /// placeholders (or a finished reply) in this mode.
    LastBotEntry,
}

impl FromStr for PendingRemoval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "handle" => Ok(PendingRemoval::ByHandle),
            "last-bot" => Ok(PendingRemoval::LastBotEntry),
            other => Err(format!("unknown pending removal policy `{other}`")),
        }
    }
}

/// Where a validated intake form is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakeRoute {
    /// Generated prompt through the chat endpoint.
    #[default]
    Chat,
    /// Raw form fields to the deprecated `/bazi` endpoint.
    LegacyBazi,
}

impl FromStr for IntakeRoute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(IntakeRoute::Chat),
            "bazi" => Ok(IntakeRoute::LegacyBazi),
            other => Err(format!("unknown intake route `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash.
    pub service_url: String,
    pub pending_removal: PendingRemoval,
    pub intake_route: IntakeRoute,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            service_url: DEFAULT_SERVICE_URL.to_owned(),
            pending_removal: PendingRemoval::default(),
            intake_route: IntakeRoute::default(),
        }
    }
}

#[injectable]
impl ClientConfig {
    #[inject]
    pub fn from_env() -> ClientConfig {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }
}

impl ClientConfig {
    /// Builds the configuration from a variable lookup. Bad values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientConfig {
        let mut config = ClientConfig::default();

        if let Some(url) = lookup(SERVICE_URL_VAR) {
            match Url::parse(url.trim()) {
                Ok(_) => config.service_url = url.trim().trim_end_matches('/').to_owned(),
                Err(e) => warn!("ignoring {SERVICE_URL_VAR}={url:?}: {e}"),
            }
        }

        if let Some(value) = lookup(PENDING_REMOVAL_VAR) {
            match value.parse::<PendingRemoval>() {
                Ok(policy) => config.pending_removal = policy,
                Err(e) => warn!("ignoring {PENDING_REMOVAL_VAR}: {e}"),
            }
        }

        if let Some(value) = lookup(INTAKE_ROUTE_VAR) {
            match value.parse::<IntakeRoute>() {
                Ok(route) => config.intake_route = route,
                Err(e) => warn!("ignoring {INTAKE_ROUTE_VAR}: {e}"),
            }
        }

        config
    }

    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = service_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.service_url, path)
    }
}
