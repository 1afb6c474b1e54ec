use std::env;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

pub const DEFAULT_USER_AGENT: &str = "astronomy-seeing-app/1.0";
pub const DEFAULT_LOCATION_ID: &str = "peristeri";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub refresh_interval_minutes: u64,
    pub default_location: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            refresh_interval_minutes: env::var("REFRESH_INTERVAL_MINUTES")
                .unwrap_or_else(|_| "1440".to_string())
                .parse()
                .unwrap_or(1440),
            default_location: env::var("DEFAULT_LOCATION")
                .unwrap_or_else(|_| DEFAULT_LOCATION_ID.to_string()),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Built-in location registry with this config's default location applied
    pub fn locations(&self) -> Locations {
        Locations::builtin().with_default(&self.default_location)
    }
}

/// A forecast location: where its page lives and which zone its hours are in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub url: String,
    pub timezone: String,
}

impl Location {
    pub fn new(id: &str, name: &str, url: &str, timezone: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            timezone: timezone.to_string(),
        }
    }
}

/// Static lookup of configured locations.
///
/// Resolution is total: an unknown or missing id resolves to the default
/// location, so callers always get a location back.
#[derive(Debug, Clone)]
pub struct Locations {
    entries: Vec<Location>,
    default_id: String,
}

impl Locations {
    /// Build a registry. Fails when `entries` is empty or `default_id` is not
    /// one of them, since resolution could not be total otherwise.
    pub fn new(entries: Vec<Location>, default_id: &str) -> Option<Self> {
        if !entries.iter().any(|l| l.id == default_id) {
            return None;
        }
        Some(Self {
            entries,
            default_id: default_id.to_string(),
        })
    }

    pub fn builtin() -> Self {
        let entries = vec![
            Location::new(
                "peristeri",
                "Peristeri, Greece",
                "https://www.meteoblue.com/en/weather/outdoorsports/seeing/peristeri_greece_255524",
                "Europe/Athens",
            ),
            Location::new(
                "piraeus",
                "Piraeus, Greece",
                "https://www.meteoblue.com/en/weather/outdoorsports/seeing/piraeus_greece_255274",
                "Europe/Athens",
            ),
            Location::new(
                "glyfada",
                "Glyfada, Greece",
                "https://www.meteoblue.com/en/weather/outdoorsports/seeing/glyfada_greece_262036",
                "Europe/Athens",
            ),
            Location::new(
                "ekkara",
                "Ekkara, Greece",
                "https://www.meteoblue.com/en/weather/outdoorsports/seeing/ekkara_greece_262828",
                "Europe/Athens",
            ),
        ];
        Self {
            entries,
            default_id: DEFAULT_LOCATION_ID.to_string(),
        }
    }

    /// Switch the default location, keeping the current one if `id` is unknown
    pub fn with_default(mut self, id: &str) -> Self {
        if self.get(id).is_some() {
            self.default_id = id.to_string();
        } else {
            warn!(
                "Configured default location '{}' is unknown, keeping '{}'",
                id, self.default_id
            );
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.entries.iter().find(|l| l.id == id)
    }

    pub fn default_location(&self) -> &Location {
        // Constructors guarantee the default id is present
        self.get(&self.default_id).unwrap_or(&self.entries[0])
    }

    pub fn resolve(&self, id: Option<&str>) -> &Location {
        match id {
            Some(id) => self.get(id).unwrap_or_else(|| {
                warn!("Unknown location '{}', using default '{}'", id, self.default_id);
                self.default_location()
            }),
            None => self.default_location(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.entries.iter()
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }
}
