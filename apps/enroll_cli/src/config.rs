use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::warn;

pub const CONFIG_FILE: &str = "enroll.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub identity_path: PathBuf,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            identity_path: default_identity_path(),
            request_timeout_seconds: 10,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Falls back to the working directory when the platform has no data dir.
pub fn default_identity_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("route_venture"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("identity.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the flat string table in `config_path`, then the environment.
pub fn load_settings_from(config_path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("server_url") {
                    settings.server_url = v.clone();
                }
                if let Some(v) = file_cfg.get("identity_path") {
                    settings.identity_path = PathBuf::from(v);
                }
                if let Some(v) = file_cfg.get("request_timeout_seconds") {
                    apply_timeout(&mut settings, v);
                }
            }
            Err(err) => warn!(path = %config_path.display(), "ignoring unreadable config: {err}"),
        }
    }

    if let Some(v) = env("ENROLL_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("ENROLL_IDENTITY_PATH") {
        settings.identity_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__IDENTITY_PATH") {
        settings.identity_path = PathBuf::from(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        apply_timeout(&mut settings, &v);
    }

    settings
}

fn apply_timeout(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => settings.request_timeout_seconds = seconds,
        _ => warn!("ignoring invalid request timeout '{raw}'"),
    }
}
