use ggforge_api::client::DEFAULT_API_URL;
use log::LevelFilter;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_url: String,
    /// Media paths are resolved against this; defaults to the API URL.
    pub media_url: Option<String>,
    /// The signed-in user. Without one, only admins can manage matches.
    pub user_id: Option<String>,
    pub is_admin: bool,
    /// JSON snapshot replacing the built-in sample data.
    pub fixtures_path: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_url: DEFAULT_API_URL.to_string(),
            media_url: None,
            user_id: None,
            is_admin: false,
            fixtures_path: None,
        }
    }
}

/// On-disk shape of `settings.json`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    full_screen: Option<bool>,
    log_level: Option<String>,
    api_url: Option<String>,
    media_url: Option<String>,
    user_id: Option<String>,
    is_admin: Option<bool>,
    fixtures: Option<String>,
}

impl AppSettings {
    /// Defaults, then the settings file, then `GGFORGE_*` environment variables.
    pub fn load() -> Self {
        let mut settings = Self::default();
        if let Some(path) = settings_path() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<SettingsFile>(&content) {
                    Ok(file) => settings.apply_file(file),
                    Err(e) => log::warn!("ignoring invalid settings file {}: {e}", path.display()),
                },
                Err(_) => log::debug!("no settings file at {}", path.display()),
            }
        }
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn media_base(&self) -> &str {
        self.media_url.as_deref().unwrap_or(&self.api_url)
    }

    fn apply_file(&mut self, file: SettingsFile) {
        if let Some(v) = file.full_screen {
            self.full_screen = v;
        }
        if let Some(level) = file.log_level.as_deref().and_then(parse_level) {
            self.log_level = Some(level);
        }
        if let Some(v) = file.api_url {
            self.api_url = v;
        }
        self.media_url = file.media_url.or(self.media_url.take());
        self.user_id = file.user_id.or(self.user_id.take());
        if let Some(v) = file.is_admin {
            self.is_admin = v;
        }
        self.fixtures_path = file.fixtures.or(self.fixtures_path.take());
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(v) = var("GGFORGE_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = var("GGFORGE_MEDIA_URL") {
            self.media_url = Some(v);
        }
        if let Some(v) = var("GGFORGE_USER_ID") {
            self.user_id = Some(v);
        }
        if let Some(v) = var("GGFORGE_ADMIN") {
            self.is_admin = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Some(level) = var("GGFORGE_LOG").as_deref().and_then(parse_level) {
            self.log_level = Some(level);
        }
        if let Some(v) = var("GGFORGE_FIXTURES") {
            self.fixtures_path = Some(v);
        }
    }
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    s.trim().parse().ok()
}

/// `settings.json` under the platform config dir (`$XDG_CONFIG_HOME/ggforge` on Linux).
fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ggforge").join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn file_then_env_override_defaults() {
        let mut settings = AppSettings::default();
        let file: SettingsFile = serde_json::from_str(
            r#"{"api_url": "http://file/api", "user_id": "u-1", "log_level": "debug", "is_admin": true}"#,
        )
        .unwrap();
        settings.apply_file(file);
        assert_eq!(settings.api_url, "http://file/api");
        assert_eq!(settings.media_base(), "http://file/api");
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
        assert!(settings.is_admin);

        let env: HashMap<&str, &str> = HashMap::from([
            ("GGFORGE_API_URL", "http://env/api"),
            ("GGFORGE_MEDIA_URL", "http://cdn"),
            ("GGFORGE_ADMIN", "0"),
            ("GGFORGE_LOG", "nonsense"),
            ("GGFORGE_USER_ID", "  "),
        ]);
        settings.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.api_url, "http://env/api");
        assert_eq!(settings.media_base(), "http://cdn");
        assert!(!settings.is_admin);
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
        assert_eq!(settings.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn settings_file_lives_under_the_config_dir() {
        let Some(config_dir) = dirs::config_dir() else {
            assert!(settings_path().is_none());
            return;
        };
        let path = settings_path().unwrap();
        assert!(path.starts_with(&config_dir));
        assert!(path.ends_with("ggforge/settings.json"));
    }
}
