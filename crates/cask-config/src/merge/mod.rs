//! Configuration discovery, layering and environment overrides

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use cask_core::{CaskError, ContentConfig, Platform};
use tracing::debug;

use crate::toml::{validate_max_fanout, CaskToml};
use crate::ConfigResult;

/// Project configuration file name
pub const CONFIG_FILE: &str = "cask.toml";

pub const ENV_STORE: &str = "CASK_STORE";
pub const ENV_PLATFORM: &str = "CASK_PLATFORM";
pub const ENV_MAX_FANOUT: &str = "CASK_MAX_FANOUT";

/// Finds and reads configuration files
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// `~/.cask/config.toml`, when a home directory exists
    global_path: Option<Utf8PathBuf>,
}

/// Where the file layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line
    Explicit(Utf8PathBuf),
    /// cask.toml in the working directory or one of its parents
    Project(Utf8PathBuf),
    /// Global config file
    Global(Utf8PathBuf),
    /// No file found
    Defaults,
}

/// Fully layered settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub store_root: Utf8PathBuf,
    pub content: ContentConfig,
    pub source: ConfigSource,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        let global_path = dirs::home_dir()
            .and_then(|home| Utf8PathBuf::try_from(home).ok())
            .map(|home| home.join(".cask").join("config.toml"));
        Self { cwd, global_path }
    }

    /// Loader rooted at the process working directory
    pub fn from_current_dir() -> ConfigResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| CaskError::io("Failed to read current directory", e))?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| CaskError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("Working directory is not valid UTF-8: {}", e),
        })?;
        Ok(Self::new(cwd))
    }

    /// Override the global config location
    pub fn with_global_path(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    /// Find cask.toml by walking up from the working directory
    pub fn find_project_config(&self) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// Load the file layer: an explicit path if given, else the nearest
    /// project file, else the global file, else defaults.
    pub async fn load(&self, explicit: Option<&Utf8Path>) -> ConfigResult<(CaskToml, ConfigSource)> {
        if let Some(path) = explicit {
            let config = crate::toml::load_from_file(path).await?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        if let Some(path) = self.find_project_config() {
            debug!(path = %path, "using project config");
            let config = crate::toml::load_from_file(&path).await?;
            return Ok((config, ConfigSource::Project(path)));
        }

        if let Some(path) = self.global_path.as_ref().filter(|p| p.is_file()) {
            debug!(path = %path, "using global config");
            let config = crate::toml::load_from_file(path).await?;
            return Ok((config, ConfigSource::Global(path.clone())));
        }

        Ok((CaskToml::default(), ConfigSource::Defaults))
    }
}

/// Store root used when nothing else names one
pub fn default_store_root() -> ConfigResult<Utf8PathBuf> {
    let cache = dirs::cache_dir().ok_or_else(|| CaskError::ConfigValidation {
        field: "store.root".to_string(),
        reason: "Could not determine a cache directory; set CASK_STORE or --store".to_string(),
    })?;
    let cache = Utf8PathBuf::try_from(cache).map_err(|e| CaskError::ConfigValidation {
        field: "store.root".to_string(),
        reason: format!("Invalid cache directory path: {}", e),
    })?;
    Ok(cache.join("cask"))
}

/// Applies file < environment < command line
#[derive(Debug, Clone, Default)]
pub struct ConfigLayering {
    file: CaskToml,
    env_overrides: HashMap<String, String>,
    cli_overrides: HashMap<String, String>,
}

impl ConfigLayering {
    pub fn new(file: CaskToml) -> Self {
        Self {
            file,
            ..Self::default()
        }
    }

    pub fn with_env(mut self, env_overrides: HashMap<String, String>) -> Self {
        self.env_overrides = env_overrides;
        self
    }

    /// CLI keys are `store`, `platform` and `max-fanout`
    pub fn with_cli(mut self, cli_overrides: HashMap<String, String>) -> Self {
        self.cli_overrides = cli_overrides;
        self
    }

    /// Merge the layers and fill in defaults
    pub fn resolve(self, source: ConfigSource) -> ConfigResult<ResolvedConfig> {
        let mut merged = self.file;

        Self::apply_overrides(&mut merged, &self.env_overrides, ENV_STORE, ENV_PLATFORM, ENV_MAX_FANOUT)?;
        Self::apply_overrides(&mut merged, &self.cli_overrides, "store", "platform", "max-fanout")?;

        let content = merged.content.to_content_config()?;
        let store_root = match merged.store.root {
            Some(root) => root,
            None => default_store_root()?,
        };

        Ok(ResolvedConfig {
            store_root,
            content,
            source,
        })
    }

    fn apply_overrides(
        config: &mut CaskToml,
        overrides: &HashMap<String, String>,
        store_key: &str,
        platform_key: &str,
        fanout_key: &str,
    ) -> ConfigResult<()> {
        if let Some(root) = overrides.get(store_key) {
            config.store.root = Some(Utf8PathBuf::from(root));
        }
        if let Some(platform) = overrides.get(platform_key) {
            // Surface the bad value under the name the user typed
            platform.parse::<Platform>().map_err(|_| CaskError::ConfigValidation {
                field: platform_key.to_string(),
                reason: format!("unknown platform '{}', expected 'windows' or 'unix'", platform),
            })?;
            config.content.platform = Some(platform.clone());
        }
        if let Some(value) = overrides.get(fanout_key) {
            let max_fanout = value.trim().parse::<usize>().map_err(|e| CaskError::ConfigValidation {
                field: fanout_key.to_string(),
                reason: format!("invalid number '{}': {}", value, e),
            })?;
            validate_max_fanout(max_fanout)?;
            config.content.max_fanout = Some(max_fanout);
        }
        Ok(())
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars().filter(|(key, _)| key.starts_with("CASK_")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_temp() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, path)
    }

    fn file_with_root(root: &str) -> CaskToml {
        let mut config = CaskToml::default();
        config.store.root = Some(Utf8PathBuf::from(root));
        config
    }

    #[test]
    fn test_find_project_config_walks_up() {
        let (_guard, temp_path) = utf8_temp();
        let nested = temp_path.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_path.join(CONFIG_FILE), "").unwrap();

        let loader = ConfigLoader::new(nested);
        assert_eq!(loader.find_project_config(), Some(temp_path.join(CONFIG_FILE)));
    }

    #[tokio::test]
    async fn test_load_prefers_project_over_global() {
        let (_guard, temp_path) = utf8_temp();
        let global = temp_path.join("global.toml");
        std::fs::write(&global, "[store]\nroot = \"/global\"\n").unwrap();
        let project = temp_path.join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join(CONFIG_FILE), "[store]\nroot = \"/project\"\n").unwrap();

        let loader = ConfigLoader::new(project.clone()).with_global_path(Some(global.clone()));
        let (config, source) = loader.load(None).await.unwrap();
        assert_eq!(config.store.root.unwrap(), "/project");
        assert_eq!(source, ConfigSource::Project(project.join(CONFIG_FILE)));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_global() {
        let (_guard, temp_path) = utf8_temp();
        let global = temp_path.join("global.toml");
        std::fs::write(&global, "[content]\nmax-fanout = 3\n").unwrap();
        let project = temp_path.join("empty-project");
        std::fs::create_dir_all(&project).unwrap();

        let loader = ConfigLoader::new(project).with_global_path(Some(global.clone()));
        if loader.find_project_config().is_some() {
            // A cask.toml above the temp dir would shadow the global file
            return;
        }
        let (config, source) = loader.load(None).await.unwrap();
        assert_eq!(config.content.max_fanout, Some(3));
        assert_eq!(source, ConfigSource::Global(global));
    }

    #[tokio::test]
    async fn test_explicit_path_wins_and_must_exist() {
        let (_guard, temp_path) = utf8_temp();
        let explicit = temp_path.join("custom.toml");
        std::fs::write(&explicit, "[content]\nplatform = \"unix\"\n").unwrap();

        let loader = ConfigLoader::new(temp_path.clone()).with_global_path(None);
        let (config, source) = loader.load(Some(&explicit)).await.unwrap();
        assert_eq!(config.content.platform.as_deref(), Some("unix"));
        assert_eq!(source, ConfigSource::Explicit(explicit));

        assert!(loader.load(Some(&temp_path.join("missing.toml"))).await.is_err());
    }

    #[test]
    fn test_layering_precedence() {
        let mut file = file_with_root("/from-file");
        file.content.max_fanout = Some(2);
        file.content.platform = Some("unix".to_string());

        let env = HashMap::from([
            (ENV_STORE.to_string(), "/from-env".to_string()),
            (ENV_MAX_FANOUT.to_string(), "4".to_string()),
        ]);
        let cli = HashMap::from([("store".to_string(), "/from-cli".to_string())]);

        let resolved = ConfigLayering::new(file)
            .with_env(env)
            .with_cli(cli)
            .resolve(ConfigSource::Defaults)
            .unwrap();

        assert_eq!(resolved.store_root, "/from-cli");
        assert_eq!(resolved.content.max_fanout, Some(4));
        assert_eq!(resolved.content.platform, Platform::Unix);
    }

    #[test]
    fn test_env_platform_override() {
        let env = HashMap::from([(ENV_PLATFORM.to_string(), "win32".to_string())]);
        let resolved = ConfigLayering::new(file_with_root("/store"))
            .with_env(env)
            .resolve(ConfigSource::Defaults)
            .unwrap();
        assert!(resolved.content.platform.is_windows());
    }

    #[test]
    fn test_bad_overrides_are_rejected() {
        let bad_platform = HashMap::from([(ENV_PLATFORM.to_string(), "beos".to_string())]);
        let err = ConfigLayering::new(file_with_root("/store"))
            .with_env(bad_platform)
            .resolve(ConfigSource::Defaults)
            .unwrap_err();
        assert!(matches!(err, CaskError::ConfigValidation { field, .. } if field == ENV_PLATFORM));

        let zero = HashMap::from([("max-fanout".to_string(), "0".to_string())]);
        assert!(ConfigLayering::new(file_with_root("/store"))
            .with_cli(zero)
            .resolve(ConfigSource::Defaults)
            .is_err());

        let junk = HashMap::from([(ENV_MAX_FANOUT.to_string(), "lots".to_string())]);
        assert!(ConfigLayering::new(file_with_root("/store"))
            .with_env(junk)
            .resolve(ConfigSource::Defaults)
            .is_err());
    }

    #[test]
    fn test_default_store_root_is_under_cache_dir() {
        if dirs::cache_dir().is_none() {
            return;
        }
        let resolved = ConfigLayering::new(CaskToml::default())
            .resolve(ConfigSource::Defaults)
            .unwrap();
        assert!(resolved.store_root.ends_with("cask"));
        assert_eq!(resolved.content, ContentConfig::default());
    }

    #[test]
    fn test_collect_env_overrides() {
        std::env::set_var("CASK_COLLECT_TEST", "yes");
        std::env::set_var("NOT_CASK_COLLECT_TEST", "ignored");

        let overrides = ConfigLayering::collect_env_overrides();
        assert_eq!(overrides.get("CASK_COLLECT_TEST").map(String::as_str), Some("yes"));
        assert!(!overrides.contains_key("NOT_CASK_COLLECT_TEST"));

        std::env::remove_var("CASK_COLLECT_TEST");
        std::env::remove_var("NOT_CASK_COLLECT_TEST");
    }
}
