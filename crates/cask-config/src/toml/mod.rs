//! cask.toml parsing and serialization

use camino::{Utf8Path, Utf8PathBuf};
use cask_core::{CaskError, ContentConfig, Platform};
use serde::{Deserialize, Serialize};

use crate::ConfigResult;

/// Complete cask.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaskToml {
    /// Where the store lives
    #[serde(default)]
    pub store: StoreSection,

    /// How content operations behave
    #[serde(default)]
    pub content: ContentSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSection {
    /// Store root directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContentSection {
    /// "windows" or "unix"; the host platform when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Cap on concurrent candidate probes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fanout: Option<usize>,
}

impl ContentSection {
    /// Convert into the settings content operations take
    pub fn to_content_config(&self) -> ConfigResult<ContentConfig> {
        let mut config = ContentConfig::new();
        if let Some(name) = &self.platform {
            config = config.with_platform(name.parse::<Platform>()?);
        }
        if let Some(max_fanout) = self.max_fanout {
            validate_max_fanout(max_fanout)?;
            config = config.with_max_fanout(max_fanout);
        }
        Ok(config)
    }
}

/// Parse TOML string to CaskToml configuration
pub fn parse_cask_toml(content: &str) -> ConfigResult<CaskToml> {
    let config: CaskToml = ::toml::from_str(content).map_err(|e| CaskError::TomlParse {
        file: "cask.toml".to_string(),
        message: e.to_string(),
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Serialize CaskToml to TOML string
pub fn serialize_cask_toml(config: &CaskToml) -> ConfigResult<String> {
    ::toml::to_string_pretty(config).map_err(|e| CaskError::TomlParse {
        file: "cask.toml".to_string(),
        message: format!("serialization error: {}", e),
    })
}

/// Check field values serde cannot
pub fn validate_config(config: &CaskToml) -> ConfigResult<()> {
    if let Some(root) = &config.store.root {
        if root.as_str().trim().is_empty() {
            return Err(CaskError::ConfigValidation {
                field: "store.root".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
    }

    config.content.to_content_config()?;

    Ok(())
}

pub(crate) fn validate_max_fanout(max_fanout: usize) -> ConfigResult<()> {
    if max_fanout == 0 {
        return Err(CaskError::ConfigValidation {
            field: "content.max-fanout".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Load and parse cask.toml from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<CaskToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CaskError::io(format!("Failed to read {}", path), e))?;

    parse_cask_toml(&content).map_err(|e| match e {
        CaskError::TomlParse { message, .. } => CaskError::TomlParse {
            file: path.to_string(),
            message,
        },
        CaskError::ConfigValidation { field, reason } => CaskError::ConfigValidation {
            field,
            reason: format!("{} (in {})", reason, path),
        },
        other => other,
    })
}
