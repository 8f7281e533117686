use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

pub const CONFIG_DIR: &str = ".stagecraft";
pub const CONFIG_FILE: &str = ".stagecraft/config.toml";
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Generative-text service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for OpenRouterSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: llm::DEFAULT_BASE_URL.to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Document workspace settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_page_id: Option<String>,
    pub base_url: String,
}

impl Default for NotionSection {
    fn default() -> Self {
        Self {
            token: None,
            parent_page_id: None,
            base_url: notion::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub private_repos: bool,
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            token: None,
            private_repos: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSection {
    /// Seconds to wait for the next token before failing the stage. Unset waits forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
}

/// Service configuration stored in `.stagecraft/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagecraftConfig {
    pub server: ServerSection,
    pub openrouter: OpenRouterSection,
    pub notion: NotionSection,
    pub github: GitHubSection,
    pub dashboard: DashboardSection,
    pub generation: GenerationSection,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl StagecraftConfig {
    /// Read config from `path`, falling back to defaults when it is missing or invalid.
    pub async fn read(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "Config file does not exist, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path).await {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    debug!(path = %path.display(), "Config loaded successfully");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                Self::default()
            }
        }
    }

    /// Write config to `path`, creating parent directories.
    pub async fn write(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(path, content).await?;
        debug!(path = %path.display(), "Config saved successfully");

        Ok(())
    }

    /// Apply environment variable overrides.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| non_blank(lookup(key));

        if let Some(key) = get("OPENROUTER_API_KEY") {
            self.openrouter.api_key = Some(key);
        }
        if let Some(model) = get("OPENROUTER_MODEL") {
            self.openrouter.model = model;
        }
        if let Some(token) = get("NOTION_API_KEY") {
            self.notion.token = Some(token);
        }
        if let Some(parent) = get("NOTION_PARENT_PAGE_ID") {
            self.notion.parent_page_id = Some(parent);
        }
        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(url) = get("DASHBOARD_URL") {
            self.dashboard.base_url = Some(url);
        }
        self
    }

    pub fn openrouter_key(&self) -> Option<&str> {
        self.openrouter
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    /// Notion token and parent page, when both are set.
    pub fn notion_target(&self) -> Option<(&str, &str)> {
        let token = self.notion.token.as_deref().filter(|t| !t.trim().is_empty())?;
        let parent = self
            .notion
            .parent_page_id
            .as_deref()
            .filter(|p| !p.trim().is_empty())?;
        Some((token, parent))
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn dashboard_url(&self) -> Option<&str> {
        self.dashboard
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.generation.idle_timeout_secs.map(Duration::from_secs)
    }
}
