use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
}

impl SiteConfig {
    fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

fn default_sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig::new("NHK主要ニュース", "https://www.nhk.or.jp/rss/news/cat0.xml"),
        SiteConfig::new("CNET Japan", "http://feeds.japan.cnet.com/rss/cnet/all.rdf"),
        SiteConfig::new("GIGAZINE", "https://gigazine.net/news/rss_2.0/"),
        SiteConfig::new(
            "ITMedia 科学",
            "https://rss.itmedia.co.jp/rss/2.0/news_technology.xml",
        ),
        SiteConfig::new(
            "ITMedia セキュリティ",
            "https://rss.itmedia.co.jp/rss/2.0/news_security.xml",
        ),
        SiteConfig::new(
            "ITMedia 国内",
            "https://rss.itmedia.co.jp/rss/2.0/news_domestic.xml",
        ),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            max_attempts: 3,
            retry_delay_secs: 5,
            user_agent: "RssTicker/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub site_name_secs: u64,
    pub title_secs: u64,
    pub description_secs: u64,
    pub title_prefix: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            site_name_secs: 1,
            title_secs: 3,
            description_secs: 5,
            title_prefix: "★ ".to_string(),
        }
    }
}

impl DisplayConfig {
    pub fn site_name_hold(&self) -> Duration {
        Duration::from_secs(self.site_name_secs)
    }

    pub fn title_hold(&self) -> Duration {
        Duration::from_secs(self.title_secs)
    }

    pub fn description_hold(&self) -> Duration {
        Duration::from_secs(self.description_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub debounce_ms: u64,
    pub stdin_button: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            stdin_button: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: String,
    pub index_file: String,
    pub font_size_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
            index_file: "app_rss_index.txt".to_string(),
            font_size_file: "app_rss_fontsize.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "logs/rss-ticker.log".to_string(),
            level: Some("info".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sites: Vec<SiteConfig>,
    pub fetcher: FetcherConfig,
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            sites: default_sites(),
            fetcher: FetcherConfig::default(),
            display: DisplayConfig::default(),
            input: InputConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let explicit_path = std::env::var("CONFIG_FILE").ok();
        let config = if let Some(path) = explicit_path {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(anyhow!("config file {:?} not found", path));
            }
            Self::load_from_file(&path)?
        } else {
            let path = locate_default_config();
            if let Some(path) = path {
                Self::load_from_file(&path)?
            } else {
                AppConfig::default()
            }
        };

        let config = Self::apply_env_overrides(config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {:?}", path))?;
        Ok(config)
    }

    fn apply_env_overrides(mut config: AppConfig) -> anyhow::Result<AppConfig> {
        if let Ok(bind) = std::env::var("SERVER_BIND") {
            config.server.bind = bind;
        }

        if let Some(timeout) = parse_optional_env("FETCH_TIMEOUT_SECS")? {
            config.fetcher.request_timeout_secs = timeout;
        }

        if let Some(attempts) = parse_optional_env("FETCH_MAX_ATTEMPTS")? {
            config.fetcher.max_attempts = attempts;
        }

        if let Ok(dir) = std::env::var("STATE_DIR") {
            config.storage.dir = dir;
        }

        if let Ok(log_file) = std::env::var("LOG_FILE_PATH") {
            config.logging.file = log_file;
        }

        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            config.logging.level = Some(log_level);
        }

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sites.is_empty() {
            return Err(anyhow!("no feed sites configured; add at least one entry under `sites`"));
        }

        for site in &self.sites {
            let url = Url::parse(&site.url)
                .with_context(|| format!("invalid url for site {:?}: {}", site.name, site.url))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow!(
                    "site {:?} must use http or https, got {}",
                    site.name,
                    url.scheme()
                ));
            }
        }

        if self.storage.dir.trim().is_empty() {
            return Err(anyhow!("storage.dir must not be empty"));
        }

        Ok(())
    }
}

fn parse_optional_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => Ok(Some(
            v.parse::<T>()
                .with_context(|| format!("{key} must be a valid value"))?,
        )),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn locate_default_config() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("config/config.yaml"),
        PathBuf::from("../config/config.yaml"),
    ];

    for path in candidates {
        if path.exists() {
            return Some(path);
        }
    }

    None
}
