use crate::error::JanitorError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "janitor.toml";
pub const ENV_PREFIX: &str = "JANITOR_";

/// Table types the catalog reports for physical tables; views and other
/// derived objects are left alone.
pub const DEFAULT_TABLE_TYPES: [&str; 3] = ["Regular", "Partitioned", "External"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub catalog: CatalogConfig,
    pub job: JobConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: Url,
    pub token: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Minimum pause between two catalog requests; 0 disables pacing.
    pub request_delay_ms: u64,
    pub max_retries: usize,
    pub proxy: Option<Url>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8585/").expect("static URL is valid"),
            token: String::new(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
            request_delay_ms: 0,
            max_retries: 3,
            proxy: None,
        }
    }
}

// Keeps the bearer token out of logs.
impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("proxy", &self.proxy.as_ref().map(Url::as_str))
            .finish()
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_delay(&self) -> Option<Duration> {
        (self.request_delay_ms > 0).then(|| Duration::from_millis(self.request_delay_ms))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Fully qualified name of the database whose schemas are swept.
    pub database: String,
    pub page_size: u32,
    pub lineage_depth: u32,
    pub table_types: Vec<String>,
    /// Case-insensitive substring; edges touching a matching FQN are kept.
    pub exclude_name_pattern: Option<String>,
    /// Keep edges that carry lineage details (pipeline, SQL query).
    pub keep_detailed_edges: bool,
    pub dry_run: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            page_size: 50,
            lineage_depth: 1,
            table_types: DEFAULT_TABLE_TYPES.iter().map(|s| s.to_string()).collect(),
            exclude_name_pattern: Some("vw".to_string()),
            keep_detailed_edges: true,
            dry_run: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("janitor-output"),
        }
    }
}

impl Config {
    /// Layered load: defaults, then the TOML file, then `JANITOR_*` env vars.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, JanitorError> {
        let toml = match path {
            Some(p) if !p.exists() => {
                return Err(JanitorError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file {} not found", p.display()),
                )));
            }
            Some(p) => Toml::file(p),
            None => Toml::file(DEFAULT_CONFIG_FILE),
        };
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(toml)
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, JanitorError> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), JanitorError> {
        let invalid = |msg: &str| -> Result<(), JanitorError> {
            Err(figment::Error::from(msg.to_string()).into())
        };
        if self.job.page_size == 0 {
            return invalid("job.page_size must be greater than zero");
        }
        if self.job.lineage_depth == 0 {
            return invalid("job.lineage_depth must be greater than zero");
        }
        Ok(())
    }

    /// Token and database are only required once a stage talks to the catalog.
    pub fn require_catalog_access(&self) -> Result<(), JanitorError> {
        if self.catalog.token.trim().is_empty() {
            return Err(figment::Error::from(format!(
                "catalog.token is empty; set {ENV_PREFIX}CATALOG__TOKEN"
            ))
            .into());
        }
        Ok(())
    }

    pub fn require_database(&self) -> Result<(), JanitorError> {
        if self.job.database.trim().is_empty() {
            return Err(figment::Error::from(
                "job.database is empty; pass --database or set job.database".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_dry_run_with_depth_one() {
        let cfg = Config::default();
        assert!(cfg.job.dry_run);
        assert_eq!(cfg.job.lineage_depth, 1);
        assert_eq!(cfg.job.page_size, 50);
        assert_eq!(cfg.job.table_types, vec!["Regular", "Partitioned", "External"]);
    }

    #[test]
    fn env_overrides_file_values() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "janitor.toml",
                r#"
                [catalog]
                base_url = "https://catalog.example.com/"
                token = "from-file"

                [job]
                database = "Ecommerce.dev"
                page_size = 10
                "#,
            )?;
            jail.set_env("JANITOR_CATALOG__TOKEN", "from-env");
            jail.set_env("JANITOR_JOB__DRY_RUN", "false");

            let cfg = Config::load(None).map_err(|e| e.to_string())?;
            assert_eq!(cfg.catalog.base_url.as_str(), "https://catalog.example.com/");
            assert_eq!(cfg.catalog.token, "from-env");
            assert_eq!(cfg.job.database, "Ecommerce.dev");
            assert_eq!(cfg.job.page_size, 10);
            assert!(!cfg.job.dry_run);
            Ok(())
        });
    }

    #[test]
    fn zero_page_size_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("janitor.toml", "[job]\npage_size = 0\n")?;
            assert!(Config::load(None).is_err());
            Ok(())
        });
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let mut cfg = Config::default();
        cfg.catalog.token = "super-secret".to_string();
        let printed = format!("{:?}", cfg);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn empty_token_fails_catalog_check() {
        let cfg = Config::default();
        assert!(cfg.require_catalog_access().is_err());
        assert!(cfg.require_database().is_err());
    }
}
