use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use tracing::warn;

use crate::error::Error;
use crate::grid::DEFAULT_SLOT_COUNT;

pub const DEFAULT_IMAGE_DIR: &str = "public/content/img";
pub const DEFAULT_URL_PREFIX: &str = "/content/img";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Where the grid's images come from.
    pub source: SourceConfig,
    /// Grid size and rotation cadence.
    pub grid: GridOptions,
    /// Listing/grid HTTP endpoints.
    pub web: WebOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.grid.validate().context("invalid grid configuration")?;
        self.web.validate().context("invalid web configuration")?;
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case",
    deny_unknown_fields
)]
pub enum SourceConfig {
    /// Image files in a directory, exposed as `{url-prefix}/{file}`.
    Directory {
        path: PathBuf,
        #[serde(default = "SourceConfig::default_url_prefix")]
        url_prefix: String,
        #[serde(default)]
        recursive: bool,
    },
    /// A `{ "files": [...] }` JSON document.
    ListingFile { path: PathBuf },
    /// Identifiers listed inline.
    Static { files: Vec<String> },
}

impl SourceConfig {
    fn default_url_prefix() -> String {
        DEFAULT_URL_PREFIX.to_string()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Directory {
            path: PathBuf::from(DEFAULT_IMAGE_DIR),
            url_prefix: Self::default_url_prefix(),
            recursive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GridOptions {
    /// Number of tiles in the grid.
    pub slot_count: usize,
    /// How often a single tile is replaced.
    #[serde(with = "humantime_serde")]
    pub replace_every: Duration,
    /// Optional deterministic seed for the shuffle and the draws.
    pub seed: Option<u64>,
}

impl GridOptions {
    const fn default_replace_every() -> Duration {
        Duration::from_millis(1400)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.replace_every.is_zero(),
            "grid.replace-every must be greater than zero"
        );
        if self.slot_count == 0 {
            warn!("grid.slot-count is zero; the grid will stay empty");
        }
        Ok(())
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            replace_every: Self::default_replace_every(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct WebOptions {
    pub enabled: bool,
    pub bind_address: String,
    pub port: u16,
}

impl WebOptions {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .with_context(|| format!("web.bind-address {:?} is not an IP address", self.bind_address))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    fn validate(&self) -> Result<()> {
        if self.enabled {
            self.socket_addr()?;
        }
        Ok(())
    }
}

impl Default for WebOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
