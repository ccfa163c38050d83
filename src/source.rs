use crate::config::SourceConfig;
use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ffi::OsStr;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "avif"];

/// Body of the image listing: `{ "files": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub files: Vec<String>,
}

/// Anything that can report the identifiers of the images available right now.
///
/// Identifiers are expected to be unique; ordering carries no meaning.
pub trait ImageSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<Vec<String>, SourceError>> + Send;
}

/// Fetch the universe for a new grid session. A failing source is logged and
/// treated as an empty universe.
pub async fn load_universe<S: ImageSource>(source: &S) -> Vec<String> {
    match source.fetch().await {
        Ok(files) => {
            info!(images = files.len(), "image universe loaded");
            files
        }
        Err(err) => {
            warn!(error = %err, "image source unavailable; continuing without images");
            Vec::new()
        }
    }
}

/// Images found in a directory on disk, exposed under a URL prefix.
///
/// Only regular files are listed; symlinks are neither listed nor followed,
/// so a recursive walk stays inside the root.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    url_prefix: String,
    recursive: bool,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
            recursive: false,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List image files under the root, sorted by path.
    pub fn list(&self) -> Result<Vec<String>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::BadDir(self.root.clone()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let prefix = self.url_prefix.trim_end_matches('/');
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_image(entry.path()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(format!("{prefix}/{relative}"));
        }

        debug!(root = %self.root.display(), found = files.len(), "image directory listed");
        Ok(files)
    }
}

impl ImageSource for DirectorySource {
    async fn fetch(&self) -> Result<Vec<String>, SourceError> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.list()).await?
    }
}

/// A JSON listing document on disk, in the same shape the listing endpoint serves.
#[derive(Debug, Clone)]
pub struct ListingFileSource {
    path: PathBuf,
}

impl ListingFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for ListingFileSource {
    async fn fetch(&self) -> Result<Vec<String>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(parse_listing(&bytes))
    }
}

/// A fixed list of identifiers.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    files: Vec<String>,
}

impl StaticSource {
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }
}

impl ImageSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.files.clone())
    }
}

/// The source selected in the configuration file.
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Directory(DirectorySource),
    ListingFile(ListingFileSource),
    Static(StaticSource),
}

impl From<&SourceConfig> for ConfiguredSource {
    fn from(cfg: &SourceConfig) -> Self {
        match cfg {
            SourceConfig::Directory {
                path,
                url_prefix,
                recursive,
            } => Self::Directory(
                DirectorySource::new(path.clone(), url_prefix.clone()).recursive(*recursive),
            ),
            SourceConfig::ListingFile { path } => {
                Self::ListingFile(ListingFileSource::new(path.clone()))
            }
            SourceConfig::Static { files } => Self::Static(StaticSource::new(files.clone())),
        }
    }
}

impl ImageSource for ConfiguredSource {
    async fn fetch(&self) -> Result<Vec<String>, SourceError> {
        match self {
            Self::Directory(source) => source.fetch().await,
            Self::ListingFile(source) => source.fetch().await,
            Self::Static(source) => source.fetch().await,
        }
    }
}

/// Decode a `{ "files": [...] }` document. Anything unexpected yields an
/// empty list; non-string entries are dropped.
pub fn parse_listing(bytes: &[u8]) -> Vec<String> {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "image listing is not valid JSON; treating as empty");
            return Vec::new();
        }
    };

    match value.get("files") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item.as_str() {
                Some(s) => Some(s.to_owned()),
                None => {
                    debug!(entry = %item, "ignoring non-string listing entry");
                    None
                }
            })
            .collect(),
        Some(other) => {
            warn!(found = %other, "image listing `files` is not an array; treating as empty");
            Vec::new()
        }
        None => {
            warn!("image listing has no `files` field; treating as empty");
            Vec::new()
        }
    }
}

#[inline]
fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(OsStr::to_str)
            .map(|s| s.to_ascii_lowercase()),
        Some(ref e) if IMAGE_EXTENSIONS.contains(&e.as_str())
    )
}
