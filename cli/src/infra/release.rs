//! Release infrastructure: implements `ReleaseSource` over HTTPS.
//!
//! The version file is plain text; the asset is a gzip-compressed tar holding
//! the binary as `construct-<os>-<arch>` or `construct` at any depth.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

use crate::application::ports::ReleaseSource;
use crate::domain::install::{BINARY_NAME, Platform, asset_url};
use crate::domain::template::MODE_EXEC;
use crate::domain::{EngineError, UpdateChannel};

pub const DEFAULT_RELEASES_URL: &str = "https://github.com/construct-cli/construct/releases/download";
pub const DEFAULT_VERSION_URL: &str =
    "https://raw.githubusercontent.com/construct-cli/construct/main/VERSION";
pub const DEFAULT_BETA_VERSION_URL: &str =
    "https://raw.githubusercontent.com/construct-cli/construct/main/VERSION-BETA";

/// Request timeout for version checks and downloads.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Request timeout for the background update notice.
pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(3);

/// Largest archive accepted.
const MAX_ARCHIVE_BYTES: u64 = 200 * 1024 * 1024;

/// Largest version file accepted.
const MAX_VERSION_BYTES: u64 = 1024;

/// Downloads release metadata and archives.
pub struct HttpReleaseSource {
    agent: ureq::Agent,
    releases_url: String,
    stable_version_url: String,
    beta_version_url: String,
}

impl HttpReleaseSource {
    /// Endpoints from `CONSTRUCT_RELEASES_URL` / `CONSTRUCT_VERSION_URL`,
    /// falling back to the public release host.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`] with an injectable variable lookup.
    ///
    /// `CONSTRUCT_VERSION_URL` overrides both channels.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let version_override = var("CONSTRUCT_VERSION_URL");
        Self {
            agent: ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build(),
            releases_url: var("CONSTRUCT_RELEASES_URL")
                .unwrap_or_else(|| DEFAULT_RELEASES_URL.to_string()),
            stable_version_url: version_override
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION_URL.to_string()),
            beta_version_url: version_override
                .unwrap_or_else(|| DEFAULT_BETA_VERSION_URL.to_string()),
        }
    }

    /// Replace the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::AgentBuilder::new().timeout(timeout).build();
        self
    }

    #[must_use]
    pub fn version_url(&self, channel: UpdateChannel) -> &str {
        match channel {
            UpdateChannel::Stable => &self.stable_version_url,
            UpdateChannel::Beta => &self.beta_version_url,
        }
    }

    fn get(&self, url: &str) -> Result<ureq::Response> {
        let response = self.agent.get(url).call().map_err(|e| {
            let message = match e {
                ureq::Error::Status(code, _) => format!("HTTP {code}"),
                ureq::Error::Transport(t) => t.to_string(),
            };
            EngineError::Network {
                url: url.to_string(),
                message,
            }
        })?;
        if response.status() != 200 {
            return Err(EngineError::Network {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            }
            .into());
        }
        Ok(response)
    }
}

impl ReleaseSource for HttpReleaseSource {
    fn latest_version(&self, channel: UpdateChannel) -> Result<String> {
        let url = self.version_url(channel);
        tracing::debug!(%url, "fetching version file");
        let mut body = String::new();
        self.get(url)?
            .into_reader()
            .take(MAX_VERSION_BYTES)
            .read_to_string(&mut body)
            .map_err(|e| EngineError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(body.trim().to_string())
    }

    fn fetch_binary(&self, version: &str, platform: &Platform, work_dir: &Path) -> Result<PathBuf> {
        let url = asset_url(&self.releases_url, version, platform);
        tracing::info!(%url, "downloading release");
        let archive = work_dir.join(platform.asset_name(version));
        let mut file = File::create(&archive)
            .with_context(|| format!("creating {}", archive.display()))?;
        io::copy(
            &mut self.get(&url)?.into_reader().take(MAX_ARCHIVE_BYTES),
            &mut file,
        )
        .map_err(|e| EngineError::Network {
            url: url.clone(),
            message: e.to_string(),
        })?;
        drop(file);
        extract_binary(&archive, platform, work_dir)
    }
}

/// Extract the first entry named `construct-<os>-<arch>` or `construct` from
/// a `.tar.gz` into `work_dir`, marked executable.
///
/// # Errors
///
/// Returns [`EngineError::Integrity`] when no such entry exists, or an I/O
/// error if the archive is unreadable.
pub fn extract_binary(archive: &Path, platform: &Platform, work_dir: &Path) -> Result<PathBuf> {
    let expected = platform.binary_entry();
    let file = File::open(archive).with_context(|| format!("opening {}", archive.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    let entries = tar.entries().context("reading release archive")?;
    for entry in entries {
        let mut entry = entry.context("reading release archive entry")?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path().context("reading entry path")?.into_owned();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name != expected && name != BINARY_NAME {
            continue;
        }
        let dest = work_dir.join(format!("{BINARY_NAME}.new"));
        let mut out = File::create(&dest).with_context(|| format!("creating {}", dest.display()))?;
        io::copy(&mut entry, &mut out).context("extracting binary")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(MODE_EXEC))
                .with_context(|| format!("marking {} executable", dest.display()))?;
        }
        tracing::debug!(entry = %path.display(), "extracted binary");
        return Ok(dest);
    }
    Err(EngineError::Integrity { expected }.into())
}
