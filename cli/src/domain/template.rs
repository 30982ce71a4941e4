//! Template descriptors: immutable bytes compiled into the binary together
//! with the file mode and destination they are materialized to.

use sha2::{Digest, Sha256};

/// Logical template names.
pub mod names {
    pub const CONFIG: &str = "config.toml";
    pub const PACKAGES: &str = "packages.toml";
    pub const DOCKERFILE: &str = "Dockerfile";
    pub const COMPOSE: &str = "docker-compose.yml";
    pub const ENTRYPOINT: &str = "entrypoint.sh";
    pub const UPDATE_ALL: &str = "update-all.sh";
    pub const NETWORK_FILTER: &str = "network-filter.sh";
    pub const CLIPPER: &str = "clipper";
    pub const CLIPBOARD_X11_SYNC: &str = "clipboard-x11-sync.sh";
    pub const OSASCRIPT: &str = "osascript";
    pub const POWERSHELL: &str = "powershell.exe";
}

/// File mode for TOML files and sidecars.
pub const MODE_DATA: u32 = 0o644;

/// File mode for scripts and binaries.
pub const MODE_EXEC: u32 = 0o755;

/// One embedded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Logical name, one of [`names`].
    pub name: &'static str,
    /// Raw content.
    pub bytes: &'static [u8],
    /// Unix permission bits applied when materialized.
    pub mode: u32,
    /// Destination relative to the config tree root.
    pub dest: &'static str,
}

impl Template {
    /// Hex SHA-256 of the template bytes.
    #[must_use]
    pub fn sha256(&self) -> String {
        sha256_hex(self.bytes)
    }

    /// Container templates are engine-owned and overwritten on every migration.
    #[must_use]
    pub fn is_container_file(&self) -> bool {
        self.dest.starts_with("container/")
    }
}

/// Hex SHA-256 of arbitrary bytes.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex_encode(&Sha256::digest(bytes))
}

/// Encode bytes as lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}
