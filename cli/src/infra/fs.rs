//! Filesystem infrastructure: implements `LocalFs` over `std::fs`.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::EngineError;
use crate::domain::layout::temp_path;

/// Production filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

/// Map an I/O failure, promoting permission errors to [`EngineError::Permission`].
fn io_error(op: &'static str, path: &Path, err: std::io::Error) -> anyhow::Error {
    if err.kind() == ErrorKind::PermissionDenied {
        EngineError::Permission {
            op,
            path: path.to_path_buf(),
            source: err,
        }
        .into()
    } else {
        anyhow::Error::new(err).context(format!("failed to {op} {}", path.display()))
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
    }
    Ok(())
}

impl LocalFs for StdFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| io_error("read", path, e))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| io_error("read", path, e))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8], mode: u32) -> Result<()> {
        ensure_parent(path)?;
        let tmp = temp_path(path);
        let staged = (|| -> Result<()> {
            let mut file = File::create(&tmp).map_err(|e| io_error("write", &tmp, e))?;
            file.write_all(bytes).map_err(|e| io_error("write", &tmp, e))?;
            file.sync_all().map_err(|e| io_error("sync", &tmp, e))?;
            drop(file);
            self.set_permissions(&tmp, mode)?;
            std::fs::rename(&tmp, path).map_err(|e| io_error("replace", path, e))
        })();
        if staged.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        staged
    }

    fn append(&self, path: &Path, text: &str) -> Result<()> {
        ensure_parent(path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| io_error("open", path, e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| io_error("append to", path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::rename(from, to)
            .map_err(|e| io_error("rename", from, e))
            .with_context(|| format!("renaming to {}", to.display()))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| io_error("copy onto", to, e))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).map_err(|e| io_error("remove", path, e))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| io_error("create", path, e))
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .map_err(|e| io_error("chmod", path, e))?;
        }
        #[cfg(not(unix))]
        let _ = (path, mode);
        Ok(())
    }

    fn modified(&self, path: &Path) -> Result<Option<SystemTime>> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(Some(meta.modified().map_err(|e| io_error("stat", path, e))?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("stat", path, e)),
        }
    }

    fn touch(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| io_error("touch", path, e))?;
        file.set_modified(SystemTime::now())
            .map_err(|e| io_error("touch", path, e))
    }

    fn read_link(&self, path: &Path) -> Result<Option<PathBuf>> {
        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => std::fs::read_link(path)
                .map(Some)
                .map_err(|e| io_error("read link", path, e)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("stat", path, e)),
        }
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link).map_err(|e| io_error("link", link, e))
        }
        #[cfg(not(unix))]
        {
            let _ = target;
            anyhow::bail!("symlinks are not supported here: {}", link.display())
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        std::fs::canonicalize(path).map_err(|e| io_error("resolve", path, e))
    }
}
