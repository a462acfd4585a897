use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::config::{DirectoryConfig, WatermarkBackend};

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    /// Only created when the watermark lives on disk.
    pub db_path: Option<PathBuf>,
}

pub fn ensure_directories(cfg: &DirectoryConfig, backend: WatermarkBackend) -> Result<ResolvedPaths> {
    let logs_dir = ensure_dir(&cfg.logs_dir)?;

    let db_path = match backend {
        WatermarkBackend::Memory => None,
        WatermarkBackend::Sqlite => {
            let data_dir = ensure_dir(&cfg.data_dir)?;
            let write_check = data_dir.join(".write-test");
            fs::write(&write_check, b"ok")
                .with_context(|| format!("data directory {} is not writable", data_dir.display()))?;
            fs::remove_file(&write_check)?;
            Some(data_dir.join(&cfg.db_filename))
        }
    };

    Ok(ResolvedPaths { logs_dir, db_path })
}

fn ensure_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    if !dir.exists() {
        fs::create_dir_all(&dir).with_context(|| format!("failed to create directory {}", path))?;
    }
    Ok(dir.canonicalize().unwrap_or(dir))
}
