use std::path::{Path, PathBuf};

use anyhow::{anyhow, ensure, Context, Result};

pub const BACKEND_URL_ENV: &str = "TONECOACH_BACKEND_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub cache_dir: PathBuf,
}

impl AppConfig {
    pub fn from_overrides(backend_url: Option<String>, cache_dir: Option<PathBuf>) -> Result<Self> {
        let env_url = std::env::var(BACKEND_URL_ENV).ok();
        let backend_url = resolve_backend_url(backend_url, env_url)?;
        let cache_dir = match cache_dir {
            Some(custom) => canonicalize_dir(&custom)?,
            None => default_cache_dir()?,
        };
        Ok(Self {
            backend_url,
            cache_dir,
        })
    }
}

fn resolve_backend_url(cli: Option<String>, env: Option<String>) -> Result<String> {
    let raw = cli
        .or(env)
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
    normalize_url(&raw)
}

fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    ensure!(
        trimmed.starts_with("http://") || trimmed.starts_with("https://"),
        "backend url must start with http:// or https:// (got {:?})",
        raw
    );
    Ok(trimmed.to_string())
}

fn canonicalize_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve cache directory at {:?}", path))?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(anyhow!("cache path {:?} is not a directory", canonical))
    }
}

fn default_cache_dir() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("could not determine the platform cache directory"))?
        .join("tonecoach");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create cache directory {:?}", dir))?;
    Ok(dir)
}
