//! Path resolution and raw readers for files under the workspace `data/` root.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefer the top-level workspace `data/` so tests and tools can run from
/// any crate; fall back to a crate-local `data/`.
pub fn data_root() -> PathBuf {
    let here = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() { ws } else { here.join("data") }
}

/// Read a raw text file under `data/` and return its contents.
pub fn read_text(rel: impl AsRef<Path>) -> Result<String> {
    let path = data_root().join(rel);
    let s = fs::read_to_string(&path).with_context(|| format!("read data: {}", path.display()))?;
    Ok(s)
}

/// Read and parse a TOML file under `data/`, or return `None` when absent.
pub fn read_toml_opt<T: serde::de::DeserializeOwned>(rel: impl AsRef<Path>) -> Result<Option<T>> {
    let path = data_root().join(rel.as_ref());
    if !path.is_file() {
        return Ok(None);
    }
    let txt = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let v = toml::from_str::<T>(&txt).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(v))
}
