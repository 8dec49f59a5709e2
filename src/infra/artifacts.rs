use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Write a pretty-printed JSON artifact, creating `dir` when needed
pub fn write_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn writes_into_missing_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("docs");

        let path = write_json(&target, "summary.json", &serde_json::json!({"rows": 3})).unwrap();

        let back: Value = read_json(&path).unwrap();
        assert_eq!(back["rows"], 3);
    }
}
