use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// On-disk encodings used under `.transit/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Pretty-printed JSON: `stops.json`, `routes.json`.
    Json,
    /// `config.yaml`.
    Yaml,
}

impl Format {
    fn encode<T: Serialize>(self, value: &T) -> Result<String> {
        Ok(match self {
            Format::Json => {
                let mut text = serde_json::to_string_pretty(value)?;
                text.push('\n');
                text
            }
            Format::Yaml => serde_yaml::to_string(value)?,
        })
    }

    fn decode<T: DeserializeOwned>(self, text: &str) -> Result<T> {
        Ok(match self {
            Format::Json => serde_json::from_str(text)?,
            Format::Yaml => serde_yaml::from_str(text)?,
        })
    }
}

/// Encode `value` and replace the file at `path` in one rename, so readers
/// never see a half-written stop or route file. Missing parents are created.
pub fn store<T: Serialize>(path: &Path, format: Format, value: &T) -> Result<()> {
    let text = format.encode(value)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(text.as_bytes())?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read and decode `path`. `Ok(None)` when the file does not exist; a file
/// that exists but does not parse is an error.
pub fn fetch<T: DeserializeOwned>(path: &Path, format: Format) -> Result<Option<T>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    format.decode(&text).map(Some)
}

/// Like [`store`], but leaves an existing file untouched. Returns whether
/// anything was written. Used by `init` so re-running it keeps local edits.
pub fn seed<T: Serialize>(path: &Path, format: Format, value: &T) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    store(path, format, value)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        total: usize,
    }

    fn counter(total: usize) -> Counter {
        Counter {
            name: "Line 7".into(),
            total,
        }
    }

    #[test]
    fn store_creates_transit_dir_and_writes_pretty_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".transit/stops.json");
        store(&path, Format::Json, &counter(2)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"total\": 2"));
        assert!(text.ends_with('\n'));
        let back: Option<Counter> = fetch(&path, Format::Json).unwrap();
        assert_eq!(back, Some(counter(2)));
    }

    #[test]
    fn store_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routes.json");
        store(&path, Format::Json, &counter(5)).unwrap();
        store(&path, Format::Json, &counter(1)).unwrap();

        let back: Counter = fetch(&path, Format::Json).unwrap().unwrap();
        assert_eq!(back.total, 1);
        // Only the target remains; the staging file was renamed over it.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn fetch_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let back: Option<Counter> = fetch(&dir.path().join("nope.json"), Format::Json).unwrap();
        assert!(back.is_none());
    }

    #[test]
    fn fetch_reports_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stops.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = fetch::<Counter>(&path, Format::Json).unwrap_err();
        assert!(matches!(err, crate::TransitError::Json(_)));
    }

    #[test]
    fn seed_keeps_existing_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "name: edited\ntotal: 9\n").unwrap();

        assert!(!seed(&path, Format::Yaml, &counter(0)).unwrap());
        let back: Counter = fetch(&path, Format::Yaml).unwrap().unwrap();
        assert_eq!(back.total, 9);

        let fresh = dir.path().join("fresh.yaml");
        assert!(seed(&fresh, Format::Yaml, &counter(0)).unwrap());
        assert_eq!(fetch::<Counter>(&fresh, Format::Yaml).unwrap(), Some(counter(0)));
    }
}
