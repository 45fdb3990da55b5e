use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tafel_engine::RepoError;
use tracing::{debug, warn};

/// A directory of `<id>.json` documents of one type.
#[derive(Debug, Clone)]
pub(crate) struct JsonDir<T> {
    dir: PathBuf,
    entity_type: &'static str,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonDir<T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn new(dir: impl Into<PathBuf>, entity_type: &'static str) -> Self {
        Self {
            dir: dir.into(),
            entity_type,
            _doc: PhantomData,
        }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, RepoError> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(RepoError::Storage {
                operation: "path_for",
                message: format!("{} ID {id:?} cannot be used as a file name", self.entity_type),
            });
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    pub(crate) fn write(&self, id: &str, doc: &T) -> Result<(), RepoError> {
        let path = self.path_for(id)?;
        fs::create_dir_all(&self.dir).map_err(|e| storage("create_dir", &self.dir, e))?;
        let json =
            serde_json::to_string_pretty(doc).map_err(|e| RepoError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| storage("write", &path, e))?;
        debug!(path = %path.display(), "wrote document");
        Ok(())
    }

    pub(crate) fn read(&self, id: &str) -> Result<Option<T>, RepoError> {
        let path = self.path_for(id)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage("read", &path, e)),
        };
        let doc = serde_json::from_str(&text).map_err(|e| {
            RepoError::Serialization(format!("{}: {e}", path.display()))
        })?;
        Ok(Some(doc))
    }

    pub(crate) fn exists(&self, id: &str) -> Result<bool, RepoError> {
        Ok(self.path_for(id)?.is_file())
    }

    /// Every readable document, ordered by file name. Unreadable or
    /// malformed files are skipped.
    pub(crate) fn read_all(&self) -> Result<Vec<T>, RepoError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage("list", &self.dir, e)),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut docs: Vec<T> = Vec::with_capacity(paths.len());
        for path in paths {
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));
            match parsed {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable {}", self.entity_type),
            }
        }
        Ok(docs)
    }

    pub(crate) fn remove(&self, id: &str) -> Result<(), RepoError> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed document");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(self.not_found(id)),
            Err(e) => Err(storage("delete", &path, e)),
        }
    }

    pub(crate) fn not_found(&self, id: &str) -> RepoError {
        RepoError::NotFound {
            entity_type: self.entity_type,
            id: id.to_string(),
        }
    }
}

fn storage(operation: &'static str, path: &Path, e: std::io::Error) -> RepoError {
    RepoError::Storage {
        operation,
        message: format!("{}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tafel_core::SavedTemplate;
    use tempfile::TempDir;

    fn docs(tmp: &TempDir) -> JsonDir<SavedTemplate> {
        JsonDir::new(tmp.path().join("docs"), "template")
    }

    fn doc(id: &str) -> SavedTemplate {
        SavedTemplate::new(id, id.to_uppercase(), "", "text").unwrap()
    }

    #[test]
    fn rejects_path_like_ids() {
        let tmp = TempDir::new().unwrap();
        let dir = docs(&tmp);
        for id in ["", "../escape", "a/b", "a\\b", ".hidden"] {
            assert!(
                matches!(dir.write(id, &doc("x")), Err(RepoError::Storage { operation: "path_for", .. })),
                "{id:?} should be rejected"
            );
            assert!(dir.read(id).is_err());
        }
        assert!(!dir.dir().exists());
    }

    #[test]
    fn write_creates_directory_and_reads_back() {
        let tmp = TempDir::new().unwrap();
        let dir = docs(&tmp);
        assert_eq!(dir.read("a").unwrap(), None);
        assert!(!dir.exists("a").unwrap());

        dir.write("a", &doc("a")).unwrap();
        assert!(dir.dir().join("a.json").is_file());
        assert!(dir.exists("a").unwrap());
        assert_eq!(dir.read("a").unwrap(), Some(doc("a")));
    }

    #[test]
    fn read_all_sorts_and_skips_malformed() {
        let tmp = TempDir::new().unwrap();
        let dir = docs(&tmp);
        assert!(dir.read_all().unwrap().is_empty());

        dir.write("b", &doc("b")).unwrap();
        dir.write("a", &doc("a")).unwrap();
        fs::write(dir.dir().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.dir().join("notes.txt"), "ignored").unwrap();

        let ids: Vec<String> = dir
            .read_all()
            .unwrap()
            .iter()
            .map(|d| d.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn read_reports_malformed_document() {
        let tmp = TempDir::new().unwrap();
        let dir = docs(&tmp);
        fs::create_dir_all(dir.dir()).unwrap();
        fs::write(dir.dir().join("bad.json"), "[]").unwrap();
        assert!(matches!(dir.read("bad"), Err(RepoError::Serialization(_))));
    }

    #[test]
    fn remove_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let dir = docs(&tmp);
        dir.write("a", &doc("a")).unwrap();
        dir.remove("a").unwrap();
        assert!(matches!(
            dir.remove("a"),
            Err(RepoError::NotFound { entity_type: "template", .. })
        ));
    }
}
