//! [`Storage`] definitions.

use std::{
    collections::HashMap,
    fmt, fs, io,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use tracing as log;

/// Synchronous key-value storage of serialized blobs.
pub trait Storage: fmt::Debug {
    /// Returns the blob stored under the provided `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores the provided `value` blob under the provided `key`.
    ///
    /// # Errors
    ///
    /// If the blob cannot be written.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// [`Storage`] keeping one `<namespace>.<key>.json` file per key inside a
/// directory.
#[derive(Clone, Debug)]
pub struct Directory {
    /// Directory the files are kept in.
    dir: PathBuf,

    /// Prefix of every file name.
    namespace: String,
}

impl Directory {
    /// Creates a new [`Directory`] [`Storage`].
    ///
    /// The directory itself is created lazily, on the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            namespace: namespace.into(),
        }
    }

    /// Returns the path of the file holding the provided `key`.
    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{key}.json", self.namespace))
    }
}

impl Storage for Directory {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(blob) => Some(blob),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("cannot read `{}`: {e}", path.display());
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Replace atomically, so a crash never leaves a truncated blob.
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(tmp, path)
    }
}

/// In-process [`Storage`], lost once dropped.
#[derive(Debug, Default)]
pub struct Memory {
    /// Stored blobs.
    blobs: Mutex<HashMap<String, String>>,
}

impl Storage for Memory {
    fn get(&self, key: &str) -> Option<String> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        _ = self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use super::{Directory, Memory, Storage as _};

    #[test]
    fn directory_keeps_namespaced_files() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Directory::new(tmp.path().join("data"), "site");

        assert_eq!(storage.get("faqs"), None);

        storage.set("faqs", "[]").unwrap();
        storage.set("faqs", r#"[{"id":1,"q":"Q","a":"A"}]"#).unwrap();

        assert_eq!(
            storage.get("faqs").as_deref(),
            Some(r#"[{"id":1,"q":"Q","a":"A"}]"#),
        );
        assert!(tmp.path().join("data/site.faqs.json").is_file());
        assert!(!tmp.path().join("data/site.faqs.json.tmp").exists());

        let other = Directory::new(tmp.path().join("data"), "other");
        assert_eq!(other.get("faqs"), None);
    }

    #[test]
    fn memory_overwrites_blobs() {
        let storage = Memory::default();

        storage.set("profile", "{}").unwrap();
        storage.set("profile", "null").unwrap();

        assert_eq!(storage.get("profile").as_deref(), Some("null"));
        assert_eq!(storage.get("socials"), None);
    }
}
