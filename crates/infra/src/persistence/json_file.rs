use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use catalog_products::Product;

use crate::error::{ConfigError, PersistenceError};
use crate::persistence::LocalStorage;

/// JSON file snapshot storage.
///
/// The file holds one pretty-printed array of products. Saves write a sibling
/// temp file and rename it over the target, so a crash mid-save leaves the old
/// snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "products.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LocalStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Vec<Product>>, PersistenceError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        if data.trim().is_empty() {
            return Ok(None);
        }

        let products = serde_json::from_str(&data).map_err(|e| {
            PersistenceError::Corrupt(format!("{}: {e}", self.path.display()))
        })?;
        Ok(Some(products))
    }

    fn save(&self, products: &[Product]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }

        let payload = serde_json::to_string_pretty(products)?;
        let tmp = self.temp_path();
        fs::write(&tmp, payload).map_err(|e| PersistenceError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::io(&self.path, e)),
        }
    }
}

/// Resolve the default snapshot path:
/// `{app_data_dir}/catalog/products.json`.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or(ConfigError::NoDataDir)?;

    dir.push("catalog");
    dir.push("products.json");
    Ok(dir)
}
