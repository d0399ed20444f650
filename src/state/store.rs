//! Load/merge/save of the persistent document

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::warn;

use super::document::default_state;
use crate::error::Result;
use crate::paths::HostPaths;

/// Recursive structural merge of two JSON values
///
/// Objects merge key-wise; any other pairing resolves to `updates`. Pure and
/// storage-independent so merge semantics can be tested on their own.
#[must_use]
pub fn merge(base: &Value, updates: &Value) -> Value {
    match (base, updates) {
        (Value::Object(base_map), Value::Object(update_map)) => {
            let mut out = base_map.clone();
            for (key, value) in update_map {
                let merged = match out.get(key) {
                    Some(existing) => merge(existing, value),
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Object(out)
        }
        _ => updates.clone(),
    }
}

/// Handle to the durable state document
///
/// Constructed once per invocation and passed into each engine. Reads never
/// fail: an absent or corrupt document resolves to the defaults. Writes go
/// through a temp file and an atomic rename.
#[derive(Debug)]
pub struct StateStore {
    dir: PathBuf,
    file: PathBuf,
}

impl StateStore {
    /// Create a store over the invocation's state directory
    #[must_use]
    pub fn new(paths: &HostPaths) -> Self {
        Self {
            dir: paths.state_dir.clone(),
            file: paths.state_file(),
        }
    }

    /// Load the document, layered over the defaults
    #[must_use]
    pub fn load(&self) -> Value {
        let baseline = default_state();
        let raw = match fs::read_to_string(&self.file) {
            Ok(raw) => raw,
            Err(_) => return baseline,
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(data @ Value::Object(_)) => merge(&baseline, &data),
            Ok(_) | Err(_) => {
                warn!(file = %self.file.display(), "state document unreadable, using defaults");
                baseline
            }
        }
    }

    /// Merge `updates` into the current document and persist the result
    ///
    /// # Errors
    ///
    /// Propagates I/O and serialization failures from the commit; the
    /// previous on-disk document is left intact in that case.
    pub fn update(&self, updates: &Value) -> Result<Value> {
        let merged = merge(&self.load(), updates);
        self.save(&merged)?;
        Ok(merged)
    }

    /// Atomically replace the on-disk document
    ///
    /// # Errors
    ///
    /// Propagates I/O and serialization failures.
    pub fn save(&self, state: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.file.with_extension("tmp");
        let mut body = serde_json::to_string_pretty(state)?;
        body.push('\n');
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.file)?;
        Ok(())
    }
}
