// Order persistence module
// Keeps every accepted order in a single JSON array file, newest first

use crate::orders::Order;
use chrono::Utc;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Error types for persistence operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// File I/O error
    IoError(String),
    /// JSON serialization/deserialization error
    JsonError(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::IoError(msg) => write!(f, "IO Error: {}", msg),
            PersistenceError::JsonError(msg) => write!(f, "JSON Error: {}", msg),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// File-backed, most-recent-first order collection
///
/// Every append re-reads and rewrites the whole file. Appends are serialized
/// through `write_lock`, so concurrent submissions never overwrite each other,
/// and each rewrite goes through a temporary file plus rename.
#[derive(Debug)]
pub struct OrderStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl OrderStore {
    /// Create a store backed by `path` (the file need not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole collection
    ///
    /// Entries are returned as stored, including ones that are not orders.
    ///
    /// # Returns
    /// * `Ok(Vec<Value>)` - Entries newest first; empty if the file is missing
    ///   or is not a JSON array (such a file is moved aside first)
    /// * `Err(PersistenceError)` - If the file exists but cannot be read
    pub async fn load(&self) -> Result<Vec<Value>, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        self.read_collection().await
    }

    /// Insert `order` at the front of the collection and rewrite the file
    ///
    /// # Arguments
    /// * `order` - Accepted order, stored exactly as given
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of orders in the collection afterwards
    /// * `Err(PersistenceError)` - If the collection could not be written
    pub async fn append(&self, order: &Order) -> Result<usize, PersistenceError> {
        let _guard = self.write_lock.lock().await;

        let mut orders = self.read_collection().await?;
        orders.insert(0, Value::from(order.clone()));
        self.write_collection(&orders).await?;

        debug!(path = %self.path.display(), count = orders.len(), "Order collection written");
        Ok(orders.len())
    }

    async fn read_collection(&self) -> Result<Vec<Value>, PersistenceError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PersistenceError::IoError(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let reason = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(entries)) => return Ok(entries),
            Ok(_) => "top-level value is not an array".to_string(),
            Err(e) => e.to_string(),
        };
        self.quarantine(&reason).await?;
        Ok(Vec::new())
    }

    /// Move an unparseable store aside so the next write cannot destroy it
    async fn quarantine(&self, reason: &str) -> Result<(), PersistenceError> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "orders.json".to_string());
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let target = self
            .path
            .with_file_name(format!("{}.corrupt-{}", file_name, stamp));

        fs::rename(&self.path, &target).await.map_err(|e| {
            PersistenceError::IoError(format!(
                "Failed to move corrupt store {} aside: {}",
                self.path.display(),
                e
            ))
        })?;

        warn!(
            path = %self.path.display(),
            quarantined = %target.display(),
            reason = %reason,
            "Order store was unreadable; starting a fresh collection"
        );
        Ok(())
    }

    async fn write_collection(&self, orders: &[Value]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PersistenceError::IoError(e.to_string()))?;
                info!(dir = %parent.display(), "Created order store directory");
            }
        }

        let json = serde_json::to_vec_pretty(orders)
            .map_err(|e| PersistenceError::JsonError(e.to_string()))?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "orders.json".to_string());
        let temp_path = self
            .path
            .with_file_name(format!(".{}.tmp-{}", file_name, uuid::Uuid::new_v4()));

        fs::write(&temp_path, json)
            .await
            .map_err(|e| PersistenceError::IoError(e.to_string()))?;

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(PersistenceError::IoError(e.to_string()));
        }

        Ok(())
    }
}
