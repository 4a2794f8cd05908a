// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-channel schema registry.
//!
//! Schemas are keyed by `(channel, checksum)`. Registering the same key twice
//! returns the handle created the first time without parsing the definition
//! again. The registry lives for one file-load session and is reset when a
//! new file is opened.

use super::error::{CodecError, Result};
use crate::schema::{self, MessageLayout};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Registered schema of one channel. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSchema {
    /// Channel (topic) name
    pub channel: String,
    /// Content checksum (md5sum in ROS1 bags)
    pub checksum: String,
    /// Message type name
    pub type_name: String,
    /// Original definition text
    pub definition: String,
    /// Resolved field layout
    pub layout: Arc<MessageLayout>,
}

/// Shared handle to a registered schema.
pub type SchemaHandle = Arc<ChannelSchema>;

/// Thread-safe registry of channel schemas.
///
/// Uses RwLock for concurrent read access with exclusive write access.
pub struct SchemaRegistry {
    inner: RwLock<SchemaRegistryInner>,
    parse_count: AtomicU64,
}

#[derive(Default)]
struct SchemaRegistryInner {
    by_key: HashMap<(String, String), SchemaHandle>,
    /// Latest registered key per channel
    by_channel: HashMap<String, (String, String)>,
}

impl SchemaRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SchemaRegistryInner::default()),
            parse_count: AtomicU64::new(0),
        }
    }

    /// Register a channel schema.
    ///
    /// Idempotent for an identical `(channel, checksum)` pair: the existing
    /// handle is returned and `definition` is not parsed again. Fails with
    /// `MalformedSchema` when the definition cannot be parsed or resolved;
    /// nothing is stored in that case.
    pub fn register(
        &self,
        channel: &str,
        checksum: &str,
        type_name: &str,
        definition: &str,
    ) -> Result<SchemaHandle> {
        let key = (channel.to_string(), checksum.to_string());

        {
            let inner = self.read()?;
            if let Some(handle) = inner.by_key.get(&key) {
                return Ok(Arc::clone(handle));
            }
        }

        self.parse_count.fetch_add(1, Ordering::Relaxed);
        let layout = schema::parse_layout(type_name, definition).map_err(|e| match e {
            CodecError::MalformedSchema { .. } => e,
            other => CodecError::malformed_schema(type_name, other.to_string()),
        })?;

        let handle = Arc::new(ChannelSchema {
            channel: channel.to_string(),
            checksum: checksum.to_string(),
            type_name: type_name.to_string(),
            definition: definition.to_string(),
            layout,
        });

        let mut inner = self.write()?;
        // Another writer may have won the race; keep the first handle.
        let handle = Arc::clone(inner.by_key.entry(key.clone()).or_insert(handle));
        inner.by_channel.insert(channel.to_string(), key);
        Ok(handle)
    }

    /// Get the schema most recently registered for `channel`.
    pub fn get(&self, channel: &str) -> Option<SchemaHandle> {
        let inner = self.inner.read().ok()?;
        let key = inner.by_channel.get(channel)?;
        inner.by_key.get(key).cloned()
    }

    /// Get the schema registered under an exact key.
    pub fn get_exact(&self, channel: &str, checksum: &str) -> Option<SchemaHandle> {
        let inner = self.inner.read().ok()?;
        inner
            .by_key
            .get(&(channel.to_string(), checksum.to_string()))
            .cloned()
    }

    /// Schema for a record: the exact `(channel, checksum)` entry when the
    /// checksum is known and registered, else the channel's latest schema.
    pub fn resolve(&self, channel: &str, checksum: Option<&str>) -> Option<SchemaHandle> {
        checksum
            .and_then(|c| self.get_exact(channel, c))
            .or_else(|| self.get(channel))
    }

    /// Copy the entries of the channels accepted by `keep`.
    pub fn snapshot<F>(&self, keep: F) -> SchemaSnapshot
    where
        F: Fn(&str) -> bool,
    {
        let mut snapshot = SchemaSnapshot::default();
        let Ok(inner) = self.inner.read() else {
            return snapshot;
        };
        for ((channel, checksum), handle) in &inner.by_key {
            if keep(channel) {
                snapshot
                    .by_key
                    .insert((channel.clone(), checksum.clone()), Arc::clone(handle));
            }
        }
        for (channel, key) in &inner.by_channel {
            if let Some(handle) = inner.by_key.get(key).filter(|_| keep(channel)) {
                snapshot.by_channel.insert(channel.clone(), Arc::clone(handle));
            }
        }
        snapshot
    }

    /// Check if a channel has a schema.
    pub fn contains(&self, channel: &str) -> bool {
        self.get(channel).is_some()
    }

    /// Get all registered channel names, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.inner.read() {
            Ok(inner) => inner.by_channel.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    /// Clear all schemas, for a new file.
    pub fn reset(&self) -> Result<()> {
        let mut inner = self.write()?;
        inner.by_key.clear();
        inner.by_channel.clear();
        Ok(())
    }

    /// Number of registered `(channel, checksum)` entries.
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.by_key.len()).unwrap_or(0)
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many definitions have been parsed since creation.
    pub fn parse_count(&self) -> u64 {
        self.parse_count.load(Ordering::Relaxed)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, SchemaRegistryInner>> {
        self.inner
            .read()
            .map_err(|e| CodecError::Other(format!("Registry lock poisoned: {e}")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, SchemaRegistryInner>> {
        self.inner
            .write()
            .map_err(|e| CodecError::Other(format!("Registry lock poisoned: {e}")))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock-free, read-only copy of part of a registry.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    by_key: HashMap<(String, String), SchemaHandle>,
    by_channel: HashMap<String, SchemaHandle>,
}

impl SchemaSnapshot {
    /// Same lookup as [`SchemaRegistry::resolve`].
    pub fn resolve(&self, channel: &str, checksum: Option<&str>) -> Option<SchemaHandle> {
        checksum
            .and_then(|c| self.by_key.get(&(channel.to_string(), c.to_string())))
            .or_else(|| self.by_channel.get(channel))
            .cloned()
    }

    /// Number of `(channel, checksum)` entries.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let registry = SchemaRegistry::new();
        let handle = registry
            .register("/odom", "abc", "test/Odom", "float64 x")
            .unwrap();

        assert_eq!(handle.type_name, "test/Odom");
        assert!(registry.contains("/odom"));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get("/odom").unwrap(), &handle));
        assert!(registry.get_exact("/odom", "abc").is_some());
        assert!(registry.get_exact("/odom", "zzz").is_none());
    }

    #[test]
    fn test_register_idempotent() {
        let registry = SchemaRegistry::new();
        let first = registry
            .register("/odom", "abc", "test/Odom", "float64 x")
            .unwrap();
        // Same key, different text: the definition must not be parsed.
        let second = registry
            .register("/odom", "abc", "test/Odom", "not valid ][")
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.parse_count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_new_checksum_replaces_channel_lookup() {
        let registry = SchemaRegistry::new();
        registry.register("/a", "v1", "t/A", "int32 x").unwrap();
        let v2 = registry.register("/a", "v2", "t/A", "int64 x").unwrap();

        assert_eq!(registry.len(), 2);
        assert!(Arc::ptr_eq(&registry.get("/a").unwrap(), &v2));
        assert_eq!(registry.parse_count(), 2);
    }

    #[test]
    fn test_resolve_prefers_exact_checksum() {
        let registry = SchemaRegistry::new();
        let v1 = registry.register("/a", "v1", "t/A", "int32 x").unwrap();
        let v2 = registry.register("/a", "v2", "t/A", "float64 y").unwrap();

        assert!(Arc::ptr_eq(&registry.resolve("/a", Some("v1")).unwrap(), &v1));
        assert!(Arc::ptr_eq(&registry.resolve("/a", Some("zzz")).unwrap(), &v2));
        assert!(Arc::ptr_eq(&registry.resolve("/a", None).unwrap(), &v2));
        assert!(registry.resolve("/b", Some("v1")).is_none());
    }

    #[test]
    fn test_snapshot_keeps_selected_channels() {
        let registry = SchemaRegistry::new();
        let v1 = registry.register("/a", "v1", "t/A", "int32 x").unwrap();
        registry.register("/a", "v2", "t/A", "float64 y").unwrap();
        registry.register("/b", "b", "t/B", "int32 z").unwrap();

        let snapshot = registry.snapshot(|channel| channel == "/a");

        assert_eq!(snapshot.len(), 2);
        assert!(Arc::ptr_eq(&snapshot.resolve("/a", Some("v1")).unwrap(), &v1));
        assert_eq!(snapshot.resolve("/a", None).unwrap().checksum, "v2");
        assert!(snapshot.resolve("/b", None).is_none());
    }

    #[test]
    fn test_malformed_is_not_stored() {
        let registry = SchemaRegistry::new();
        let err = registry
            .register("/bad", "x", "t/Bad", "int32[ broken")
            .unwrap_err();
        assert!(matches!(err, CodecError::MalformedSchema { .. }));
        assert!(!registry.contains("/bad"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reset() {
        let registry = SchemaRegistry::new();
        registry.register("/a", "1", "t/A", "int32 x").unwrap();
        registry.register("/b", "2", "t/B", "int32 y").unwrap();
        assert_eq!(registry.channels(), vec!["/a", "/b"]);

        registry.reset().unwrap();
        assert!(registry.is_empty());
        assert!(registry.get("/a").is_none());
    }
}
