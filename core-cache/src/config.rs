//! Cache configuration

/// Default capacity ceiling: 50 MiB.
pub const DEFAULT_MAX_CACHE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Default entry count ceiling.
pub const DEFAULT_MAX_LESSONS: u64 = 100;

/// Default durable-store key prefix for cached entries.
pub const DEFAULT_ENTRY_KEY_PREFIX: &str = "cachedLesson";

/// Default durable-store key for the aggregate metadata record.
pub const DEFAULT_METADATA_KEY: &str = "cacheMetadata";

/// Configuration for the offline lesson cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum total estimated size in bytes (default: 50 MiB)
    pub max_size_bytes: u64,

    /// Maximum number of cached lessons (default: 100)
    pub max_lessons: u64,

    /// Durable-store key prefix for entries; entry keys are `{prefix}:{id}`
    pub entry_key_prefix: String,

    /// Durable-store key for the metadata singleton
    pub metadata_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_CACHE_SIZE_BYTES,
            max_lessons: DEFAULT_MAX_LESSONS,
            entry_key_prefix: DEFAULT_ENTRY_KEY_PREFIX.to_string(),
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum total size.
    pub fn with_max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    /// Set maximum lesson count.
    pub fn with_max_lessons(mut self, count: u64) -> Self {
        self.max_lessons = count;
        self
    }

    /// Set the durable-store key namespace.
    pub fn with_key_namespace(
        mut self,
        entry_prefix: impl Into<String>,
        metadata_key: impl Into<String>,
    ) -> Self {
        self.entry_key_prefix = entry_prefix.into();
        self.metadata_key = metadata_key.into();
        self
    }

    /// Durable-store key for a lesson entry.
    pub fn entry_key(&self, lesson_id: &str) -> String {
        format!("{}:{}", self.entry_key_prefix, lesson_id)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_size_bytes == 0 {
            return Err("max_size_bytes must be greater than 0".to_string());
        }

        if self.max_lessons == 0 {
            return Err("max_lessons must be at least 1".to_string());
        }

        if self.entry_key_prefix.is_empty() {
            return Err("entry_key_prefix cannot be empty".to_string());
        }

        if self.metadata_key.is_empty() {
            return Err("metadata_key cannot be empty".to_string());
        }

        if self.metadata_key.starts_with(&format!("{}:", self.entry_key_prefix)) {
            return Err("metadata_key must not live inside the entry namespace".to_string());
        }

        Ok(())
    }
}
