//! Log configuration.

/// Default cap substituted when a byte limit is configured as zero.
pub const DEFAULT_MAX_BYTES: u64 = 1024;

/// Per-segment limits and placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentConfig {
    /// Rollover threshold on store size in bytes.
    pub max_store_bytes: u64,
    /// Rollover threshold on index size in bytes. Also the size of the
    /// region reserved for the index memory mapping while a segment is
    /// open.
    pub max_index_bytes: u64,
    /// Base offset of the very first segment when bootstrapping an empty
    /// directory.
    pub initial_offset: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: DEFAULT_MAX_BYTES,
            max_index_bytes: DEFAULT_MAX_BYTES,
            initial_offset: 0,
        }
    }
}

/// Configuration for a [`Log`](crate::Log).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Segment limits.
    pub segment: SegmentConfig,
}

impl LogConfig {
    /// Creates a configuration with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store rollover threshold.
    pub fn with_max_store_bytes(mut self, bytes: u64) -> Self {
        self.segment.max_store_bytes = bytes;
        self
    }

    /// Sets the index rollover threshold.
    pub fn with_max_index_bytes(mut self, bytes: u64) -> Self {
        self.segment.max_index_bytes = bytes;
        self
    }

    /// Sets the base offset for a freshly bootstrapped log.
    pub fn with_initial_offset(mut self, offset: u64) -> Self {
        self.segment.initial_offset = offset;
        self
    }

    /// Returns a copy with zero byte caps replaced by [`DEFAULT_MAX_BYTES`].
    ///
    /// Each cap defaults independently.
    pub(crate) fn normalized(mut self) -> Self {
        if self.segment.max_store_bytes == 0 {
            self.segment.max_store_bytes = DEFAULT_MAX_BYTES;
        }
        if self.segment.max_index_bytes == 0 {
            self.segment.max_index_bytes = DEFAULT_MAX_BYTES;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_caps_default_independently() {
        let config = LogConfig::new()
            .with_max_store_bytes(0)
            .with_max_index_bytes(64)
            .normalized();

        assert_eq!(config.segment.max_store_bytes, DEFAULT_MAX_BYTES);
        assert_eq!(config.segment.max_index_bytes, 64);

        let config = LogConfig::new()
            .with_max_store_bytes(64)
            .with_max_index_bytes(0)
            .normalized();

        assert_eq!(config.segment.max_store_bytes, 64);
        assert_eq!(config.segment.max_index_bytes, DEFAULT_MAX_BYTES);
    }
}
