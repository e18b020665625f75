//! Per-call and per-store options for content operations

use serde::{Deserialize, Serialize};

use super::Platform;

/// Options accepted by every content operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOpts {
    /// Expected byte length of the content, if known
    pub size: Option<u64>,
}

impl ReadOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the expected byte length
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Settings shared by every operation against one store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContentConfig {
    /// Whose error conventions the existence check follows
    #[serde(default)]
    pub platform: Platform,

    /// Cap on concurrent candidate probes when a descriptor lists several
    /// digests for one algorithm. `None` probes all of them at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fanout: Option<usize>,
}

impl ContentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_max_fanout(mut self, max_fanout: usize) -> Self {
        self.max_fanout = Some(max_fanout);
        self
    }
}
