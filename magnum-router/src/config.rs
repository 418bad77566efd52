//! Router configuration

use serde::{Deserialize, Serialize};

/// Dimensions and tuning for a router session.
///
/// Tables are sized once from these counts and never grow; reconfigure
/// by constructing a new router. Source and destination IDs are 1-based
/// on the wire, so each table carries one extra reserved slot at
/// index 0. A typical deployment runs 17 levels: one video plane plus
/// 16 audio channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Number of sources the matrix exposes.
    pub source_count: u32,
    /// Number of destinations the matrix exposes.
    pub destination_count: u32,
    /// Number of signal levels routed per destination.
    pub level_count: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            source_count: 0,
            destination_count: 0,
            level_count: 17,
        }
    }
}
