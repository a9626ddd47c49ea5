use std::time::Duration;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Settings shared by the library and its frontends
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct MazeConfig {
    /// Number of cell columns
    pub width: usize,
    /// Number of cell rows
    pub height: usize,
    /// Delay between two animated BFS layers
    pub tempo_ms: u64,
    /// Seed for the maze generator, random when absent
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 48,
            height: 48,
            tempo_ms: 10,
            seed: None,
        }
    }
}

impl MazeConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.width == 0 || self.height == 0 {
            bail!(
                "maze dimensions must be positive, got {}x{}",
                self.width,
                self.height
            );
        }
        Ok(())
    }

    pub fn tempo(&self) -> Duration {
        Duration::from_millis(self.tempo_ms)
    }
}
