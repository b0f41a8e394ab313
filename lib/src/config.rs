//! Defines the configuration of a [`Store`](crate::store::Store): how much
//! buffering sits between stream producers and consumers.

use crate::stream::Capacity;
use anyhow::Result;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::path::Path;

fn default_match_capacity() -> Capacity {
    Capacity::Bounded(10)
}

fn default_import_capacity() -> Capacity {
    Capacity::Bounded(1024)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Builder)]
#[builder(pattern = "owned", default)]
pub struct StoreConfig {
    // buffer between a match producer thread and its consumer
    #[serde(default = "default_match_capacity")]
    pub match_capacity: Capacity,
    // buffer used by readers that feed quads into a store
    #[serde(default = "default_import_capacity")]
    pub import_capacity: Capacity,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            match_capacity: default_match_capacity(),
            import_capacity: default_import_capacity(),
        }
    }
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn from_file(file: &Path) -> Result<Self> {
        let file = std::fs::File::open(file)?;
        let reader = BufReader::new(file);
        let config: StoreConfig = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Prints out the current StoreConfig in a clear and readable way for command line output.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  Match Capacity: {}", self.match_capacity);
        println!("  Import Capacity: {}", self.import_capacity);
    }
}
