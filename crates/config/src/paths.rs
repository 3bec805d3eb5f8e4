// Dataset file locations

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use torent_engine::model::{AddressRecord, Deficiency, Inspection, Investigation, Record};

/// Dataset key of the untyped fire incidents table.
pub const FIRE_INCIDENTS: &str = "fire_incidents";

/// Per-dataset file paths, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetPaths {
    pub bylaw_addrs: PathBuf,
    pub bylaw_investigations: PathBuf,
    pub bylaw_defs: PathBuf,
    pub fire_inspections: PathBuf,
    pub fire_incidents: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            bylaw_addrs: PathBuf::from("bylaw/Addresses.csv"),
            bylaw_investigations: PathBuf::from("bylaw/Investigations.csv"),
            bylaw_defs: PathBuf::from("bylaw/Deficiencies.csv"),
            fire_inspections: PathBuf::from("fire/Highrise_Inspections_Data.csv"),
            fire_incidents: PathBuf::from("fire/Fire Incidents Data.csv"),
        }
    }
}

/// Resolved file path of every dataset. Also the key of the catalog registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataPaths {
    pub bylaw_addrs: PathBuf,
    pub bylaw_investigations: PathBuf,
    pub bylaw_defs: PathBuf,
    pub fire_inspections: PathBuf,
    pub fire_incidents: PathBuf,
}

impl DataPaths {
    /// Join each relative path onto `data_dir`. Absolute entries are kept as-is.
    pub fn resolve(data_dir: &Path, relative: &DatasetPaths) -> Self {
        Self {
            bylaw_addrs: data_dir.join(&relative.bylaw_addrs),
            bylaw_investigations: data_dir.join(&relative.bylaw_investigations),
            bylaw_defs: data_dir.join(&relative.bylaw_defs),
            fire_inspections: data_dir.join(&relative.fire_inspections),
            fire_incidents: data_dir.join(&relative.fire_incidents),
        }
    }

    /// Default file layout under `data_dir`.
    pub fn under(data_dir: impl AsRef<Path>) -> Self {
        Self::resolve(data_dir.as_ref(), &DatasetPaths::default())
    }

    /// (dataset key, path) in load order.
    pub fn entries(&self) -> [(&'static str, &Path); 5] {
        [
            (AddressRecord::DATASET, &self.bylaw_addrs),
            (Investigation::DATASET, &self.bylaw_investigations),
            (Deficiency::DATASET, &self.bylaw_defs),
            (Inspection::DATASET, &self.fire_inspections),
            (FIRE_INCIDENTS, &self.fire_incidents),
        ]
    }
}
