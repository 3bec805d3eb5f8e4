// Loaded datasets, shared per set of load paths

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::Serialize;
use torent_config::paths::{DataPaths, FIRE_INCIDENTS};
use torent_engine::model::{AddressRecord, Deficiency, Inspection, Investigation, Record};
use torent_engine::{build_report, BylawSources, QueryOptions, Report, SearchError};

use crate::csv::{load_records, load_table, RawTable};
use crate::error::LoadError;

/// Every dataset of one data directory. Immutable after [`Catalog::load`];
/// a dataset that failed to load stays unavailable for the catalog's lifetime.
#[derive(Debug)]
pub struct Catalog {
    paths: DataPaths,
    addresses: Result<Vec<AddressRecord>, LoadError>,
    investigations: Result<Vec<Investigation>, LoadError>,
    deficiencies: Result<Vec<Deficiency>, LoadError>,
    inspections: Result<Vec<Inspection>, LoadError>,
    incidents: Result<RawTable, LoadError>,
}

/// Availability of one dataset, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStatus {
    pub dataset: &'static str,
    pub path: PathBuf,
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatasetStatus {
    pub fn is_available(&self) -> bool {
        self.rows.is_some()
    }
}

fn logged<T>(dataset: &str, result: Result<T, LoadError>, len: impl Fn(&T) -> usize) -> Result<T, LoadError> {
    match &result {
        Ok(rows) => tracing::info!(dataset, rows = len(rows), "dataset loaded"),
        Err(error) => tracing::warn!(dataset, %error, "dataset unavailable"),
    }
    result
}

fn typed<R: Record>(path: &Path) -> Result<Vec<R>, LoadError> {
    logged(R::DATASET, load_records::<R>(path), Vec::len)
}

impl Catalog {
    /// Load all datasets. Never fails as a whole: each dataset records its own outcome.
    pub fn load(paths: &DataPaths) -> Self {
        Self {
            paths: paths.clone(),
            addresses: typed(&paths.bylaw_addrs),
            investigations: typed(&paths.bylaw_investigations),
            deficiencies: typed(&paths.bylaw_defs),
            inspections: typed(&paths.fire_inspections),
            incidents: logged(FIRE_INCIDENTS, load_table(FIRE_INCIDENTS, &paths.fire_incidents, &[]), RawTable::len),
        }
    }

    /// The bylaw tables, or the first required one that is unavailable.
    /// A missing deficiencies table is carried inside the sources instead.
    pub fn bylaw_sources(&self) -> Result<BylawSources<'_>, SearchError> {
        Ok(BylawSources {
            addresses: available(&self.addresses)?,
            investigations: available(&self.investigations)?,
            deficiencies: available(&self.deficiencies),
        })
    }

    pub fn fire_inspections(&self) -> Result<&[Inspection], SearchError> {
        available(&self.inspections)
    }

    pub fn fire_incidents(&self) -> Result<&RawTable, SearchError> {
        self.incidents.as_ref().map_err(LoadError::to_search_error)
    }

    /// Run both lookups for `query` against this catalog.
    pub fn search(&self, query: &str, options: &QueryOptions) -> Option<Report> {
        build_report(query, self.bylaw_sources(), self.fire_inspections(), options)
    }

    /// Availability and row count of every dataset, in load order.
    pub fn status(&self) -> Vec<DatasetStatus> {
        let outcomes: [Result<usize, &LoadError>; 5] = [
            self.addresses.as_ref().map(Vec::len),
            self.investigations.as_ref().map(Vec::len),
            self.deficiencies.as_ref().map(Vec::len),
            self.inspections.as_ref().map(Vec::len),
            self.incidents.as_ref().map(RawTable::len),
        ];

        self.paths
            .entries()
            .into_iter()
            .zip(outcomes)
            .map(|((dataset, path), outcome)| DatasetStatus {
                dataset,
                path: path.to_path_buf(),
                rows: outcome.as_ref().ok().copied(),
                error: outcome.err().map(ToString::to_string),
            })
            .collect()
    }
}

fn available<T>(slot: &Result<Vec<T>, LoadError>) -> Result<&[T], SearchError> {
    slot.as_deref().map_err(LoadError::to_search_error)
}

// ---------------------------------------------------------------------------
// Process-wide registry
// ---------------------------------------------------------------------------

static REGISTRY: OnceLock<Mutex<HashMap<DataPaths, Arc<Catalog>>>> = OnceLock::new();

/// The catalog for `paths`, loading it on first use.
///
/// Later calls with the same paths share the same catalog; files are read
/// at most once per process.
pub fn shared(paths: &DataPaths) -> Arc<Catalog> {
    let registry = REGISTRY.get_or_init(Default::default);
    let mut catalogs = registry.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(
        catalogs
            .entry(paths.clone())
            .or_insert_with(|| Arc::new(Catalog::load(paths))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn seed(root: &Path) {
        write(root, "bylaw/Addresses.csv", "AddrLine,INVESTIGATION_ID\n123 MAIN STREET,1\n");
        write(
            root,
            "bylaw/Investigations.csv",
            "INVESTIGATION_ID,Issue,InType,Status,InDate\n1,Pests,Complaint,Closed,2020-01-01\n",
        );
        write(root, "bylaw/Deficiencies.csv", "INVESTIGATION_ID,Desc,Location,Status\n");
        write(
            root,
            "fire/Highrise_Inspections_Data.csv",
            "PropertyAddress,INSPECTIONS_OPENDATE,VIOLATION_DESCRIPTION\n123 MAIN ST,2021-01-01T00:00:00,Alarm\n",
        );
    }

    #[test]
    fn missing_incidents_leaves_lookups_available() {
        let dir = tempdir().unwrap();
        seed(dir.path());
        let catalog = Catalog::load(&DataPaths::under(dir.path()));

        assert!(catalog.bylaw_sources().is_ok());
        assert_eq!(catalog.fire_inspections().unwrap().len(), 1);
        assert!(catalog.fire_incidents().is_err());

        let status = catalog.status();
        let rows: Vec<(&str, Option<usize>)> = status.iter().map(|s| (s.dataset, s.rows)).collect();
        assert_eq!(
            rows,
            vec![
                ("bylaw_addrs", Some(1)),
                ("bylaw_investigations", Some(1)),
                ("bylaw_defs", Some(0)),
                ("fire_inspections", Some(1)),
                ("fire_incidents", None),
            ]
        );
        assert!(status[4].error.as_deref().unwrap().starts_with("file not found"));
    }

    #[test]
    fn missing_deficiencies_still_list_investigations() {
        let dir = tempdir().unwrap();
        seed(dir.path());
        fs::remove_file(dir.path().join("bylaw/Deficiencies.csv")).unwrap();
        let catalog = Catalog::load(&DataPaths::under(dir.path()));

        let sources = catalog.bylaw_sources().unwrap();
        assert!(sources.deficiencies.unwrap_err().to_string().contains("bylaw_defs"));

        let report = catalog.search("123 Main St", &QueryOptions::default()).unwrap();
        let bylaw = report.bylaw.available().unwrap();
        assert_eq!(bylaw.result.records().unwrap().investigations.len(), 1);
        assert!(bylaw.deficiencies_unavailable.is_some());
        assert_eq!(report.resolved_address(), Some("123 MAIN STREET"));
    }

    #[test]
    fn missing_investigations_disable_bylaw_lookup_only() {
        let dir = tempdir().unwrap();
        seed(dir.path());
        fs::remove_file(dir.path().join("bylaw/Investigations.csv")).unwrap();
        let catalog = Catalog::load(&DataPaths::under(dir.path()));

        let err = catalog.bylaw_sources().unwrap_err();
        assert!(err.to_string().contains("bylaw_investigations"));

        let report = catalog.search("123 Main St", &QueryOptions::default()).unwrap();
        assert!(report.bylaw.available().is_none());
        assert_eq!(report.resolved_address(), Some("123 MAIN ST"));
    }

    #[test]
    fn shared_catalog_is_loaded_once_per_paths() {
        let dir = tempdir().unwrap();
        seed(dir.path());
        let paths = DataPaths::under(dir.path());

        let a = shared(&paths);
        // Later file changes are not observed by the shared catalog
        fs::remove_file(dir.path().join("bylaw/Addresses.csv")).unwrap();
        let b = shared(&paths);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(b.bylaw_sources().is_ok());

        let other = tempdir().unwrap();
        let c = shared(&DataPaths::under(other.path()));
        assert!(!Arc::ptr_eq(&a, &c));
        assert!(c.fire_inspections().is_err());
    }
}
