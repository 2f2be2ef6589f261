//! Dataset acquisition with process-lifetime memoization.

use std::fs::File;
use std::io::BufReader;
use std::sync::{Arc, OnceLock};

use log::{debug, info};
use reqwest::blocking::Client;

use crate::data::parse::parse_dataset;
use crate::domain::{DEFAULT_DATA_URL, RawDataset, SourceLocation};
use crate::error::DataError;

/// Environment variable that overrides the default dataset URL.
pub const URL_ENV_VAR: &str = "COVID_DASH_URL";

/// Loads the raw table once and hands out shared references afterwards.
///
/// A failed load leaves the cache empty; nothing is retried automatically.
pub struct DatasetSource {
    location: SourceLocation,
    cache: OnceLock<Arc<RawDataset>>,
}

impl DatasetSource {
    pub fn new(location: SourceLocation) -> Self {
        Self {
            location,
            cache: OnceLock::new(),
        }
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Eagerly load the dataset.
    pub fn initialize(&self) -> Result<(), DataError> {
        self.get_or_load().map(|_| ())
    }

    /// Return the memoized dataset, loading it on first use.
    pub fn get_or_load(&self) -> Result<Arc<RawDataset>, DataError> {
        if let Some(dataset) = self.cache.get() {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(self.load()?);
        Ok(Arc::clone(self.cache.get_or_init(|| dataset)))
    }

    fn load(&self) -> Result<RawDataset, DataError> {
        info!("Loading dataset from {}", self.location);
        let dataset = match &self.location {
            SourceLocation::Remote(url) => load_remote(url)?,
            SourceLocation::File(path) => {
                let file = File::open(path).map_err(|e| DataError::Fetch {
                    location: path.display().to_string(),
                    message: e.to_string(),
                })?;
                parse_dataset(BufReader::new(file))?
            }
        };
        info!(
            "Loaded {} rows across {} locations",
            dataset.len(),
            dataset.locations().len()
        );
        Ok(dataset)
    }
}

/// `COVID_DASH_URL` (from the environment or `.env`), else the public OWID CSV.
pub fn location_from_env() -> SourceLocation {
    dotenvy::dotenv().ok();
    let url = std::env::var(URL_ENV_VAR).unwrap_or_else(|_| DEFAULT_DATA_URL.to_string());
    SourceLocation::Remote(url)
}

fn load_remote(url: &str) -> Result<RawDataset, DataError> {
    let fetch_err = |message: String| DataError::Fetch {
        location: url.to_string(),
        message,
    };

    let resp = Client::new()
        .get(url)
        .send()
        .map_err(|e| fetch_err(format!("request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(fetch_err(format!("request failed with status {}", resp.status())));
    }

    let body = resp
        .bytes()
        .map_err(|e| fetch_err(format!("failed to read response body: {e}")))?;
    debug!("Fetched {} bytes", body.len());

    parse_dataset(body.as_ref())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use httpmock::prelude::*;

    use super::*;
    use crate::domain::Column;

    const CSV: &str = "\
location,date,total_cases,total_deaths,total_vaccinations
United States,2021-01-01,100,5,
United States,2021-01-03,150,,42
Peru,2021-01-02,7,1,
";

    #[test]
    fn remote_dataset_is_fetched_once() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/owid.csv");
            then.status(200).header("content-type", "text/csv").body(CSV);
        });

        let source = DatasetSource::new(SourceLocation::Remote(server.url("/owid.csv")));
        assert_eq!(source.location(), &SourceLocation::Remote(server.url("/owid.csv")));
        assert!(!source.is_loaded());

        source.initialize().unwrap();
        let first = source.get_or_load().unwrap();
        let second = source.get_or_load().unwrap();

        mock.assert_hits(1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 3);
        assert_eq!(first.locations(), &["Peru".to_string(), "United States".to_string()]);
    }

    #[test]
    fn http_error_status_is_a_fetch_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.csv");
            then.status(404);
        });

        let source = DatasetSource::new(SourceLocation::Remote(server.url("/missing.csv")));
        let err = source.get_or_load().unwrap_err();
        assert!(matches!(err, DataError::Fetch { .. }));
        assert!(!source.is_loaded());
    }

    #[test]
    fn unreachable_host_is_a_fetch_error() {
        // Bind then drop a listener to get a local port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let source = DatasetSource::new(SourceLocation::Remote(format!("http://127.0.0.1:{port}/owid.csv")));
        match source.get_or_load() {
            Err(DataError::Fetch { location, message }) => {
                assert!(location.contains(&port.to_string()));
                assert!(message.starts_with("request failed"));
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
        assert!(!source.is_loaded());
    }

    #[test]
    fn malformed_body_is_a_format_error_and_not_cached() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/bad.csv");
            then.status(200).body("<html>not a csv</html>\n");
        });

        let source = DatasetSource::new(SourceLocation::Remote(server.url("/bad.csv")));
        assert!(matches!(source.get_or_load(), Err(DataError::DataFormat(_))));
        assert!(matches!(source.get_or_load(), Err(DataError::DataFormat(_))));
        mock.assert_hits(2);
    }

    #[test]
    fn local_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{CSV}").unwrap();

        let source = DatasetSource::new(SourceLocation::File(file.path().to_path_buf()));
        let ds = source.get_or_load().unwrap();
        assert!(ds.has_column(Column::TotalVaccinations));
        assert!(!ds.has_column(Column::HospPatients));
    }

    #[test]
    fn missing_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DatasetSource::new(SourceLocation::File(dir.path().join("nope.csv")));
        assert!(matches!(source.get_or_load(), Err(DataError::Fetch { .. })));
    }
}
