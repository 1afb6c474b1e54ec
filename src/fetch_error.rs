#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Seeing table not found in the source HTML")]
    TableNotFound,
    #[error("Table body missing from the seeing table")]
    TableBodyMissing,
    #[error("No hourly rows were parsed from the page")]
    NoReadings,
}

impl FetchError {
    /// True for failures reaching the source (unreachable, timeout, non-2xx)
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Request(_))
    }
}
