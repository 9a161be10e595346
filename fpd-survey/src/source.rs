use crate::error::{DashboardError, Result};
use crate::loader::{clean_csv, CleanedTable};
use log::{info, warn};
use reqwest::{Client, StatusCode};

/// Fetch the survey table from `url` and clean it.
///
/// A single attempt is made: the table is only fetched at startup and a
/// failure there is fatal.
pub async fn fetch_cleaned_table(client: &Client, url: &str) -> Result<CleanedTable> {
    info!("Fetching survey data from {}", url);
    let response = client.get(url).send().await?;
    if response.status() != StatusCode::OK {
        warn!("Bad response status for {}: {}", url, response.status());
        return Err(DashboardError::DataUnavailable(format!(
            "bad response status {} from {}",
            response.status(),
            url
        )));
    }
    let body = response.bytes().await?;
    if body.len() <= 2 {
        warn!("Empty response for {}", url);
        return Err(DashboardError::DataUnavailable(format!(
            "empty response from {}",
            url
        )));
    }
    info!("Fetched {} bytes of survey data", body.len());
    clean_csv(&body)
}
