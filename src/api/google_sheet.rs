//! Implements `Source` for a Google sheet that is shared publicly or published to the web.
//!
//! No credentials are involved. The sheet is downloaded through its CSV export URL, which works
//! for any sheet that is viewable by "anyone with the link".

use crate::api::{csv_rows, Source};
use crate::error::LoadError;
use crate::Result;
use anyhow::{bail, Context};
use tracing::{debug, trace};
use url::Url;

const SHEETS_HOST: &str = "docs.google.com";

/// A Google sheet, fetched once per call to `rows`.
pub struct GoogleSheet {
    sheet_url: String,
    export_url: Url,
    max_bytes: u64,
    client: reqwest::Client,
}

impl GoogleSheet {
    /// # Errors
    /// Returns an error if `sheet_url` cannot be turned into a CSV export URL.
    pub fn new(sheet_url: &str, max_bytes: u64) -> Result<Self> {
        let export_url = export_url(sheet_url)?;
        debug!("Sheet {sheet_url} will be fetched from {export_url}");
        Ok(Self {
            sheet_url: sheet_url.to_string(),
            export_url,
            max_bytes,
            client: reqwest::Client::new(),
        })
    }

    pub fn export_url(&self) -> &Url {
        &self.export_url
    }

    #[cfg(test)]
    fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait::async_trait]
impl Source for GoogleSheet {
    fn name(&self) -> &str {
        &self.sheet_url
    }

    async fn rows(&mut self) -> Result<Vec<Vec<String>>> {
        trace!("GET {}", self.export_url);
        let mut response = self
            .client
            .get(self.export_url.clone())
            .send()
            .await
            .map_err(|e| LoadError::unavailable(&self.sheet_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::unavailable(
                &self.sheet_url,
                format!("the server responded with status {status}"),
            )
            .into());
        }

        if let Some(size) = response.content_length() {
            check_size(&self.sheet_url, size, self.max_bytes)?;
        }

        // The body is read a chunk at a time so that a server that sends no Content-Length, or a
        // wrong one, cannot make us buffer more than the limit.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LoadError::unavailable(&self.sheet_url, e))?
        {
            bytes.extend_from_slice(&chunk);
            check_size(&self.sheet_url, bytes.len() as u64, self.max_bytes)?;
        }
        csv_rows(&self.sheet_url, &bytes)
    }
}

fn check_size(name: &str, size: u64, limit: u64) -> std::result::Result<(), LoadError> {
    if size > limit {
        return Err(LoadError::SourceTooLarge {
            name: name.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// Turns the URL of a Google sheet into the URL that downloads it as CSV.
///
/// - `https://docs.google.com/spreadsheets/d/ID/edit#gid=123` becomes
///   `https://docs.google.com/spreadsheets/d/ID/export?format=csv&gid=123`
/// - URLs that already point at an export (`/export`) or a published sheet (`/pub`) are returned
///   unchanged, as are URLs on hosts other than docs.google.com.
///
/// # Errors
/// Returns an error if the URL does not parse, or if it is a docs.google.com URL that does not
/// contain a spreadsheet ID.
pub fn export_url(sheet_url: &str) -> Result<Url> {
    let url = Url::parse(sheet_url.trim())
        .with_context(|| format!("Invalid sheet URL '{sheet_url}'"))?;
    if url.host_str() != Some(SHEETS_HOST) {
        return Ok(url);
    }
    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    if matches!(segments.last(), Some(&"export") | Some(&"pub")) {
        return Ok(url);
    }

    let id = match segments.iter().position(|s| *s == "d") {
        Some(i) => segments.get(i + 1).copied().unwrap_or_default(),
        None => "",
    };
    if id.is_empty() {
        bail!(
            "Invalid Google Sheets URL format. Expected: \
            https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
        )
    }

    let mut export = Url::parse(&format!("https://{SHEETS_HOST}/spreadsheets/d/{id}/export"))
        .context("Unable to build the sheet export URL")?;
    {
        let mut query = export.query_pairs_mut();
        query.append_pair("format", "csv");
        if let Some(gid) = gid(&url) {
            query.append_pair("gid", &gid);
        }
    }
    Ok(export)
}

/// The tab of the sheet, found either in the query (`?gid=N`) or the fragment (`#gid=N`).
fn gid(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == "gid")
        .map(|(_, v)| v.into_owned())
        .or_else(|| {
            url.fragment()?
                .split('&')
                .find_map(|kv| kv.strip_prefix("gid="))
                .map(str::to_string)
        })
}
