//! Blocking HTTP [`RangeSource`] for the spreadsheet values API.

use crate::handle::ResourceHandle;
use crate::source::{FetchError, RangeSource};
use crate::value_range::ValueRange;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use sheetmirror_model::Row;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Error bodies longer than this are cut before they land in a [`FetchError`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Fetches ranges with `valueRenderOption=UNFORMATTED_VALUE` and
/// `dateTimeRenderOption=SERIAL_NUMBER`, so date/time cells arrive as serials.
///
/// The bearer token is used as given; minting and refreshing it is the
/// caller's job.
#[derive(Debug, Clone)]
pub struct SheetsApiSource {
    client: Client,
    base_url: Url,
    token: String,
}

impl SheetsApiSource {
    pub fn new(token: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| FetchError::Transport(format!("invalid base url {base_url}: {err}")))?;
        let client = Client::builder()
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{sheet!range}?...`
    pub fn values_url(&self, handle: &ResourceHandle) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Transport(format!("base url {} has no path", self.base_url)))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                handle.spreadsheet_id.as_str(),
                "values",
                handle.a1_range().as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "SERIAL_NUMBER")
            .append_pair("majorDimension", "ROWS");
        Ok(url)
    }
}

impl RangeSource for SheetsApiSource {
    fn fetch(
        &self,
        handle: &ResourceHandle,
        timeout: Option<Duration>,
    ) -> Result<Vec<Row>, FetchError> {
        let url = self.values_url(handle)?;
        let mut request = self.client.get(url).bearer_auth(&self.token);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, body));
        }

        let range: ValueRange = response.json().map_err(map_reqwest_error)?;
        range.into_rows()
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::TimedOut
    } else if err.is_decode() {
        FetchError::Decode(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}

fn status_error(status: StatusCode, body: String) -> FetchError {
    let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FetchError::Auth(format!("{status}: {body}"))
        }
        _ => FetchError::Status {
            code: status.as_u16(),
            body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_url_encodes_the_a1_range() {
        let source = SheetsApiSource::with_base_url("http://localhost:8080/", "token").unwrap();
        let handle = ResourceHandle::new("abc123", "Week Plan", "A1:F20");
        let url = source.values_url(&handle).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v4/spreadsheets/abc123/values/Week%20Plan!A1:F20\
             ?valueRenderOption=UNFORMATTED_VALUE&dateTimeRenderOption=SERIAL_NUMBER&majorDimension=ROWS"
        );
    }

    #[test]
    fn statuses_map_to_fetch_errors() {
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "denied".into()),
            FetchError::Auth(_)
        ));
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, "x".repeat(600)),
            FetchError::Status {
                code: 502,
                body: "x".repeat(MAX_ERROR_BODY_CHARS),
            }
        );
    }
}
