//! Implements the `BankApi` trait against the MyAmeria online banking API.

use crate::bank::history::{HistoryEntry, HistoryResponse};
use crate::bank::{BankApi, StatementRequest};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{error, info, trace};
use url::Url;

const BASE_URL: &str = "https://ob.myameria.am/api";
const TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound for the amount filter, large enough to include everything.
const MAX_AMOUNT: &str = "10000000000";
/// Page size large enough to fetch the whole history at once.
const PAGE_SIZE: &str = "10000";

// Header names must be lower case to be used as static names.
const CLIENT_TIME: &str = "client-time";
const CLIENT_ID: &str = "client-id";
const LOCALE: &str = "locale";
const TIMEZONE_OFFSET: &str = "timezone-offset";

/// `dd/mm/yyyy`, as the API expects dates.
fn api_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub(crate) fn history_url(base: &str, from: NaiveDate, to: NaiveDate) -> Result<Url> {
    let from = api_date(from);
    let to = api_date(to);
    Url::parse_with_params(
        &format!("{base}/events/past"),
        [
            ("locale", "en"),
            ("toAmount", MAX_AMOUNT),
            ("fromDate", from.as_str()),
            ("toDate", to.as_str()),
            ("sort", "date"),
            ("size", PAGE_SIZE),
            ("page", "1"),
        ],
    )
    .context("Unable to build the history URL")
}

pub(crate) fn statement_url(base: &str, request: &StatementRequest) -> Result<Url> {
    let from = api_date(request.from);
    let to = api_date(request.to);
    Url::parse_with_params(
        &format!(
            "{base}/statement/{}/{}",
            request.kind, request.inner_account_number
        ),
        [
            ("withEquivalentCurrency", "true"),
            ("withDailyMovement", "false"),
            ("withOverdraft", "false"),
            ("dateFrom", from.as_str()),
            ("dateTo", to.as_str()),
            ("accountNumber", request.account_number.as_str()),
            ("fileType", "xls"),
        ],
    )
    .context("Unable to build the statement URL")
}

/// A MyAmeria client authenticated with a bearer token copied from a browser session.
pub(crate) struct MyAmeria {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
    client_id: String,
}

impl MyAmeria {
    pub(crate) fn new(auth_token: &str, client_id: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            auth_token: auth_token.to_string(),
            client_id: client_id.to_string(),
        })
    }

    /// Headers computed from the local clock for every request.
    fn headers(&self) -> Result<HeaderMap> {
        let now = Local::now();
        let offset_minutes = now.offset().local_minus_utc() / 60;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.auth_token).context("Invalid auth token")?,
        );
        headers.insert(
            CLIENT_TIME,
            HeaderValue::from_str(&now.format("%H:%M:%S").to_string())?,
        );
        headers.insert(
            CLIENT_ID,
            HeaderValue::from_str(&self.client_id).context("Invalid client id")?,
        );
        headers.insert(LOCALE, HeaderValue::from_static("en"));
        headers.insert(
            TIMEZONE_OFFSET,
            HeaderValue::from_str(&offset_minutes.to_string())?,
        );
        Ok(headers)
    }

    /// Sends a GET and fails on a non-2xx status after logging the response body.
    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        trace!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .headers(self.headers()?)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("MyAmeria server {status} error on {url}: {body}");
            bail!("MyAmeria server returned {status} for {url}");
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl BankApi for MyAmeria {
    async fn history(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<HistoryEntry>> {
        info!("Downloading MyAmeria history from {from} to {to}");
        let url = history_url(&self.base_url, from, to)?;
        let response: HistoryResponse = self
            .get(url)
            .await?
            .json()
            .await
            .context("Unable to parse the MyAmeria history response")?;
        Ok(response.data.entries)
    }

    async fn statement(&self, request: &StatementRequest) -> Result<Vec<u8>> {
        let url = statement_url(&self.base_url, request)?;
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .context("Unable to read the MyAmeria statement")?;
        Ok(bytes.to_vec())
    }
}
