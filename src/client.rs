use crate::config::Config;
use crate::dates::iso_date;
use crate::errors::{ClientError, ConfigError};
use crate::models::{SummaryCollection, SummaryResponse};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use tracing::debug;

/// Spotcheck daybreak endpoints the dashboard depends on.
#[async_trait]
pub trait DaybreakApi: Send + Sync {
    /// Report summaries between two dates, newest first.
    async fn summaries(&self, start: NaiveDate, end: NaiveDate) -> Result<SummaryCollection, ClientError>;

    /// Full detail for one report, passed through untouched.
    async fn detail(&self, report_date_time: NaiveDateTime) -> Result<serde_json::Value, ClientError>;
}

pub struct HttpDaybreakApi {
    client: Client,
    api_root: String,
}

impl HttpDaybreakApi {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            api_root: config.api_root.clone(),
        })
    }

    pub fn summaries_url(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/spotcheck/daybreaks/{}/{}",
            self.api_root,
            iso_date(start),
            iso_date(end)
        )
    }

    pub fn detail_url(&self, report_date_time: NaiveDateTime) -> String {
        format!(
            "{}/spotcheck/daybreaks/{}",
            self.api_root,
            report_date_time.format("%Y-%m-%dT%H:%M:%S")
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, ClientError> {
        debug!("GET {url}");
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(source) => return Err(ClientError::Transport { url, source }),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { url, status });
        }

        match response.json::<T>().await {
            Ok(body) => Ok(body),
            Err(source) => Err(ClientError::Decode { url, source }),
        }
    }
}

#[async_trait]
impl DaybreakApi for HttpDaybreakApi {
    async fn summaries(&self, start: NaiveDate, end: NaiveDate) -> Result<SummaryCollection, ClientError> {
        let response: SummaryResponse = self.get_json(self.summaries_url(start, end)).await?;
        Ok(response.reports)
    }

    async fn detail(&self, report_date_time: NaiveDateTime) -> Result<serde_json::Value, ClientError> {
        self.get_json(self.detail_url(report_date_time)).await
    }
}
