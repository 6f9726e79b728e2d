use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, header};
use snafu::ResultExt;
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::Credential,
    config::ApiConfig,
    models::{SeriesQuery, SeriesTable},
    providers::{
        HttpSnafu, ParseSnafu, ProviderInitError, RequestSnafu, SeriesError, SeriesProvider,
        build_http_client,
        insee_rest::{
            params::{BdmParams, series_resource_url},
            response::BdmResponse,
        },
    },
};

/// Series fetcher for the INSEE BDM API.
///
/// Holds an optional client-side limiter so a caller looping over queries
/// stays under the per-IP quota. The limiter only delays; it never fails a
/// request.
pub struct InseeProvider {
    client: Client,
    series_url: String,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl InseeProvider {
    /// Creates a provider from the `[api]` configuration section.
    pub fn new(api: &ApiConfig) -> Result<Self, ProviderInitError> {
        let client = build_http_client(api.timeout_secs, &api.user_agent)?;
        let limiter = NonZeroU32::new(api.rate_limit_per_minute)
            .map(|per_minute| RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client,
            series_url: api.series_url(),
            limiter,
        })
    }

    async fn pace(&self) {
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                warn!("client-side rate limit reached, waiting for a free slot");
                limiter.until_ready().await;
            }
        }
    }
}

#[async_trait]
impl SeriesProvider for InseeProvider {
    #[instrument(skip(self, credential), fields(idbanks = %query.joined_idbanks()))]
    async fn fetch_series(
        &self,
        query: &SeriesQuery,
        credential: &Credential,
    ) -> Result<SeriesTable, SeriesError> {
        self.pace().await;

        let url = series_resource_url(&self.series_url, query);
        let params = BdmParams::from(query);
        debug!(%url, ?params, "requesting series");

        let response = self
            .client
            .get(&url)
            .bearer_auth(credential.bearer())
            .header(header::ACCEPT, "application/json")
            .query(&params)
            .send()
            .await
            .context(RequestSnafu)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return HttpSnafu {
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        let body = response.bytes().await.context(RequestSnafu)?;
        let table = BdmResponse::from_slice(&body)
            .context(ParseSnafu)?
            .into_table(query);

        let missing = table.missing_idbanks(query);
        if !missing.is_empty() {
            warn!(?missing, "response holds no observations for some requested idbanks");
        }
        info!(rows = table.len(), series = table.idbanks().len(), "series fetched");

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_limit_disables_pacing() {
        let api = ApiConfig {
            rate_limit_per_minute: 0,
            ..Default::default()
        };
        let provider = InseeProvider::new(&api).unwrap();
        assert!(provider.limiter.is_none());

        let provider = InseeProvider::new(&ApiConfig::default()).unwrap();
        assert!(provider.limiter.is_some());
    }

    #[tokio::test]
    async fn pacing_allows_a_burst_up_to_the_quota() {
        let api = ApiConfig {
            rate_limit_per_minute: 3,
            ..Default::default()
        };
        let provider = InseeProvider::new(&api).unwrap();
        let limiter = provider.limiter.as_ref().unwrap();
        for _ in 0..3 {
            assert!(limiter.check().is_ok());
        }
        assert!(limiter.check().is_err());
    }
}
