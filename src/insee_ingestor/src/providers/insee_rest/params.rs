use serde::Serialize;

use crate::models::SeriesQuery;

/// Query-string parameters of a BDM series request.
///
/// Unset options are omitted entirely rather than sent empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BdmParams {
    #[serde(rename = "startPeriod", skip_serializing_if = "Option::is_none")]
    pub start_period: Option<String>,
    #[serde(rename = "lastNObservations", skip_serializing_if = "Option::is_none")]
    pub last_n_observations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'static str>,
    #[serde(rename = "includeHistory", skip_serializing_if = "Option::is_none")]
    pub include_history: Option<bool>,
    #[serde(rename = "updatedAfter", skip_serializing_if = "Option::is_none")]
    pub updated_after: Option<String>,
}

impl From<&SeriesQuery> for BdmParams {
    fn from(query: &SeriesQuery) -> Self {
        Self {
            start_period: query.start_period().map(str::to_string),
            last_n_observations: query.last_n_observations(),
            detail: query.detail().as_param(),
            include_history: query.include_history().then_some(true),
            updated_after: query.updated_after().map(str::to_string),
        }
    }
}

/// URL of the series resource for `query` under `series_url`.
///
/// Idbanks travel in the path, joined with `+`.
pub fn series_resource_url(series_url: &str, query: &SeriesQuery) -> String {
    format!(
        "{}/{}",
        series_url.trim_end_matches('/'),
        query.joined_idbanks()
    )
}
