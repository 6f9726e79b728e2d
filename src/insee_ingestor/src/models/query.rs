//! Request parameters for the BDM series endpoint.

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a [`SeriesQuery`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("at least one idbank must be provided")]
    EmptyIdbanks,

    #[error("invalid idbank '{0}': only ASCII letters and digits are allowed")]
    InvalidIdbank(String),

    #[error("invalid detail level '{0}': expected 'full', 'dataonly' or 'nodata'")]
    InvalidDetail(String),
}

/// Level of detail requested from the series endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    /// Data and structure. No `detail` parameter is sent.
    #[default]
    Full,
    /// Observations only.
    DataOnly,
    /// Structure only, no observations.
    NoData,
}

impl Detail {
    /// Value of the `detail` query parameter, if one is sent at all.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Detail::Full => None,
            Detail::DataOnly => Some("dataonly"),
            Detail::NoData => Some("nodata"),
        }
    }
}

impl FromStr for Detail {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "full" => Ok(Detail::Full),
            "dataonly" => Ok(Detail::DataOnly),
            "nodata" => Ok(Detail::NoData),
            other => Err(QueryError::InvalidDetail(other.to_string())),
        }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param().unwrap_or("full"))
    }
}

/// A request for one or more BDM series.
///
/// Built through [`SeriesQuery::builder`]; the idbank list is normalized
/// (trimmed, blanks dropped, duplicates removed keeping the first occurrence)
/// and guaranteed non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSeriesQuery")]
pub struct SeriesQuery {
    idbanks: Vec<String>,
    start_period: Option<String>,
    last_n_observations: Option<u32>,
    detail: Detail,
    include_history: bool,
    updated_after: Option<String>,
}

impl SeriesQuery {
    /// Starts a query for the given idbanks.
    pub fn builder<I, S>(idbanks: I) -> SeriesQueryBuilder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SeriesQueryBuilder {
            idbanks: idbanks.into_iter().map(|s| s.as_ref().to_string()).collect(),
            ..Default::default()
        }
    }

    /// Splits user input such as `"001688406, 001688407"` into idbanks.
    ///
    /// Both `,` and `+` are accepted as separators. Blank entries are dropped.
    pub fn parse_idbanks(input: &str) -> Vec<String> {
        input
            .split([',', '+'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn idbanks(&self) -> &[String] {
        &self.idbanks
    }

    pub fn start_period(&self) -> Option<&str> {
        self.start_period.as_deref()
    }

    pub fn last_n_observations(&self) -> Option<u32> {
        self.last_n_observations
    }

    pub fn detail(&self) -> Detail {
        self.detail
    }

    pub fn include_history(&self) -> bool {
        self.include_history
    }

    pub fn updated_after(&self) -> Option<&str> {
        self.updated_after.as_deref()
    }

    /// Idbanks joined the way the series endpoint expects them in its path.
    pub fn joined_idbanks(&self) -> String {
        self.idbanks.join("+")
    }
}

/// Builder for [`SeriesQuery`].
#[derive(Clone, Debug, Default)]
pub struct SeriesQueryBuilder {
    idbanks: Vec<String>,
    start_period: Option<String>,
    last_n_observations: Option<u32>,
    detail: Detail,
    include_history: bool,
    updated_after: Option<String>,
}

impl SeriesQueryBuilder {
    /// Start of the period, e.g. `2020`, `2020-03` or `2020-Q1`. Blank means unset.
    pub fn start_period(mut self, period: impl Into<String>) -> Self {
        self.start_period = non_blank(period.into());
        self
    }

    /// Keep only the `n` most recent observations. Zero means no limit.
    pub fn last_n_observations(mut self, n: u32) -> Self {
        self.last_n_observations = (n > 0).then_some(n);
        self
    }

    pub fn detail(mut self, detail: Detail) -> Self {
        self.detail = detail;
        self
    }

    /// Include the full revision history of each observation.
    pub fn include_history(mut self, include: bool) -> Self {
        self.include_history = include;
        self
    }

    /// Only observations updated after this date (`YYYY-MM-DD`). Blank means unset.
    pub fn updated_after(mut self, date: impl Into<String>) -> Self {
        self.updated_after = non_blank(date.into());
        self
    }

    pub fn build(self) -> Result<SeriesQuery, QueryError> {
        let mut seen = HashSet::new();
        let mut idbanks = Vec::with_capacity(self.idbanks.len());

        for raw in self.idbanks {
            let id = raw.trim();
            if id.is_empty() {
                continue;
            }
            if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(QueryError::InvalidIdbank(id.to_string()));
            }
            if seen.insert(id.to_string()) {
                idbanks.push(id.to_string());
            }
        }

        if idbanks.is_empty() {
            return Err(QueryError::EmptyIdbanks);
        }

        Ok(SeriesQuery {
            idbanks,
            start_period: self.start_period,
            last_n_observations: self.last_n_observations,
            detail: self.detail,
            include_history: self.include_history,
            updated_after: self.updated_after,
        })
    }
}

/// Wire form of a [`SeriesQuery`]; validated through the builder.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSeriesQuery {
    idbanks: Vec<String>,
    #[serde(default)]
    start_period: Option<String>,
    #[serde(default)]
    last_n_observations: Option<u32>,
    #[serde(default)]
    detail: Detail,
    #[serde(default)]
    include_history: bool,
    #[serde(default)]
    updated_after: Option<String>,
}

impl TryFrom<RawSeriesQuery> for SeriesQuery {
    type Error = QueryError;

    fn try_from(raw: RawSeriesQuery) -> Result<Self, Self::Error> {
        let mut builder = SeriesQuery::builder(raw.idbanks)
            .last_n_observations(raw.last_n_observations.unwrap_or(0))
            .detail(raw.detail)
            .include_history(raw.include_history);
        if let Some(start) = raw.start_period {
            builder = builder.start_period(start);
        }
        if let Some(date) = raw.updated_after {
            builder = builder.updated_after(date);
        }
        builder.build()
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
