//! Query parameter parsing and validation.
//!
//! All three read endpoints take their parameters from the raw query
//! string. Parameter names that are not reserved are treated as flat
//! exact-match filters, so parsing starts from a `HashMap` rather than a
//! typed extractor.

use std::collections::HashMap;

use bson::{Document, doc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::error::{EventError, Result};
use crate::filter::build_filter;

/// Reserved query parameter names, excluded from flat filtering.
pub const RESERVED_PARAMS: [&str; 8] = [
    "page",
    "limit",
    "sortBy",
    "sortOrder",
    "groupBy",
    "aggregates",
    "interval",
    "filters",
];

/// Fields accepted by `sortBy`.
pub const SORT_FIELDS: [&str; 3] = ["created_at", "updated_at", "id"];

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 1000;

/// Sort direction for list queries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// MongoDB sort direction: 1 ascending, -1 descending.
    pub fn direction(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Supported aggregation functions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Aggregate {
    #[default]
    Count,
    Sum,
    Avg,
}

/// Supported time-series bucket widths.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Interval {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl Interval {
    /// `$dateToString` format for this bucket width.
    ///
    /// Weeks use the ISO year and week number so buckets around a year
    /// boundary sort correctly.
    pub fn date_format(self) -> &'static str {
        match self {
            Self::Hour => "%Y-%m-%d-%H",
            Self::Day => "%Y-%m-%d",
            Self::Week => "%G-W%V",
            Self::Month => "%Y-%m",
        }
    }
}

/// Parsed and validated parameters for the paginated list endpoint.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filter: Document,
    pub sort_by: String,
    pub order: SortOrder,
    pub page: u64,
    pub limit: i64,
}

impl ListQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let page = match params.get("page") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(p) if p >= 1 => p,
                _ => {
                    return Err(EventError::validation("Page must be a positive number"));
                }
            },
            None => DEFAULT_PAGE,
        };

        let limit = match params.get("limit") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(l) if (1..=MAX_LIMIT).contains(&l) => l,
                _ => {
                    return Err(EventError::validation("Limit must be between 1 and 1000"));
                }
            },
            None => DEFAULT_LIMIT,
        };

        let sort_by = match params.get("sortBy") {
            Some(field) if SORT_FIELDS.contains(&field.as_str()) => field.clone(),
            Some(_) => return Err(EventError::validation("Invalid sort field")),
            None => "created_at".to_string(),
        };

        let order = match params.get("sortOrder") {
            Some(raw) => raw
                .parse::<SortOrder>()
                .map_err(|_| EventError::validation("Sort order must be 'asc' or 'desc'"))?,
            None => SortOrder::default(),
        };

        Ok(Self {
            filter: build_filter(params)?,
            sort_by,
            order,
            page,
            limit,
        })
    }

    /// Number of documents to skip for the requested page.
    ///
    /// Saturates instead of wrapping: a page number near `u64::MAX` asks
    /// for a window past any possible data set and yields an empty page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit as u64)
    }

    /// MongoDB sort document. `id` sorts on the stored `_id` field.
    pub fn sort_doc(&self) -> Document {
        let field = if self.sort_by == "id" {
            "_id"
        } else {
            &self.sort_by
        };
        doc! { field: self.order.direction() }
    }
}

/// Parsed and validated parameters for the grouped stats endpoint.
#[derive(Debug, Clone)]
pub struct StatsQuery {
    pub filter: Document,
    pub group_by: String,
    pub aggregate: Aggregate,
}

impl StatsQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let group_by = params
            .get("groupBy")
            .filter(|g| !g.is_empty())
            .cloned()
            .ok_or_else(|| EventError::validation("groupBy parameter is required"))?;

        let aggregate = match params.get("aggregates") {
            Some(raw) => raw
                .parse::<Aggregate>()
                .map_err(|_| EventError::validation("Invalid aggregation type"))?,
            None => Aggregate::default(),
        };

        Ok(Self {
            filter: build_filter(params)?,
            group_by,
            aggregate,
        })
    }
}

/// Parsed and validated parameters for the time-series endpoint.
#[derive(Debug, Clone)]
pub struct TimeSeriesQuery {
    pub filter: Document,
    pub interval: Interval,
    pub aggregate: Aggregate,
}

impl TimeSeriesQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let interval = match params.get("interval") {
            Some(raw) => raw
                .parse::<Interval>()
                .map_err(|_| EventError::validation("Invalid time interval"))?,
            None => Interval::default(),
        };

        let aggregate = match params.get("aggregates") {
            Some(raw) => raw
                .parse::<Aggregate>()
                .map_err(|_| EventError::validation("Invalid aggregation type"))?,
            None => Aggregate::default(),
        };

        Ok(Self {
            filter: build_filter(params)?,
            interval,
            aggregate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::from_params(&params(&[])).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 50);
        assert_eq!(query.sort_by, "created_at");
        assert_eq!(query.order, SortOrder::Asc);
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_list_query_skip() {
        let query = ListQuery::from_params(&params(&[("page", "3"), ("limit", "20")])).unwrap();
        assert_eq!(query.skip(), 40);
        assert_eq!(query.limit, 20);
    }

    #[test]
    fn test_list_query_skip_saturates_on_huge_page() {
        let query = ListQuery::from_params(&params(&[
            ("page", "18446744073709551615"),
            ("limit", "1000"),
        ]))
        .unwrap();
        assert_eq!(query.skip(), u64::MAX);
    }

    #[test]
    fn test_list_query_rejects_zero_page() {
        let err = ListQuery::from_params(&params(&[("page", "0")])).unwrap_err();
        assert!(err.to_string().contains("Page must be a positive number"));
    }

    #[test]
    fn test_list_query_rejects_non_numeric_page() {
        assert!(ListQuery::from_params(&params(&[("page", "abc")])).is_err());
    }

    #[test]
    fn test_list_query_rejects_limit_out_of_range() {
        assert!(ListQuery::from_params(&params(&[("limit", "0")])).is_err());
        assert!(ListQuery::from_params(&params(&[("limit", "1001")])).is_err());
        assert!(ListQuery::from_params(&params(&[("limit", "1000")])).is_ok());
    }

    #[test]
    fn test_list_query_rejects_unknown_sort_field() {
        let err = ListQuery::from_params(&params(&[("sortBy", "properties.plan")])).unwrap_err();
        assert!(err.to_string().contains("Invalid sort field"));
    }

    #[test]
    fn test_list_query_rejects_bad_sort_order() {
        let err = ListQuery::from_params(&params(&[("sortOrder", "descending")])).unwrap_err();
        assert!(err.to_string().contains("Sort order must be 'asc' or 'desc'"));
    }

    #[test]
    fn test_list_query_sort_doc_maps_id() {
        let query =
            ListQuery::from_params(&params(&[("sortBy", "id"), ("sortOrder", "asc")])).unwrap();
        assert_eq!(query.sort_doc(), doc! { "_id": 1 });
    }

    #[test]
    fn test_stats_query_requires_group_by() {
        let err = StatsQuery::from_params(&params(&[])).unwrap_err();
        assert!(err.to_string().contains("groupBy parameter is required"));

        let err = StatsQuery::from_params(&params(&[("groupBy", "")])).unwrap_err();
        assert!(err.to_string().contains("groupBy parameter is required"));
    }

    #[test]
    fn test_stats_query_defaults_to_count() {
        let query = StatsQuery::from_params(&params(&[("groupBy", "plan")])).unwrap();
        assert_eq!(query.aggregate, Aggregate::Count);
    }

    #[test]
    fn test_stats_query_rejects_unknown_aggregate() {
        let err = StatsQuery::from_params(&params(&[("groupBy", "plan"), ("aggregates", "median")]))
            .unwrap_err();
        assert!(err.to_string().contains("Invalid aggregation type"));
    }

    #[test]
    fn test_time_series_defaults_to_day() {
        let query = TimeSeriesQuery::from_params(&params(&[])).unwrap();
        assert_eq!(query.interval, Interval::Day);
        assert_eq!(query.aggregate, Aggregate::Count);
    }

    #[test]
    fn test_time_series_rejects_unknown_interval() {
        let err = TimeSeriesQuery::from_params(&params(&[("interval", "year")])).unwrap_err();
        assert!(err.to_string().contains("Invalid time interval"));
    }

    #[test]
    fn test_interval_date_formats() {
        assert_eq!(Interval::Hour.date_format(), "%Y-%m-%d-%H");
        assert_eq!(Interval::Day.date_format(), "%Y-%m-%d");
        assert_eq!(Interval::Week.date_format(), "%G-W%V");
        assert_eq!(Interval::Month.date_format(), "%Y-%m");
    }
}
