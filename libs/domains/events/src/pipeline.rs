//! Aggregation pipeline construction.
//!
//! Both aggregate endpoints compile to the same three-stage shape:
//! `$match` with the request filter, `$group` keyed by the group value or
//! time bucket, then `$sort` on `_id` ascending so results come back in a
//! stable order.

use bson::{Document, doc};

use crate::filter::resolve_field_path;
use crate::query::{Aggregate, Interval};

/// Pipeline for the grouped stats endpoint.
pub fn group_pipeline(filter: Document, group_by: &str, aggregate: Aggregate) -> Vec<Document> {
    let group_field = format!("${}", resolve_field_path(group_by));

    vec![
        doc! { "$match": filter },
        doc! {
            "$group": {
                "_id": group_field,
                "value": accumulator(aggregate),
            }
        },
        doc! { "$sort": { "_id": 1 } },
    ]
}

/// Pipeline for the time-series endpoint. Buckets `created_at` with
/// `$dateToString` using the interval's format.
pub fn time_series_pipeline(
    filter: Document,
    interval: Interval,
    aggregate: Aggregate,
) -> Vec<Document> {
    vec![
        doc! { "$match": filter },
        doc! {
            "$group": {
                "_id": {
                    "$dateToString": {
                        "format": interval.date_format(),
                        "date": "$created_at",
                    }
                },
                "value": accumulator(aggregate),
            }
        },
        doc! { "$sort": { "_id": 1 } },
    ]
}

/// Accumulator expression for an aggregate function. Sum and average
/// operate on the event's `value` property.
fn accumulator(aggregate: Aggregate) -> Document {
    match aggregate {
        Aggregate::Count => doc! { "$sum": 1 },
        Aggregate::Sum => doc! { "$sum": "$properties.value" },
        Aggregate::Avg => doc! { "$avg": "$properties.value" },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_pipeline_shape() {
        let pipeline = group_pipeline(doc! { "properties.region": "eu" }, "plan", Aggregate::Count);
        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline[0],
            doc! { "$match": { "properties.region": "eu" } }
        );
        assert_eq!(
            pipeline[1],
            doc! { "$group": { "_id": "$properties.plan", "value": { "$sum": 1 } } }
        );
        assert_eq!(pipeline[2], doc! { "$sort": { "_id": 1 } });
    }

    #[test]
    fn test_group_pipeline_keeps_dotted_group_field() {
        let pipeline = group_pipeline(Document::new(), "properties.plan", Aggregate::Sum);
        assert_eq!(
            pipeline[1],
            doc! { "$group": {
                "_id": "$properties.plan",
                "value": { "$sum": "$properties.value" },
            } }
        );
    }

    #[test]
    fn test_time_series_pipeline_shape() {
        let pipeline = time_series_pipeline(Document::new(), Interval::Day, Aggregate::Avg);
        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline[1],
            doc! { "$group": {
                "_id": { "$dateToString": { "format": "%Y-%m-%d", "date": "$created_at" } },
                "value": { "$avg": "$properties.value" },
            } }
        );
        assert_eq!(pipeline[2], doc! { "$sort": { "_id": 1 } });
    }

    #[test]
    fn test_time_series_week_uses_iso_format() {
        let pipeline = time_series_pipeline(Document::new(), Interval::Week, Aggregate::Count);
        let group = pipeline[1].get_document("$group").unwrap();
        let bucket = group.get_document("_id").unwrap();
        let date_to_string = bucket.get_document("$dateToString").unwrap();
        assert_eq!(date_to_string.get_str("format").unwrap(), "%G-W%V");
    }
}
