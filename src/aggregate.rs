use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;
use crate::models::{Department, DepartmentStat, FeedbackRecord, OverallStats, Sentiment, Status};

/// Admin-view filter. `All` matches everything; text that names no known
/// value parses into `Unrecognized`, which matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
    Unrecognized(String),
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
            Filter::Unrecognized(_) => false,
        }
    }
}

impl<T: FromStr> Filter<T> {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Filter::All,
            Some(text) if text.is_empty() || text.eq_ignore_ascii_case("all") => Filter::All,
            Some(text) => match text.parse::<T>() {
                Ok(parsed) => Filter::Only(parsed),
                Err(_) => Filter::Unrecognized(text.to_string()),
            },
        }
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Only(value) => write!(f, "{value}"),
            Filter::Unrecognized(text) => f.write_str(text),
        }
    }
}

pub type DepartmentFilter = Filter<Department>;
pub type StatusFilter = Filter<Status>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Score,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "score" => Ok(SortKey::Score),
            _ => Err(Error::Parse {
                kind: "sort key",
                value: value.to_string(),
            }),
        }
    }
}

/// One stat per department, in enumeration order, including departments
/// with no records.
pub fn aggregate_by_department(records: &[FeedbackRecord]) -> Vec<DepartmentStat> {
    Department::ALL
        .into_iter()
        .map(|department| {
            let mut stat = DepartmentStat {
                department,
                total_reviews: 0,
                average_score: 0.0,
                positive_count: 0,
                negative_count: 0,
                neutral_count: 0,
                pending_count: 0,
            };
            let mut score_sum: u64 = 0;

            for record in records.iter().filter(|record| record.department == department) {
                stat.total_reviews += 1;
                score_sum += u64::from(record.score);
                match record.sentiment {
                    Sentiment::Positive => stat.positive_count += 1,
                    Sentiment::Negative => stat.negative_count += 1,
                    Sentiment::Neutral => stat.neutral_count += 1,
                }
                if record.status == Status::Pending {
                    stat.pending_count += 1;
                }
            }

            stat.average_score = average(score_sum, stat.total_reviews);
            stat
        })
        .collect()
}

pub fn aggregate_overall(records: &[FeedbackRecord]) -> OverallStats {
    let score_sum: u64 = records.iter().map(|record| u64::from(record.score)).sum();
    let count = |sentiment: Sentiment| {
        records
            .iter()
            .filter(|record| record.sentiment == sentiment)
            .count()
    };

    OverallStats {
        total_reviews: records.len(),
        average_score: average(score_sum, records.len()),
        positive_count: count(Sentiment::Positive),
        negative_count: count(Sentiment::Negative),
        neutral_count: count(Sentiment::Neutral),
        department_with_most_negative: most_negative(records, &aggregate_by_department(records)),
    }
}

/// First department, in enumeration order, holding the strictly highest
/// negative count. `None` only when there are no records at all.
fn most_negative(records: &[FeedbackRecord], stats: &[DepartmentStat]) -> Option<Department> {
    if records.is_empty() {
        return None;
    }
    let first = stats.first()?;
    let best = stats.iter().skip(1).fold(first, |best, stat| {
        if stat.negative_count > best.negative_count {
            stat
        } else {
            best
        }
    });
    Some(best.department)
}

/// Returns the matching records in a new vector; `records` is untouched.
/// Both sort keys are descending and stable.
pub fn filter_and_sort(
    records: &[FeedbackRecord],
    department: &DepartmentFilter,
    status: &StatusFilter,
    sort: SortKey,
) -> Vec<FeedbackRecord> {
    let mut filtered: Vec<FeedbackRecord> = records
        .iter()
        .filter(|record| department.matches(&record.department) && status.matches(&record.status))
        .cloned()
        .collect();

    match sort {
        SortKey::Date => filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Score => filtered.sort_by(|a, b| b.score.cmp(&a.score)),
    }

    filtered
}

fn average(sum: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn record(
        department: Department,
        sentiment: Sentiment,
        score: u8,
        days: i64,
        status: Status,
    ) -> FeedbackRecord {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        FeedbackRecord {
            id: Uuid::new_v4(),
            name: "Avery Lee".to_string(),
            email: "avery@example.com".to_string(),
            score,
            message: "placeholder".to_string(),
            department,
            sentiment,
            sentiment_score: 0.0,
            created_at: base + Duration::days(days),
            status,
        }
    }

    fn sample_records() -> Vec<FeedbackRecord> {
        vec![
            record(Department::Engineering, Sentiment::Positive, 5, 1, Status::Reviewed),
            record(Department::Sales, Sentiment::Negative, 2, 5, Status::Pending),
            record(Department::Engineering, Sentiment::Negative, 2, 3, Status::Pending),
            record(Department::Support, Sentiment::Neutral, 3, 4, Status::Resolved),
            record(Department::Engineering, Sentiment::Positive, 4, 2, Status::Resolved),
        ]
    }

    #[test]
    fn department_stats_follow_enumeration_order() {
        let stats = aggregate_by_department(&sample_records());
        let order: Vec<Department> = stats.iter().map(|stat| stat.department).collect();
        assert_eq!(order, Department::ALL.to_vec());

        let engineering = &stats[0];
        assert_eq!(engineering.total_reviews, 3);
        assert!((engineering.average_score - 11.0 / 3.0).abs() < 1e-9);
        assert_eq!(engineering.positive_count, 2);
        assert_eq!(engineering.negative_count, 1);
        assert_eq!(engineering.pending_count, 1);

        let marketing = &stats[1];
        assert_eq!(marketing.total_reviews, 0);
        assert_eq!(marketing.average_score, 0.0);
    }

    #[test]
    fn overall_of_empty_collection_is_zeroed() {
        let overall = aggregate_overall(&[]);
        assert_eq!(overall.total_reviews, 0);
        assert_eq!(overall.average_score, 0.0);
        assert_eq!(overall.positive_count, 0);
        assert_eq!(overall.negative_count, 0);
        assert_eq!(overall.neutral_count, 0);
        assert_eq!(overall.department_with_most_negative, None);
    }

    #[test]
    fn most_negative_tie_keeps_earlier_department() {
        let overall = aggregate_overall(&sample_records());
        assert_eq!(overall.negative_count, 2);
        assert_eq!(overall.department_with_most_negative, Some(Department::Engineering));
    }

    #[test]
    fn most_negative_picks_strict_maximum() {
        let mut records = sample_records();
        records.push(record(Department::Finance, Sentiment::Negative, 1, 6, Status::Pending));
        records.push(record(Department::Finance, Sentiment::Negative, 1, 7, Status::Pending));
        let overall = aggregate_overall(&records);
        assert_eq!(overall.department_with_most_negative, Some(Department::Finance));
    }

    #[test]
    fn no_negatives_defaults_to_first_department() {
        let records = vec![record(Department::Hr, Sentiment::Positive, 5, 0, Status::Pending)];
        let overall = aggregate_overall(&records);
        assert_eq!(overall.department_with_most_negative, Some(Department::Engineering));
    }

    #[test]
    fn filter_by_department_sorts_newest_first() {
        let records = sample_records();
        let filtered = filter_and_sort(
            &records,
            &DepartmentFilter::parse(Some("engineering")),
            &StatusFilter::parse(None),
            SortKey::default(),
        );
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| r.department == Department::Engineering));
        let days: Vec<_> = filtered.iter().map(|r| r.created_at).collect();
        assert!(days.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn score_sort_is_stable() {
        let mut records = sample_records();
        records.push(record(Department::Marketing, Sentiment::Positive, 5, 9, Status::Pending));
        let sorted = filter_and_sort(&records, &Filter::All, &Filter::All, SortKey::Score);
        let scores: Vec<u8> = sorted.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![5, 5, 4, 3, 2, 2]);
        assert_eq!(sorted[0].id, records[0].id);
        assert_eq!(sorted[1].id, records[5].id);
        assert_eq!(sorted[4].id, records[1].id);
        assert_eq!(sorted[5].id, records[2].id);
    }

    #[test]
    fn date_sort_keeps_input_order_for_equal_timestamps() {
        let records = vec![
            record(Department::Sales, Sentiment::Neutral, 3, 2, Status::Pending),
            record(Department::Hr, Sentiment::Negative, 1, 4, Status::Pending),
            record(Department::Finance, Sentiment::Positive, 5, 2, Status::Pending),
            record(Department::Support, Sentiment::Negative, 2, 2, Status::Pending),
        ];
        let sorted = filter_and_sort(&records, &Filter::All, &Filter::All, SortKey::Date);
        let ids: Vec<Uuid> = sorted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![records[1].id, records[0].id, records[2].id, records[3].id]);
    }

    #[test]
    fn status_filter_and_all_keyword() {
        let records = sample_records();
        let pending = filter_and_sort(
            &records,
            &DepartmentFilter::parse(Some("all")),
            &StatusFilter::parse(Some("pending")),
            SortKey::Date,
        );
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|r| r.status == Status::Pending));
    }

    #[test]
    fn unknown_filter_values_match_nothing() {
        let records = sample_records();
        let legal = DepartmentFilter::parse(Some("legal"));
        assert_eq!(legal, Filter::Unrecognized("legal".to_string()));
        assert!(filter_and_sort(&records, &legal, &Filter::All, SortKey::Date).is_empty());

        let archived = StatusFilter::parse(Some("archived"));
        assert!(filter_and_sort(&records, &Filter::All, &archived, SortKey::Date).is_empty());
    }

    fn arb_record() -> impl Strategy<Value = FeedbackRecord> {
        (0usize..6, 0usize..3, 1u8..=5, 0i64..100, 0usize..3).prop_map(
            |(department, sentiment, score, days, status)| {
                let sentiment = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral][sentiment];
                let status = [Status::Pending, Status::Reviewed, Status::Resolved][status];
                record(Department::ALL[department], sentiment, score, days, status)
            },
        )
    }

    proptest! {
        #[test]
        fn sentiment_counts_sum_to_totals(records in prop::collection::vec(arb_record(), 1..40)) {
            let stats = aggregate_by_department(&records);
            for stat in &stats {
                prop_assert_eq!(
                    stat.positive_count + stat.negative_count + stat.neutral_count,
                    stat.total_reviews
                );
                prop_assert!(stat.pending_count <= stat.total_reviews);
            }
            let overall = aggregate_overall(&records);
            prop_assert_eq!(
                overall.positive_count + overall.negative_count + overall.neutral_count,
                overall.total_reviews
            );
            prop_assert_eq!(stats.iter().map(|s| s.total_reviews).sum::<usize>(), records.len());
            prop_assert!(overall.department_with_most_negative.is_some());
        }
    }
}
