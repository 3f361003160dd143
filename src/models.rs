use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            _ => Err(Error::Parse {
                kind: "sentiment",
                value: value.to_string(),
            }),
        }
    }
}

/// Routing categories for feedback records. Declaration order is the
/// enumeration order used for reporting and tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Engineering,
    Marketing,
    Sales,
    Support,
    Hr,
    Finance,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::Engineering,
        Department::Marketing,
        Department::Sales,
        Department::Support,
        Department::Hr,
        Department::Finance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Engineering => "engineering",
            Department::Marketing => "marketing",
            Department::Sales => "sales",
            Department::Support => "support",
            Department::Hr => "hr",
            Department::Finance => "finance",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Department::Engineering => "Engineering",
            Department::Marketing => "Marketing",
            Department::Sales => "Sales",
            Department::Support => "Support",
            Department::Hr => "HR",
            Department::Finance => "Finance",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Department::ALL
            .into_iter()
            .find(|department| department.as_str() == normalized)
            .ok_or_else(|| Error::Parse {
                kind: "department",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Reviewed,
    Resolved,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Reviewed => "reviewed",
            Status::Resolved => "resolved",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "reviewed" => Ok(Status::Reviewed),
            "resolved" => Ok(Status::Resolved),
            _ => Err(Error::Parse {
                kind: "status",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub score: u8,
    pub message: String,
    pub department: Department,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub created_at: DateTime<Utc>,
    pub status: Status,
}

/// Raw form input. Only turned into a [`FeedbackRecord`] once it validates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub score: u8,
    pub message: String,
    pub department: Option<Department>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: Sentiment,
    pub score: f64,
    pub themes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentStat {
    pub department: Department,
    pub total_reviews: usize,
    pub average_score: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub pending_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_reviews: usize,
    pub average_score: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub department_with_most_negative: Option<Department>,
}

impl OverallStats {
    pub fn positive_pct(&self) -> f64 {
        percentage(self.positive_count, self.total_reviews)
    }

    pub fn negative_pct(&self) -> f64 {
        percentage(self.negative_count, self.total_reviews)
    }

    pub fn neutral_pct(&self) -> f64 {
        percentage(self.neutral_count, self.total_reviews)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThemeTally {
    pub theme: String,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

impl ThemeTally {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
        self.total += 1;
    }

    pub fn satisfaction_pct(&self) -> f64 {
        percentage(self.positive, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Negative,
    Warning,
}

impl InsightKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InsightKind::Positive => "positive",
            InsightKind::Negative => "negative",
            InsightKind::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub theme: String,
    pub message: String,
}

pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn departments_parse_case_insensitively() {
        assert_eq!("Engineering".parse::<Department>().unwrap(), Department::Engineering);
        assert_eq!(" hr ".parse::<Department>().unwrap(), Department::Hr);
        assert!("legal".parse::<Department>().is_err());
    }

    #[test]
    fn statuses_round_trip_through_text() {
        for status in [Status::Pending, Status::Reviewed, Status::Resolved] {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
    }

    #[test]
    fn tally_tracks_total_alongside_buckets() {
        let mut tally = ThemeTally::new("Packaging");
        tally.record(Sentiment::Positive);
        tally.record(Sentiment::Negative);
        tally.record(Sentiment::Positive);
        assert_eq!(tally.positive, 2);
        assert_eq!(tally.negative, 1);
        assert_eq!(tally.total, 3);
        assert!((tally.satisfaction_pct() - 66.666).abs() < 0.01);
    }

    #[test]
    fn percentage_of_empty_total_is_zero() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(OverallStats::default().positive_pct(), 0.0);
    }
}
