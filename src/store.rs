use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Department, FeedbackRecord, Sentiment, Status, Submission};
use crate::pipeline::FeedbackAnalyzer;

/// Ordered feedback collection backing the admin view. Newest submissions
/// sit at the front; records are never removed.
#[derive(Debug, Clone, Default)]
pub struct FeedbackStore {
    records: Vec<FeedbackRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: Option<Uuid>,
    name: String,
    email: String,
    score: u8,
    message: String,
    department: Department,
    sentiment: Option<Sentiment>,
    sentiment_score: Option<f64>,
    created_at: String,
    status: Option<Status>,
}

impl FeedbackStore {
    pub fn new(records: Vec<FeedbackRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&FeedbackRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Validates and classifies a submission, then stores it as a pending
    /// record. A rejected submission leaves the store unchanged.
    pub fn submit(
        &mut self,
        submission: Submission,
        analyzer: &FeedbackAnalyzer,
    ) -> Result<&FeedbackRecord> {
        if let Err(err) = validate(&submission) {
            tracing::warn!(error = %err, "rejected feedback submission");
            return Err(err);
        }

        let (sentiment, sentiment_score) = analyzer.scorer().score(&submission.message);
        let record = FeedbackRecord {
            id: Uuid::new_v4(),
            name: submission.name.trim().to_string(),
            email: submission.email.trim().to_string(),
            score: submission.score,
            message: submission.message.trim().to_string(),
            department: submission.department.unwrap_or(Department::Support),
            sentiment,
            sentiment_score,
            created_at: Utc::now(),
            status: Status::Pending,
        };

        tracing::info!(id = %record.id, department = %record.department, %sentiment, "stored feedback");
        self.records.insert(0, record);
        Ok(&self.records[0])
    }

    /// Replaces the status of the record with `id` in place. Returns `false`
    /// and leaves the store untouched when no such record exists.
    pub fn set_status(&mut self, id: Uuid, status: Status) -> bool {
        match self.records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                record.status = status;
                true
            }
            None => {
                tracing::warn!(%id, "status update for unknown feedback id ignored");
                false
            }
        }
    }

    /// The curated records shown in the admin view before any submission.
    pub fn seeded(analyzer: &FeedbackAnalyzer) -> Self {
        let records = SEED
            .iter()
            .map(|seed| {
                let (_, sentiment_score) = analyzer.scorer().score(seed.message);
                FeedbackRecord {
                    id: Uuid::from_u128(seed.id),
                    name: seed.name.to_string(),
                    email: seed.email.to_string(),
                    score: seed.score,
                    message: seed.message.to_string(),
                    department: seed.department,
                    sentiment: seed.sentiment,
                    sentiment_score,
                    created_at: seed_timestamp(seed.date),
                    status: seed.status,
                }
            })
            .collect();
        Self { records }
    }

    /// Loads records from CSV. Blank `sentiment` or `sentiment_score` cells
    /// are filled in by the scorer; a blank `id` gets a fresh UUID. A score
    /// outside 1..=5 or a sentiment score outside [-1, 1] fails the load.
    pub fn load_csv(path: &Path, analyzer: &FeedbackAnalyzer) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();

        for result in reader.deserialize::<CsvRow>() {
            let row = result?;
            if !(1..=5).contains(&row.score) {
                return Err(Error::Parse {
                    kind: "score",
                    value: row.score.to_string(),
                });
            }
            if let Some(score) = row.sentiment_score {
                if !(-1.0..=1.0).contains(&score) {
                    return Err(Error::Parse {
                        kind: "sentiment_score",
                        value: score.to_string(),
                    });
                }
            }
            let (computed_label, computed_score) = analyzer.scorer().score(&row.message);
            records.push(FeedbackRecord {
                id: row.id.unwrap_or_else(Uuid::new_v4),
                name: row.name,
                email: row.email,
                score: row.score,
                message: row.message,
                department: row.department,
                sentiment: row.sentiment.unwrap_or(computed_label),
                sentiment_score: row.sentiment_score.unwrap_or(computed_score),
                created_at: parse_timestamp(&row.created_at)?,
                status: row.status.unwrap_or_default(),
            });
        }

        tracing::debug!(path = %path.display(), records = records.len(), "loaded feedback csv");
        Ok(Self { records })
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(CsvRow {
                id: Some(record.id),
                name: record.name.clone(),
                email: record.email.clone(),
                score: record.score,
                message: record.message.clone(),
                department: record.department,
                sentiment: Some(record.sentiment),
                sentiment_score: Some(record.sentiment_score),
                created_at: record.created_at.to_rfc3339(),
                status: Some(record.status),
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub fn validate(submission: &Submission) -> Result<()> {
    let missing: Vec<&str> = [
        ("name", &submission.name),
        ("email", &submission.email),
        ("message", &submission.message),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if !missing.is_empty() {
        return Err(Error::InvalidSubmission(format!(
            "missing {}",
            missing.join(", ")
        )));
    }
    if !(1..=5).contains(&submission.score) {
        return Err(Error::InvalidSubmission(format!(
            "score {} is outside 1..=5",
            submission.score
        )));
    }
    Ok(())
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::Parse {
            kind: "timestamp",
            value: value.to_string(),
        })
}

fn seed_timestamp((year, month, day): (i32, u32, u32)) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

struct SeedRecord {
    id: u128,
    name: &'static str,
    email: &'static str,
    score: u8,
    message: &'static str,
    department: Department,
    sentiment: Sentiment,
    date: (i32, u32, u32),
    status: Status,
}

const SEED: [SeedRecord; 12] = [
    SeedRecord {
        id: 1,
        name: "John Doe",
        email: "john.doe@example.com",
        score: 5,
        message: "Excellent product quality! The engineering team has delivered outstanding features.",
        department: Department::Engineering,
        sentiment: Sentiment::Positive,
        date: (2024, 1, 15),
        status: Status::Reviewed,
    },
    SeedRecord {
        id: 2,
        name: "Sarah Johnson",
        email: "sarah.j@example.com",
        score: 4,
        message: "Great marketing campaigns, but could improve targeting strategy.",
        department: Department::Marketing,
        sentiment: Sentiment::Positive,
        date: (2024, 1, 20),
        status: Status::Resolved,
    },
    SeedRecord {
        id: 3,
        name: "Mike Chen",
        email: "mike.chen@example.com",
        score: 2,
        message: "Sales process is too complicated and takes too long to complete.",
        department: Department::Sales,
        sentiment: Sentiment::Negative,
        date: (2024, 1, 25),
        status: Status::Pending,
    },
    SeedRecord {
        id: 4,
        name: "Emily Rodriguez",
        email: "emily.r@example.com",
        score: 5,
        message: "Support team was incredibly helpful and resolved my issue quickly.",
        department: Department::Support,
        sentiment: Sentiment::Positive,
        date: (2024, 2, 1),
        status: Status::Reviewed,
    },
    SeedRecord {
        id: 5,
        name: "David Wilson",
        email: "david.w@example.com",
        score: 1,
        message: "HR department is unresponsive and policies are unclear.",
        department: Department::Hr,
        sentiment: Sentiment::Negative,
        date: (2024, 2, 5),
        status: Status::Pending,
    },
    SeedRecord {
        id: 6,
        name: "Lisa Brown",
        email: "lisa.brown@example.com",
        score: 3,
        message: "Finance processes are average, nothing special but gets the job done.",
        department: Department::Finance,
        sentiment: Sentiment::Neutral,
        date: (2024, 2, 10),
        status: Status::Reviewed,
    },
    SeedRecord {
        id: 7,
        name: "Alex Turner",
        email: "alex.turner@example.com",
        score: 5,
        message: "Engineering team delivered the new features ahead of schedule!",
        department: Department::Engineering,
        sentiment: Sentiment::Positive,
        date: (2024, 2, 12),
        status: Status::Resolved,
    },
    SeedRecord {
        id: 8,
        name: "Jessica Lee",
        email: "jessica.lee@example.com",
        score: 2,
        message: "Marketing materials are outdated and not engaging enough.",
        department: Department::Marketing,
        sentiment: Sentiment::Negative,
        date: (2024, 2, 15),
        status: Status::Pending,
    },
    SeedRecord {
        id: 9,
        name: "Robert Kim",
        email: "robert.kim@example.com",
        score: 4,
        message: "Sales team is knowledgeable but follow-up could be better.",
        department: Department::Sales,
        sentiment: Sentiment::Positive,
        date: (2024, 2, 18),
        status: Status::Reviewed,
    },
    SeedRecord {
        id: 10,
        name: "Amanda Davis",
        email: "amanda.davis@example.com",
        score: 3,
        message: "Support response time is okay, not great but acceptable.",
        department: Department::Support,
        sentiment: Sentiment::Neutral,
        date: (2024, 2, 20),
        status: Status::Pending,
    },
    SeedRecord {
        id: 11,
        name: "Kevin Zhang",
        email: "kevin.zhang@example.com",
        score: 1,
        message: "HR policies are confusing and the onboarding process is terrible.",
        department: Department::Hr,
        sentiment: Sentiment::Negative,
        date: (2024, 2, 22),
        status: Status::Pending,
    },
    SeedRecord {
        id: 12,
        name: "Maria Garcia",
        email: "maria.garcia@example.com",
        score: 4,
        message: "Finance department is efficient and processes payments quickly.",
        department: Department::Finance,
        sentiment: Sentiment::Positive,
        date: (2024, 2, 25),
        status: Status::Reviewed,
    },
];

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn submission(name: &str, email: &str, score: u8, message: &str) -> Submission {
        Submission {
            name: name.to_string(),
            email: email.to_string(),
            score,
            message: message.to_string(),
            department: None,
        }
    }

    #[test]
    fn submit_creates_pending_record_at_front() {
        let analyzer = FeedbackAnalyzer::default();
        let mut store = FeedbackStore::seeded(&analyzer);
        let record = store
            .submit(
                submission("Kiara Patel", "kiara@example.com", 5, "great support"),
                &analyzer,
            )
            .unwrap()
            .clone();

        assert_eq!(record.status, Status::Pending);
        assert_eq!(record.department, Department::Support);
        assert_eq!(record.sentiment, Sentiment::Positive);
        assert_eq!(store.len(), 13);
        assert_eq!(store.records()[0].id, record.id);
    }

    #[test]
    fn submit_rejects_missing_fields_without_inserting() {
        let analyzer = FeedbackAnalyzer::default();
        let mut store = FeedbackStore::default();

        let err = store
            .submit(submission("", "kiara@example.com", 4, "   "), &analyzer)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSubmission(message) if message == "missing name, message"));

        assert!(store
            .submit(submission("Kiara", "kiara@example.com", 0, "fine"), &analyzer)
            .is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn submit_keeps_explicit_department() {
        let analyzer = FeedbackAnalyzer::default();
        let mut store = FeedbackStore::default();
        let mut input = submission("Jules", "jules@example.com", 2, "checkout is slow");
        input.department = Some(Department::Engineering);
        let record = store.submit(input, &analyzer).unwrap();
        assert_eq!(record.department, Department::Engineering);
        assert_eq!(record.sentiment, Sentiment::Negative);
    }

    #[test]
    fn set_status_updates_in_place() {
        let analyzer = FeedbackAnalyzer::default();
        let mut store = FeedbackStore::seeded(&analyzer);
        let before = store.records().to_vec();
        let target = before[2].id;

        assert!(store.set_status(target, Status::Resolved));

        let after = store.records();
        assert_eq!(after[2].id, target);
        assert_eq!(after[2].status, Status::Resolved);
        assert_eq!(after[2].message, before[2].message);
        for (index, record) in after.iter().enumerate().filter(|(i, _)| *i != 2) {
            assert_eq!(record, &before[index]);
        }
    }

    #[test]
    fn set_status_on_unknown_id_is_a_no_op() {
        let analyzer = FeedbackAnalyzer::default();
        let mut store = FeedbackStore::seeded(&analyzer);
        let before = store.records().to_vec();
        assert!(!store.set_status(Uuid::new_v4(), Status::Reviewed));
        assert_eq!(store.records(), before.as_slice());
    }

    #[test]
    fn csv_round_trip_preserves_records() {
        let analyzer = FeedbackAnalyzer::default();
        let store = FeedbackStore::seeded(&analyzer);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");

        store.save_csv(&path).unwrap();
        let loaded = FeedbackStore::load_csv(&path, &analyzer).unwrap();
        assert_eq!(loaded.records(), store.records());
        let first = store.records()[0].id;
        assert_eq!(loaded.get(first).map(|record| record.name.as_str()), Some("John Doe"));
        assert!(loaded.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn every_seed_date_is_a_real_day() {
        for seed in &SEED {
            let (year, month, day) = seed.date;
            assert!(
                NaiveDate::from_ymd_opt(year, month, day).is_some(),
                "seed {} has an invalid date",
                seed.id
            );
        }
        let store = FeedbackStore::seeded(&FeedbackAnalyzer::default());
        assert!(store
            .records()
            .iter()
            .all(|record| record.created_at.date_naive().year() == 2024));
    }

    #[test]
    fn csv_blank_cells_are_filled_in() {
        let analyzer = FeedbackAnalyzer::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.csv");
        std::fs::write(
            &path,
            "id,name,email,score,message,department,sentiment,sentiment_score,created_at,status\n\
             ,Avery Lee,avery@example.com,2,the checkout is terrible,support,,,2024-03-01,\n",
        )
        .unwrap();

        let loaded = FeedbackStore::load_csv(&path, &analyzer).unwrap();
        let record = &loaded.records()[0];
        assert_eq!(record.sentiment, Sentiment::Negative);
        assert!(record.sentiment_score < 0.0);
        assert_eq!(record.status, Status::Pending);
        assert_eq!(record.created_at.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn csv_bad_timestamp_is_an_error() {
        let analyzer = FeedbackAnalyzer::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "id,name,email,score,message,department,sentiment,sentiment_score,created_at,status\n\
             ,Avery,avery@example.com,3,fine,sales,,,yesterday,\n",
        )
        .unwrap();
        assert!(matches!(
            FeedbackStore::load_csv(&path, &analyzer),
            Err(Error::Parse { kind: "timestamp", .. })
        ));
    }

    #[test]
    fn csv_rows_outside_the_score_ranges_are_rejected() {
        let analyzer = FeedbackAnalyzer::default();
        let dir = tempfile::tempdir().unwrap();
        let header = "id,name,email,score,message,department,sentiment,sentiment_score,created_at,status\n";

        let low = dir.path().join("low.csv");
        std::fs::write(&low, format!("{header},Avery,avery@example.com,0,fine,sales,,,2024-03-01,\n")).unwrap();
        assert!(matches!(
            FeedbackStore::load_csv(&low, &analyzer),
            Err(Error::Parse { kind: "score", value }) if value == "0"
        ));

        let high = dir.path().join("high.csv");
        std::fs::write(&high, format!("{header},Avery,avery@example.com,9,fine,sales,,,2024-03-01,\n")).unwrap();
        assert!(matches!(
            FeedbackStore::load_csv(&high, &analyzer),
            Err(Error::Parse { kind: "score", .. })
        ));

        let polar = dir.path().join("polar.csv");
        std::fs::write(
            &polar,
            format!("{header},Avery,avery@example.com,3,fine,sales,positive,7.5,2024-03-01,\n"),
        )
        .unwrap();
        assert!(matches!(
            FeedbackStore::load_csv(&polar, &analyzer),
            Err(Error::Parse { kind: "sentiment_score", .. })
        ));
    }
}
