use std::fmt::Write;

use crate::aggregate::{filter_and_sort, DepartmentFilter, Filter, SortKey, StatusFilter};
use crate::models::{FeedbackRecord, InsightKind};
use crate::pipeline::AnalysisReport;
use crate::suggestions::suggestions_for;

pub struct ReportScope<'a> {
    pub department: &'a DepartmentFilter,
    pub status: &'a StatusFilter,
    pub sort: SortKey,
}

pub fn build_report(
    records: &[FeedbackRecord],
    analysis: &AnalysisReport,
    scope: &ReportScope<'_>,
) -> String {
    let mut output = String::new();
    let overall = &analysis.overall;

    let _ = writeln!(output, "# Customer Feedback Report");
    let _ = writeln!(
        output,
        "Generated for department {} and status {} (sorted by {})",
        scope.department,
        scope.status,
        match scope.sort {
            SortKey::Date => "date",
            SortKey::Score => "score",
        }
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");

    if overall.total_reviews == 0 {
        let _ = writeln!(output, "No feedback recorded.");
    } else {
        let _ = writeln!(
            output,
            "- {} reviews, average score {:.1}",
            overall.total_reviews, overall.average_score
        );
        let _ = writeln!(
            output,
            "- Sentiment mix: {} positive ({:.1}%), {} negative ({:.1}%), {} neutral ({:.1}%)",
            overall.positive_count,
            overall.positive_pct(),
            overall.negative_count,
            overall.negative_pct(),
            overall.neutral_count,
            overall.neutral_pct()
        );
        if let Some(department) = overall.department_with_most_negative {
            let _ = writeln!(
                output,
                "- Most negative feedback: {}",
                department.display_name()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Departments");
    for stat in &analysis.departments {
        let _ = writeln!(
            output,
            "- {}: {} reviews (avg {:.1}), {} positive / {} negative / {} neutral, {} pending",
            stat.department.display_name(),
            stat.total_reviews,
            stat.average_score,
            stat.positive_count,
            stat.negative_count,
            stat.neutral_count,
            stat.pending_count
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Themes");
    let mentioned: Vec<_> = analysis.themes.iter().filter(|tally| tally.total > 0).collect();
    if mentioned.is_empty() {
        let _ = writeln!(output, "No themes mentioned.");
    } else {
        for tally in mentioned {
            let _ = writeln!(
                output,
                "- {}: {} mentions, {:.1}% satisfaction ({} positive, {} negative, {} neutral)",
                tally.theme,
                tally.total,
                tally.satisfaction_pct(),
                tally.positive,
                tally.negative,
                tally.neutral
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Insights");
    if analysis.synthesis.insights.is_empty() {
        let _ = writeln!(output, "No notable patterns.");
    } else {
        for insight in &analysis.synthesis.insights {
            let marker = match insight.kind {
                InsightKind::Positive => "+",
                InsightKind::Negative => "-",
                InsightKind::Warning => "!",
            };
            let _ = writeln!(output, "- [{marker}] {}", insight.message);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");
    if analysis.synthesis.recommendations.is_empty() {
        let _ = writeln!(output, "No themes need prioritized review.");
    } else {
        for recommendation in &analysis.synthesis.recommendations {
            let _ = writeln!(output, "- {}", recommendation.message);
        }
    }

    if let Filter::Only(department) = scope.department {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Suggestions for {}", department.display_name());
        for suggestion in suggestions_for(*department) {
            let _ = writeln!(output, "- {suggestion}");
        }
    }

    let listed = filter_and_sort(records, scope.department, scope.status, scope.sort);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Feedback ({} reviews)", listed.len());

    if listed.is_empty() {
        let _ = writeln!(output, "No feedback matches these filters.");
    } else {
        for record in listed.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}, {}) {}/5 {} [{}] on {}: {}",
                record.name,
                record.email,
                record.department.display_name(),
                record.score,
                record.sentiment,
                record.status,
                record.created_at.date_naive(),
                record.message
            );
        }
    }

    output
}
