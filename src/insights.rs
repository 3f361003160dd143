use serde::Serialize;

use crate::models::{Insight, InsightKind, OverallStats, Recommendation, ThemeTally};

pub const POSITIVE_SHARE_THRESHOLD: f64 = 70.0;
pub const NEGATIVE_SHARE_THRESHOLD: f64 = 30.0;
pub const THEME_NEGATIVE_RATE: f64 = 0.4;
pub const THEME_POSITIVE_RATE: f64 = 0.7;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Synthesis {
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
}

/// Applies the overall-sentiment rule, then one rule per theme in the order
/// the tallies are given. Themes with no occurrences are skipped.
pub fn synthesize(overall: &OverallStats, tallies: &[ThemeTally]) -> Synthesis {
    let mut synthesis = Synthesis::default();

    if overall.total_reviews > 0 {
        let positive_pct = overall.positive_pct();
        let negative_pct = overall.negative_pct();
        if positive_pct > POSITIVE_SHARE_THRESHOLD {
            synthesis.insights.push(Insight {
                kind: InsightKind::Positive,
                message: format!(
                    "Strong customer satisfaction with {positive_pct:.1}% positive feedback"
                ),
            });
        } else if negative_pct > NEGATIVE_SHARE_THRESHOLD {
            synthesis.insights.push(Insight {
                kind: InsightKind::Negative,
                message: format!("High negative sentiment detected ({negative_pct:.1}%)"),
            });
        }
    }

    for tally in tallies.iter().filter(|tally| tally.total > 0) {
        let total = tally.total as f64;
        let negative_rate = tally.negative as f64 / total;
        let positive_rate = tally.positive as f64 / total;

        if negative_rate > THEME_NEGATIVE_RATE {
            synthesis.insights.push(Insight {
                kind: InsightKind::Warning,
                message: format!(
                    "{} shows concerning negative feedback ({:.1}%)",
                    tally.theme,
                    negative_rate * 100.0
                ),
            });
            synthesis.recommendations.push(Recommendation {
                theme: tally.theme.clone(),
                message: format!(
                    "Prioritize improvements in {} - consider customer feedback review",
                    tally.theme
                ),
            });
        } else if positive_rate > THEME_POSITIVE_RATE {
            synthesis.insights.push(Insight {
                kind: InsightKind::Positive,
                message: format!("{} is performing well with high satisfaction", tally.theme),
            });
        }
    }

    tracing::debug!(
        insights = synthesis.insights.len(),
        recommendations = synthesis.recommendations.len(),
        "synthesized insights"
    );

    synthesis
}
