//! Composition of scorer, tagger, aggregation and insight rules.

use serde::Serialize;

use crate::aggregate::{aggregate_by_department, aggregate_overall};
use crate::config::AnalyzerConfig;
use crate::insights::{synthesize, Synthesis};
use crate::models::{
    Classification, DepartmentStat, FeedbackRecord, OverallStats, Sentiment, ThemeTally,
};
use crate::sentiment::LexiconSentimentScorer;
use crate::themes::ThemeTagger;

/// Built-in dashboard samples used when no input file is given.
pub const SAMPLE_TEXTS: [&str; 10] = [
    "The product quality is excellent and shipping was fast. Very satisfied!",
    "Customer service was unhelpful and took too long to respond.",
    "Great value for money, but the packaging could be improved.",
    "Outstanding experience! Will definitely buy again.",
    "The item arrived damaged and the return process was complicated.",
    "Amazing product features, exactly what I needed.",
    "Website is difficult to navigate, checkout process needs work.",
    "Fast delivery and great communication throughout the process.",
    "Product doesn't match the description, disappointed with purchase.",
    "Excellent customer support, they resolved my issue quickly.",
];

#[derive(Debug, Clone, Default)]
pub struct FeedbackAnalyzer {
    scorer: LexiconSentimentScorer,
    tagger: ThemeTagger,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub departments: Vec<DepartmentStat>,
    pub overall: OverallStats,
    pub themes: Vec<ThemeTally>,
    #[serde(flatten)]
    pub synthesis: Synthesis,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextClassification {
    pub text: String,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeSummary {
    #[serde(flatten)]
    pub tally: ThemeTally,
    pub satisfaction_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextAnalysis {
    pub classifications: Vec<TextClassification>,
    pub overall: OverallStats,
    /// Only themes that matched at least one text.
    pub themes: Vec<ThemeSummary>,
    #[serde(flatten)]
    pub synthesis: Synthesis,
}

impl FeedbackAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            scorer: LexiconSentimentScorer::new(&config.lexicon),
            tagger: ThemeTagger::new(config.themes.clone()),
        }
    }

    pub fn scorer(&self) -> &LexiconSentimentScorer {
        &self.scorer
    }

    pub fn tagger(&self) -> &ThemeTagger {
        &self.tagger
    }

    pub fn classify(&self, text: &str) -> Classification {
        let (label, score) = self.scorer.score(text);
        let themes = self.tagger.tag(text);
        tracing::debug!(%label, score, themes = themes.len(), "classified text");
        Classification {
            label,
            score,
            themes,
        }
    }

    pub fn tally_themes(&self, records: &[FeedbackRecord]) -> Vec<ThemeTally> {
        self.tagger.tally_themes(
            records.iter().map(|record| record.message.as_str()),
            &self.scorer,
        )
    }

    /// Department and overall stats use each record's stored sentiment;
    /// theme tallies re-score the message text.
    pub fn analyze(&self, records: &[FeedbackRecord]) -> AnalysisReport {
        let departments = aggregate_by_department(records);
        let overall = aggregate_overall(records);
        let themes = self.tally_themes(records);
        let synthesis = synthesize(&overall, &themes);

        AnalysisReport {
            departments,
            overall,
            themes,
            synthesis,
        }
    }

    pub fn analyze_texts<S: AsRef<str>>(&self, texts: &[S]) -> TextAnalysis {
        let classifications: Vec<TextClassification> = texts
            .iter()
            .map(|text| TextClassification {
                text: text.as_ref().to_string(),
                classification: self.classify(text.as_ref()),
            })
            .collect();

        let count = |sentiment: Sentiment| {
            classifications
                .iter()
                .filter(|item| item.classification.label == sentiment)
                .count()
        };
        let overall = OverallStats {
            total_reviews: classifications.len(),
            positive_count: count(Sentiment::Positive),
            negative_count: count(Sentiment::Negative),
            neutral_count: count(Sentiment::Neutral),
            ..OverallStats::default()
        };

        let tallies = self
            .tagger
            .tally_themes(texts.iter().map(|text| text.as_ref()), &self.scorer);
        let synthesis = synthesize(&overall, &tallies);
        let themes = tallies
            .into_iter()
            .filter(|tally| tally.total > 0)
            .map(|tally| ThemeSummary {
                satisfaction_pct: tally.satisfaction_pct(),
                tally,
            })
            .collect();

        TextAnalysis {
            classifications,
            overall,
            themes,
            synthesis,
        }
    }
}
