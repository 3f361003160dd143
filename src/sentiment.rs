use std::collections::HashSet;

use crate::config::Lexicon;
use crate::models::Sentiment;

/// Token-level lexicon scorer. Holds only immutable word sets.
#[derive(Debug, Clone)]
pub struct LexiconSentimentScorer {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl Default for LexiconSentimentScorer {
    fn default() -> Self {
        Self::new(&Lexicon::default())
    }
}

impl LexiconSentimentScorer {
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            positive: lexicon.positive.iter().map(|word| word.to_lowercase()).collect(),
            negative: lexicon.negative.iter().map(|word| word.to_lowercase()).collect(),
        }
    }

    /// Scores `text` as `net / tokens * 10`, clamped to `[-1, 1]`.
    ///
    /// Tokens are whitespace-separated and matched exactly after lowercasing,
    /// so punctuation attached to a word prevents a match.
    pub fn score(&self, text: &str) -> (Sentiment, f64) {
        let lowered = text.to_lowercase();
        let mut net: i64 = 0;
        let mut tokens: usize = 0;

        for token in lowered.split_whitespace() {
            tokens += 1;
            if self.positive.contains(token) {
                net += 1;
            } else if self.negative.contains(token) {
                net -= 1;
            }
        }

        if tokens == 0 {
            return (Sentiment::Neutral, 0.0);
        }

        let raw = net as f64 / tokens as f64 * 10.0;
        let label = match net {
            n if n > 0 => Sentiment::Positive,
            n if n < 0 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        };

        (label, raw.clamp(-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_text_is_neutral() {
        let scorer = LexiconSentimentScorer::default();
        assert_eq!(scorer.score(""), (Sentiment::Neutral, 0.0));
        assert_eq!(scorer.score("   \t\n"), (Sentiment::Neutral, 0.0));
    }

    #[test]
    fn positive_words_score_positive() {
        let scorer = LexiconSentimentScorer::default();
        let (label, score) = scorer.score("excellent and fast");
        assert_eq!(label, Sentiment::Positive);
        assert!(score > 0.0);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn negative_words_score_negative() {
        let scorer = LexiconSentimentScorer::default();
        let (label, score) = scorer.score("terrible and slow");
        assert_eq!(label, Sentiment::Negative);
        assert!(score < 0.0);
    }

    #[test]
    fn dilute_hits_are_not_clamped() {
        let scorer = LexiconSentimentScorer::default();
        let text = "good but the rest of this long message says nothing much at all really ok";
        let (label, score) = scorer.score(text);
        assert_eq!(label, Sentiment::Positive);
        let tokens = text.split_whitespace().count() as f64;
        assert!((score - 10.0 / tokens).abs() < 1e-9);
        assert!(score < 1.0);
    }

    #[test]
    fn balanced_hits_are_neutral() {
        let scorer = LexiconSentimentScorer::default();
        assert_eq!(scorer.score("great but slow"), (Sentiment::Neutral, 0.0));
    }

    #[test]
    fn matching_is_case_insensitive_and_exact() {
        let scorer = LexiconSentimentScorer::default();
        assert_eq!(scorer.score("GREAT").0, Sentiment::Positive);
        assert_eq!(scorer.score("great!").0, Sentiment::Neutral);
        assert_eq!(scorer.score("greatly").0, Sentiment::Neutral);
    }

    #[test]
    fn custom_lexicon_replaces_builtin_words() {
        let lexicon = Lexicon {
            positive: vec!["Superb".to_string()],
            negative: vec!["broken".to_string()],
        };
        let scorer = LexiconSentimentScorer::new(&lexicon);
        assert_eq!(scorer.score("superb").0, Sentiment::Positive);
        assert_eq!(scorer.score("excellent").0, Sentiment::Neutral);
        assert_eq!(scorer.score("broken").0, Sentiment::Negative);
    }

    proptest! {
        #[test]
        fn score_is_bounded_and_deterministic(text in "[a-z !]{0,80}") {
            let scorer = LexiconSentimentScorer::default();
            let first = scorer.score(&text);
            let second = scorer.score(&text);
            prop_assert_eq!(first, second);
            prop_assert!((-1.0..=1.0).contains(&first.1));
            match first.0 {
                Sentiment::Positive => prop_assert!(first.1 > 0.0),
                Sentiment::Negative => prop_assert!(first.1 < 0.0),
                Sentiment::Neutral => prop_assert_eq!(first.1, 0.0),
            }
        }
    }
}
