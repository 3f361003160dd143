use crate::config::{default_themes, ThemeDefinition};
use crate::models::ThemeTally;
use crate::sentiment::LexiconSentimentScorer;

/// Multi-label keyword tagger over an ordered theme catalog.
#[derive(Debug, Clone)]
pub struct ThemeTagger {
    themes: Vec<ThemeDefinition>,
}

impl Default for ThemeTagger {
    fn default() -> Self {
        Self::new(default_themes())
    }
}

impl ThemeTagger {
    pub fn new(themes: Vec<ThemeDefinition>) -> Self {
        let themes = themes
            .into_iter()
            .map(|theme| ThemeDefinition {
                name: theme.name,
                keywords: theme
                    .keywords
                    .into_iter()
                    .map(|keyword| keyword.to_lowercase())
                    .collect(),
            })
            .collect();
        Self { themes }
    }

    pub fn themes(&self) -> &[ThemeDefinition] {
        &self.themes
    }

    /// Names of every theme with a keyword contained in some token of `text`,
    /// in catalog order.
    pub fn tag(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        self.themes
            .iter()
            .filter(|theme| theme_matches(theme, &tokens))
            .map(|theme| theme.name.clone())
            .collect()
    }

    /// One tally per catalog theme, in catalog order, including themes that
    /// matched nothing.
    pub fn tally_themes<'a, I>(&self, texts: I, scorer: &LexiconSentimentScorer) -> Vec<ThemeTally>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tallies: Vec<ThemeTally> = self
            .themes
            .iter()
            .map(|theme| ThemeTally::new(theme.name.clone()))
            .collect();

        for text in texts {
            let (label, _) = scorer.score(text);
            let lowered = text.to_lowercase();
            let tokens: Vec<&str> = lowered.split_whitespace().collect();
            for (theme, tally) in self.themes.iter().zip(tallies.iter_mut()) {
                if theme_matches(theme, &tokens) {
                    tally.record(label);
                }
            }
        }

        tallies
    }
}

fn theme_matches(theme: &ThemeDefinition, tokens: &[&str]) -> bool {
    theme
        .keywords
        .iter()
        .any(|keyword| tokens.iter().any(|token| token.contains(keyword.as_str())))
}
