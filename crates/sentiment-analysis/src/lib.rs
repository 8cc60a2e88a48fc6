use analysis_core::{NewsArticle, NewsItem, SentimentAnalysis, SentimentScore};
use std::collections::HashSet;

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

const NEGATION_WINDOW: usize = 3;

/// Normalization constant for squashing a raw lexicon sum into [-1, 1]
/// (`x / sqrt(x^2 + alpha)`), the same curve VADER uses for its compound score.
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Headlines kept per analysis
pub const MAX_HEADLINES: usize = 5;

/// Finance-tuned word-list sentiment scorer for news headlines.
pub struct SentimentAnalysisEngine {
    positive_words: HashSet<&'static str>,
    negative_words: HashSet<&'static str>,
    negation_words: HashSet<&'static str>,
}

impl SentimentAnalysisEngine {
    pub fn new() -> Self {
        let positive_words = [
            "bullish", "rally", "rallies", "surge", "surges", "gain", "gains", "profit",
            "growth", "beat", "beats", "upgrade", "outperform", "strong", "positive", "rise",
            "rises", "increase", "breakthrough", "innovation", "success", "exceed", "exceeds",
            "momentum", "buy", "recommend", "optimistic", "record", "high", "advance",
            // Financial-specific terms
            "dividend", "buyback", "repurchase", "accretive", "upside",
            "recovery", "rebound", "expansion", "robust", "accelerating",
            "overweight", "raised", "upgraded", "initiated",
            "reiterated", "outpacing", "tailwind", "soar", "soars", "jump", "jumps",
        ];
        let negative_words = [
            "bearish", "decline", "declines", "loss", "losses", "fall", "falls", "plunge",
            "plunges", "crash", "miss", "misses", "downgrade", "underperform", "weak",
            "negative", "drop", "drops", "decrease", "concern", "concerns", "risk", "fail",
            "disappoint", "disappoints", "slump", "sell", "warning", "pessimistic", "low",
            "retreat", "fear", "fears", "trouble",
            // Financial-specific terms
            "dilution", "dilutive", "headwind", "lawsuit", "litigation",
            "recall", "investigation", "probe", "default", "bankruptcy",
            "restructuring", "layoff", "layoffs", "downside", "overvalued", "bubble",
            "underweight", "lowered", "suspended", "tumble", "tumbles", "sink", "sinks",
        ];

        Self {
            positive_words: positive_words.into_iter().collect(),
            negative_words: negative_words.into_iter().collect(),
            negation_words: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    /// Raw lexicon score: +1 per positive word, -1 per negative word, flipped
    /// when a negation word appears within [`NEGATION_WINDOW`] words before it.
    fn analyze_text(&self, text: &str) -> f64 {
        let text_lower = text.to_lowercase();
        // Split into words, stripping common punctuation
        let words: Vec<&str> = text_lower
            .split(|c: char| {
                c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')')
            })
            .filter(|w| !w.is_empty())
            .collect();

        let negation_positions: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.negation_words.contains(*w))
            .map(|(i, _)| i)
            .collect();

        let mut score: i32 = 0;

        for (i, word) in words.iter().enumerate() {
            let is_positive = self.positive_words.contains(*word);
            let is_negative = self.negative_words.contains(*word);

            if !is_positive && !is_negative {
                continue;
            }

            let negated = negation_positions
                .iter()
                .any(|&neg_pos| neg_pos < i && (i - neg_pos) <= NEGATION_WINDOW);

            if is_positive {
                score += if negated { -1 } else { 1 };
            } else {
                score += if negated { 1 } else { -1 };
            }
        }

        score as f64
    }

    /// Polarity of one headline in [-1, 1].
    pub fn headline_polarity(&self, title: &str) -> f64 {
        let raw = self.analyze_text(title);
        (raw / (raw * raw + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
    }

    /// Score up to [`MAX_HEADLINES`] distinct headlines and aggregate them into
    /// a normalized sentiment reading. No headlines yields the neutral reading.
    pub fn analyze(&self, articles: &[NewsArticle]) -> SentimentAnalysis {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut top_headlines: Vec<NewsItem> = Vec::with_capacity(MAX_HEADLINES);
        for article in articles {
            if top_headlines.len() == MAX_HEADLINES {
                break;
            }
            let title = article.title.trim();
            if title.is_empty() || !seen.insert(title) {
                continue;
            }
            top_headlines.push(NewsItem {
                title: title.to_string(),
                source: article.source.clone(),
                url: article.url.clone(),
                published_at: article.published_at,
                sentiment_score: self.headline_polarity(title),
            });
        }

        if top_headlines.is_empty() {
            tracing::debug!("No headlines to score, using neutral sentiment");
            return SentimentAnalysis::neutral();
        }

        let average = top_headlines.iter().map(|h| h.sentiment_score).sum::<f64>()
            / top_headlines.len() as f64;
        let score = SentimentScore::from_polarity(average, top_headlines.len());

        tracing::debug!(
            "Scored {} headlines: polarity {:.3}, normalized {:.1}",
            score.headline_count,
            score.raw_polarity,
            score.score_normalized
        );

        SentimentAnalysis {
            score,
            top_headlines,
        }
    }
}

impl Default for SentimentAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
