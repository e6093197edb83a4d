use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use ns_core::aggregate::rank_keywords;
use ns_core::{Error, Result, SentimentScore, SentimentScorer};

const POSITIVE_TERMS: &[&str] = &[
    "innovation", "breakthrough", "advance", "improve", "growth", "profit", "success",
    "launch", "release", "announce", "develop", "create", "build", "expand",
    "leadership", "market leader", "competitive", "advantage", "solution", "solve",
    "technology", "digital", "ai", "artificial intelligence", "machine learning",
    "efficiency", "performance", "quality", "award", "recognition", "partnership",
    "investment", "funding", "revenue", "sales", "customer", "user", "adoption",
];

const NEGATIVE_TERMS: &[&str] = &[
    "failure", "loss", "decline", "decrease", "problem", "issue", "error",
    "bug", "crash", "hack", "breach", "security", "privacy", "lawsuit",
    "fine", "penalty", "regulation", "ban", "restrict", "limit", "delay",
    "cancel", "shutdown", "bankruptcy", "layoff", "fired", "resign", "quit",
];

/// Phrases where a negative word describes something the company overcomes.
const OPPORTUNITY_PATTERNS: &[&str] = &[
    r"solve.*problem", r"address.*challenge", r"overcome.*obstacle",
    r"innovative.*solution", r"breakthrough.*technology", r"leading.*industry",
    r"market.*leader", r"competitive.*advantage", r"strategic.*partnership",
];

const STOPWORDS: &[&str] = &["the", "and", "for", "with", "this", "that", "from", "have", "were", "will"];

const SCORE_CAP: f64 = 0.8;
const KEYWORD_LIMIT: usize = 5;

/// Offline word-list scorer. Deterministic, needs no network.
pub struct LexiconScorer {
    word: Regex,
    patterns: Vec<Regex>,
}

impl fmt::Debug for LexiconScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexiconScorer")
            .field("patterns", &self.patterns.len())
            .finish()
    }
}

impl LexiconScorer {
    pub fn new() -> Result<Self> {
        let compile = |p: &str| {
            Regex::new(p).map_err(|e| Error::Config(format!("Invalid lexicon pattern {}: {}", p, e)))
        };
        Ok(Self {
            word: compile(r"\b\w+\b")?,
            patterns: OPPORTUNITY_PATTERNS
                .iter()
                .map(|p| compile(p))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    fn analyze(&self, company: &str, text: &str) -> Result<SentimentScore> {
        let text = text.to_lowercase();
        let words: Vec<String> = self.word.find_iter(&text).map(|m| m.as_str().to_string()).collect();
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for word in &words {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }

        let term_hits = |terms: &[&str]| -> i64 {
            terms
                .iter()
                .map(|term| {
                    if term.contains(' ') {
                        text.matches(term).count() as i64
                    } else {
                        counts.get(term).copied().unwrap_or(0)
                    }
                })
                .sum()
        };
        let positive = term_hits(POSITIVE_TERMS);
        let negative = term_hits(NEGATIVE_TERMS);
        let pattern_bonus = 2 * self.patterns.iter().filter(|p| p.is_match(&text)).count() as i64;

        let total = positive + pattern_bonus - negative;
        let raw = (total as f64 / 10.0).clamp(-SCORE_CAP, SCORE_CAP);
        let score = (raw * 100.0).round() / 100.0;
        tracing::debug!(
            "Lexicon hits for {}: +{} -{} patterns {} => {}",
            company,
            positive,
            negative,
            pattern_bonus,
            score
        );

        let keywords = rank_keywords(std::iter::once(words.as_slice()))
            .into_iter()
            .filter(|w| w.chars().count() > 3 && !STOPWORDS.contains(&w.as_str()))
            .take(KEYWORD_LIMIT)
            .collect();

        SentimentScore::new(score, summary_for(company, score), keywords)
    }
}

fn summary_for(company: &str, score: f64) -> String {
    if score > 0.3 {
        format!("Coverage points to clear positive developments for {}.", company)
    } else if score > 0.0 {
        format!("Coverage has some promising elements for {}.", company)
    } else if score < -0.3 {
        format!("Coverage raises concerns that may weigh on {}.", company)
    } else if score < 0.0 {
        format!("Coverage has some negative aspects for {}, with limited impact.", company)
    } else {
        format!("Coverage appears neutral for {}.", company)
    }
}

#[async_trait::async_trait]
impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &str {
        "Lexicon"
    }

    async fn score(&self, company: &str, text: &str) -> Result<SentimentScore> {
        if text.trim().is_empty() {
            return Err(Error::ScoringUnavailable("empty text".to_string()));
        }
        self.analyze(company, text)
    }
}
