use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{ScoreOutcome, SentimentLabel, SentimentResult};
use crate::{Error, Result};

/// Bucket that absorbs the rounding residue when several buckets share the largest count.
pub const TIE_BREAK_ORDER: [SentimentLabel; 3] = [
    SentimentLabel::Neutral,
    SentimentLabel::Positive,
    SentimentLabel::Negative,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Distribution {
    pub positive: u8,
    pub negative: u8,
    pub neutral: u8,
}

impl Distribution {
    fn slot(&mut self, label: SentimentLabel) -> &mut u8 {
        match label {
            SentimentLabel::Positive => &mut self.positive,
            SentimentLabel::Negative => &mut self.negative,
            SentimentLabel::Neutral => &mut self.neutral,
        }
    }

    pub fn total(&self) -> u32 {
        self.positive as u32 + self.negative as u32 + self.neutral as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub overall_score: f64,
    pub overall_label: SentimentLabel,
    pub scored: usize,
    pub unscored: usize,
    pub distribution: Distribution,
    pub topic_keywords: Vec<String>,
}

/// Aggregates the scored outcomes. Unscored entries are counted but never enter the statistics.
pub fn aggregate(outcomes: &[ScoreOutcome]) -> Result<AggregateStats> {
    let scored: Vec<&SentimentResult> = outcomes.iter().filter_map(ScoreOutcome::as_scored).collect();
    if scored.is_empty() {
        return Err(Error::NoData);
    }

    let overall_score = mean(scored.iter().map(|r| r.score));
    let stats = AggregateStats {
        overall_score,
        overall_label: SentimentLabel::from_score(overall_score),
        scored: scored.len(),
        unscored: outcomes.len() - scored.len(),
        distribution: distribution(scored.iter().map(|r| r.label)),
        topic_keywords: rank_keywords(scored.iter().map(|r| r.keywords.as_slice())),
    };
    tracing::debug!(
        "Aggregated {} scored / {} unscored: {:.3} {}",
        stats.scored,
        stats.unscored,
        stats.overall_score,
        stats.overall_label
    );
    Ok(stats)
}

fn mean(scores: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = scores.fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    sum / count as f64
}

/// Integer percentages per label. Sums to exactly 100 whenever at least one label is given.
pub fn distribution(labels: impl Iterator<Item = SentimentLabel>) -> Distribution {
    let mut counts: HashMap<SentimentLabel, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();
    let mut dist = Distribution::default();
    if total == 0 {
        return dist;
    }

    let count_of = |label: SentimentLabel| counts.get(&label).copied().unwrap_or(0);
    let mut rounded_sum = 0i32;
    for label in TIE_BREAK_ORDER {
        let pct = (count_of(label) as f64 * 100.0 / total as f64).round() as i32;
        *dist.slot(label) = pct as u8;
        rounded_sum += pct;
    }

    let residue = 100 - rounded_sum;
    if residue != 0 {
        // max_by_key keeps the last maximum; scan in reverse so the first in order wins.
        let target = TIE_BREAK_ORDER
            .iter()
            .rev()
            .copied()
            .max_by_key(|label| count_of(*label))
            .unwrap_or(SentimentLabel::Neutral);
        let slot = dist.slot(target);
        *slot = (*slot as i32 + residue) as u8;
    }
    dist
}

/// Case-insensitive keyword ranking: frequency descending, ties by first appearance.
pub fn rank_keywords<'a>(keyword_lists: impl Iterator<Item = &'a [String]>) -> Vec<String> {
    // (display form, count, first-seen position)
    let mut seen: HashMap<String, (String, usize, usize)> = HashMap::new();
    let mut position = 0usize;
    for keywords in keyword_lists {
        for keyword in keywords {
            let trimmed = keyword.trim();
            if trimmed.is_empty() {
                continue;
            }
            seen.entry(trimmed.to_lowercase())
                .and_modify(|entry| entry.1 += 1)
                .or_insert_with(|| (trimmed.to_string(), 1, position));
            position += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = seen.into_values().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().map(|(keyword, _, _)| keyword).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnscoredReason;

    fn scored(url: &str, score: f64, keywords: &[&str]) -> ScoreOutcome {
        ScoreOutcome::Scored(SentimentResult {
            article_url: url.to_string(),
            score,
            label: SentimentLabel::from_score(score),
            summary: format!("summary of {}", url),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
    }

    fn unscored(url: &str) -> ScoreOutcome {
        ScoreOutcome::Unscored {
            article_url: url.to_string(),
            reason: UnscoredReason::ScoringUnavailable("timeout".to_string()),
        }
    }

    #[test]
    fn test_three_article_scenario() {
        let outcomes = vec![
            scored("a", 0.8, &[]),
            scored("b", -0.2, &[]),
            scored("c", 0.0, &[]),
        ];
        let stats = aggregate(&outcomes).unwrap();
        assert!((stats.overall_score - 0.2).abs() < 1e-9);
        assert_eq!(stats.overall_label, SentimentLabel::Positive);
        assert_eq!(
            stats.distribution,
            Distribution { positive: 33, negative: 33, neutral: 34 }
        );
    }

    #[test]
    fn test_no_scored_results_is_no_data() {
        assert!(matches!(aggregate(&[]), Err(Error::NoData)));
        let all_failed = vec![unscored("a"), unscored("b"), unscored("c")];
        assert!(matches!(aggregate(&all_failed), Err(Error::NoData)));
    }

    #[test]
    fn test_unscored_excluded_from_mean() {
        let outcomes = vec![scored("a", 0.5, &[]), unscored("b"), scored("c", -0.1, &[])];
        let stats = aggregate(&outcomes).unwrap();
        assert!((stats.overall_score - 0.2).abs() < 1e-9);
        assert_eq!(stats.scored, 2);
        assert_eq!(stats.unscored, 1);
        assert_eq!(stats.distribution.total(), 100);
        assert_eq!(stats.distribution.positive, 50);
        assert_eq!(stats.distribution.neutral, 50);
    }

    #[test]
    fn test_distribution_always_sums_to_100() {
        use SentimentLabel::*;
        let cases: Vec<Vec<SentimentLabel>> = vec![
            vec![Positive],
            vec![Positive, Negative],
            vec![Positive, Negative, Neutral],
            vec![Positive, Positive, Negative, Neutral, Neutral, Neutral],
            vec![Positive, Negative, Neutral, Neutral, Neutral, Neutral, Neutral, Neutral],
            vec![Negative; 7],
            vec![Positive, Positive, Negative, Negative, Neutral, Neutral, Neutral],
        ];
        for labels in cases {
            let dist = distribution(labels.iter().copied());
            assert_eq!(dist.total(), 100, "labels {:?} gave {:?}", labels, dist);
        }
    }

    #[test]
    fn test_residue_goes_to_largest_bucket() {
        use SentimentLabel::*;
        // 1/8 = 12.5 rounds up twice; the surplus comes off the 6-count bucket.
        let dist = distribution(
            [Positive, Negative, Neutral, Neutral, Neutral, Neutral, Neutral, Neutral].into_iter(),
        );
        assert_eq!(dist, Distribution { positive: 13, negative: 13, neutral: 74 });

        // 2/3 positive: 66.67 + 33.33 rounds to 100 with no residue.
        let dist = distribution([Positive, Positive, Negative].into_iter());
        assert_eq!(dist, Distribution { positive: 67, negative: 33, neutral: 0 });
    }

    #[test]
    fn test_keywords_ranked_case_insensitively() {
        let outcomes = vec![
            scored("a", 0.3, &["AI", "Chips", "earnings"]),
            scored("b", 0.1, &["chips", "Lawsuit"]),
            scored("c", -0.4, &["lawsuit", "ai", "CHIPS", " "]),
            unscored("d"),
        ];
        let stats = aggregate(&outcomes).unwrap();
        assert_eq!(stats.topic_keywords, vec!["Chips", "AI", "Lawsuit", "earnings"]);
    }
}
