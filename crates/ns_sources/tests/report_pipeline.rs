use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ns_core::{
    AudioClip, CompletionRequest, Error, NarrativeOrigin, ProviderKind, Result, ScoreOutcome,
    SentimentLabel, SentimentScore, SentimentScorer, SpeechSynthesizer, TextModel, Translator,
    UnscoredReason, INSUFFICIENT_DATA_MESSAGE,
};
use ns_inference::{NarrativeMerger, Speaker};
use ns_sources::providers::newsapi::{NewsApiArticle, NewsApiSource};
use ns_sources::{NewsProvider, PageFetcher, RawArticle, ReportManager, ReportRequest, ScrapedPage};

struct FakeProvider {
    records: Vec<(&'static str, &'static str, &'static str)>,
    fail: bool,
}

#[async_trait]
impl NewsProvider for FakeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::NewsApi
    }

    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, _company: &str, _limit: usize) -> Result<Vec<RawArticle>> {
        if self.fail {
            return Err(Error::FetchUnavailable("connection refused".to_string()));
        }
        Ok(self
            .records
            .iter()
            .map(|(url, title, body)| {
                RawArticle::NewsApi(NewsApiArticle {
                    title: Some(title.to_string()),
                    url: Some(url.to_string()),
                    description: None,
                    content: Some(body.to_string()),
                    published_at: Some("2024-03-05T10:00:00Z".to_string()),
                    source: Some(NewsApiSource {
                        name: Some("Wire".to_string()),
                    }),
                })
            })
            .collect())
    }
}

struct NoPages;

#[async_trait]
impl PageFetcher for NoPages {
    async fn fetch_page(&self, url: &str) -> Result<ScrapedPage> {
        Err(Error::FetchUnavailable(format!("{}: 403", url)))
    }
}

/// Scores by headline; the delay makes later articles finish first.
struct FakeScorer {
    scores: Vec<(&'static str, Option<f64>)>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeScorer {
    fn new(scores: Vec<(&'static str, Option<f64>)>) -> Arc<Self> {
        Arc::new(Self {
            scores,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SentimentScorer for FakeScorer {
    fn name(&self) -> &str {
        "fake"
    }

    async fn score(&self, _company: &str, text: &str) -> Result<SentimentScore> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let position = self
            .scores
            .iter()
            .position(|(title, _)| text.starts_with(title))
            .unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(30 * (self.scores.len() - position) as u64)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.scores.get(position).and_then(|(_, score)| *score) {
            Some(score) => SentimentScore::new(score, format!("Summary of {}.", text.lines().next().unwrap_or("")), vec!["widgets".to_string()]),
            None => Err(Error::ScoringUnavailable("rate limited".to_string())),
        }
    }
}

struct CountingModel {
    calls: AtomicUsize,
}

#[async_trait]
impl TextModel for CountingModel {
    fn name(&self) -> &str {
        "counting"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("Acme saw mixed coverage this week.".to_string())
    }
}

struct EchoTranslator;

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String> {
        Ok(format!("({}) {}", target, text))
    }
}

struct BrokenSynth;

#[async_trait]
impl SpeechSynthesizer for BrokenSynth {
    async fn synthesize(&self, _text: &str, _lang: &str) -> Result<AudioClip> {
        Err(Error::AudioUnavailable("tts quota exceeded".to_string()))
    }
}

const RECORDS: [(&str, &str, &str); 3] = [
    ("https://wire.com/a", "Acme record sales", "Acme sold more widgets than ever."),
    ("https://wire.com/b", "Acme recall", "Acme recalled a batch of widgets."),
    ("https://wire.com/c", "Acme board meeting", "The board met on Tuesday."),
];

fn manager(
    provider: FakeProvider,
    scorer: Arc<FakeScorer>,
    model: Arc<CountingModel>,
) -> ReportManager {
    ReportManager::new(Arc::new(NoPages), scorer, NarrativeMerger::with_model(model))
        .with_provider(Arc::new(provider))
        .with_concurrency(2)
}

fn counting_model() -> Arc<CountingModel> {
    Arc::new(CountingModel {
        calls: AtomicUsize::new(0),
    })
}

#[tokio::test]
async fn test_report_keeps_article_order_and_aggregates() {
    let scorer = FakeScorer::new(vec![
        ("Acme record sales", Some(0.8)),
        ("Acme recall", Some(-0.2)),
        ("Acme board meeting", Some(0.0)),
    ]);
    let model = counting_model();
    let provider = FakeProvider {
        records: RECORDS.to_vec(),
        fail: false,
    };
    let manager = manager(provider, scorer.clone(), model.clone());

    let report = manager
        .generate(&ReportRequest::new("Acme", ProviderKind::NewsApi))
        .await
        .unwrap();

    let urls: Vec<&str> = report.entries.iter().map(|e| e.article.url.as_str()).collect();
    assert_eq!(urls, vec!["https://wire.com/a", "https://wire.com/b", "https://wire.com/c"]);
    for entry in &report.entries {
        assert_eq!(entry.article.url, entry.sentiment.article_url());
    }
    let labels: Vec<SentimentLabel> = report
        .entries
        .iter()
        .filter_map(|e| e.sentiment.as_scored().map(|s| s.label))
        .collect();
    assert_eq!(
        labels,
        vec![SentimentLabel::Positive, SentimentLabel::Negative, SentimentLabel::Neutral]
    );

    let stats = report.aggregate.as_ref().unwrap();
    assert!((stats.overall_score - 0.2).abs() < 1e-9);
    assert_eq!(stats.overall_label, SentimentLabel::Positive);
    assert_eq!(
        (stats.distribution.positive, stats.distribution.negative, stats.distribution.neutral),
        (33, 33, 34)
    );
    assert_eq!(report.narrative.origin, NarrativeOrigin::Generated);
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    assert!(scorer.max_in_flight.load(Ordering::SeqCst) <= 2);
    assert!(report.spoken.is_none());
}

#[tokio::test]
async fn test_all_scoring_failed_is_no_data() {
    let scorer = FakeScorer::new(vec![
        ("Acme record sales", None),
        ("Acme recall", None),
        ("Acme board meeting", None),
    ]);
    let model = counting_model();
    let provider = FakeProvider {
        records: RECORDS.to_vec(),
        fail: false,
    };
    let report = manager(provider, scorer, model.clone())
        .generate(&ReportRequest::new("Acme", ProviderKind::NewsApi))
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.unscored_count(), 3);
    assert!(report.aggregate.is_none());
    assert_eq!(report.overall_score(), None);
    assert_eq!(report.narrative.text, INSUFFICIENT_DATA_MESSAGE);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_article_listed_as_unscored() {
    let scorer = FakeScorer::new(vec![("Acme record sales", Some(0.5)), ("Acme recall", Some(-0.5))]);
    let provider = FakeProvider {
        records: vec![RECORDS[0], ("https://wire.com/empty", "Acme recall", "")],
        fail: false,
    };
    let report = manager(provider, scorer, counting_model())
        .generate(&ReportRequest::new("Acme", ProviderKind::NewsApi))
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 2);
    match &report.entries[1].sentiment {
        ScoreOutcome::Unscored { article_url, reason } => {
            assert_eq!(article_url, "https://wire.com/empty");
            assert_eq!(reason, &UnscoredReason::EmptyText);
        }
        other => panic!("expected unscored, got {:?}", other),
    }
    let stats = report.aggregate.unwrap();
    assert_eq!((stats.scored, stats.unscored), (1, 1));
    assert_eq!(stats.distribution.positive, 100);
}

#[tokio::test]
async fn test_off_topic_articles_are_not_scored() {
    let scorer = FakeScorer::new(vec![("Acme record sales", Some(0.8)), ("Weather", Some(-0.9))]);
    let provider = FakeProvider {
        records: vec![
            ("https://weather.com/eu", "Weather turns mild across Europe", "Sunny skies ahead."),
            RECORDS[0],
        ],
        fail: false,
    };
    let report = manager(provider, scorer, counting_model())
        .generate(&ReportRequest::new("Acme", ProviderKind::NewsApi))
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].article.url, "https://wire.com/a");
    let stats = report.aggregate.unwrap();
    assert_eq!(stats.overall_label, SentimentLabel::Positive);
    assert_eq!(stats.distribution.positive, 100);
}

#[tokio::test]
async fn test_fetch_failure_yields_empty_report() {
    let model = counting_model();
    let provider = FakeProvider {
        records: vec![],
        fail: true,
    };
    let report = manager(provider, FakeScorer::new(vec![]), model.clone())
        .generate(&ReportRequest::new("Acme", ProviderKind::NewsApi))
        .await
        .unwrap();
    assert!(report.entries.is_empty());
    assert!(report.aggregate.is_none());
    assert!(report.narrative.is_fallback());
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_speech_failure_keeps_report() {
    let scorer = FakeScorer::new(vec![
        ("Acme record sales", Some(0.8)),
        ("Acme recall", Some(-0.2)),
        ("Acme board meeting", Some(0.0)),
    ]);
    let provider = FakeProvider {
        records: RECORDS.to_vec(),
        fail: false,
    };
    let manager = manager(provider, scorer, counting_model())
        .with_speaker(Speaker::new(Arc::new(EchoTranslator), Arc::new(BrokenSynth)));

    let report = manager
        .generate(&ReportRequest::new("Acme", ProviderKind::NewsApi).with_language("hi"))
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 3);
    assert!(report.aggregate.is_some());
    let spoken = report.spoken.as_ref().unwrap();
    assert_eq!(spoken.language, "hi");
    assert_eq!(
        spoken.translated_text.as_deref(),
        Some("(hi) Acme saw mixed coverage this week.")
    );
    assert!(report.audio().is_none());
    assert!(spoken.issues[0].contains("tts quota exceeded"));
}

#[tokio::test]
async fn test_unconfigured_source_is_rejected() {
    let provider = FakeProvider {
        records: vec![],
        fail: false,
    };
    let manager = manager(provider, FakeScorer::new(vec![]), counting_model());
    let result = manager
        .generate(&ReportRequest::new("Acme", ProviderKind::Bing))
        .await;
    assert!(matches!(result, Err(Error::Config(_))));

    let sources = manager.sources();
    assert_eq!(sources.len(), 2);
    assert!(sources[0].configured);
    assert!(!sources[1].configured);
}
