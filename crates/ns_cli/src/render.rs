use std::fmt::Write;

use ns_core::{Report, ScoreOutcome};

/// Plain-text rendering. Missing parts are spelled out, never shown as zero.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "📊 Sentiment report for {} ({}, {})",
        report.company,
        report.provider,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out);

    if report.entries.is_empty() {
        let _ = writeln!(out, "No articles found.");
    }
    for (i, entry) in report.entries.iter().enumerate() {
        let article = &entry.article;
        match &entry.sentiment {
            ScoreOutcome::Scored(result) => {
                let _ = writeln!(
                    out,
                    "{:>2}. {} {} {:+.2}  {}",
                    i + 1,
                    result.label.emoji(),
                    result.label,
                    result.score,
                    article.title
                );
            }
            ScoreOutcome::Unscored { reason, .. } => {
                let _ = writeln!(out, "{:>2}. ∅ unscored ({})  {}", i + 1, reason, article.title);
            }
        }
        let mut meta = vec![article.url.clone()];
        if let Some(source) = &article.source {
            meta.push(source.clone());
        }
        meta.push(
            article
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "date unknown".to_string()),
        );
        let _ = writeln!(out, "    {}", meta.join(" · "));
        if let Some(result) = entry.sentiment.as_scored() {
            let _ = writeln!(out, "    {}", result.summary);
            if !result.keywords.is_empty() {
                let _ = writeln!(out, "    keywords: {}", result.keywords.join(", "));
            }
        }
    }
    let _ = writeln!(out);

    match &report.aggregate {
        Some(stats) => {
            let _ = writeln!(
                out,
                "Overall: {} {} ({:+.2}) across {} scored, {} unscored",
                stats.overall_label.emoji(),
                stats.overall_label,
                stats.overall_score,
                stats.scored,
                stats.unscored
            );
            let dist = &stats.distribution;
            let _ = writeln!(
                out,
                "Distribution: {}% positive, {}% negative, {}% neutral",
                dist.positive, dist.negative, dist.neutral
            );
            if !stats.topic_keywords.is_empty() {
                let _ = writeln!(out, "Topics: {}", stats.topic_keywords.join(", "));
            }
        }
        None => {
            let _ = writeln!(out, "Overall: no data ({} articles, none could be scored)", report.entries.len());
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "{}", report.narrative.text);

    if let Some(spoken) = &report.spoken {
        let _ = writeln!(out);
        match &spoken.translated_text {
            Some(text) => {
                let _ = writeln!(out, "Spoken summary ({}):", spoken.language);
                let _ = writeln!(out, "{}", text);
            }
            None => {
                let _ = writeln!(out, "Spoken summary ({}): unavailable", spoken.language);
            }
        }
        let audio = match &spoken.audio {
            Some(clip) => format!("{} bytes of {}", clip.bytes.len(), clip.mime_type),
            None => "unavailable".to_string(),
        };
        let _ = writeln!(out, "Audio: {}", audio);
        for issue in &spoken.issues {
            let _ = writeln!(out, "  ⚠️ {}", issue);
        }
    }
    out
}
