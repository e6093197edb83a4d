use ns_core::Article;
use regex::Regex;

/// Case-insensitive check that an article is about a company: the exact name, and for
/// multi-word names the reversed order and the two initial forms ("Tata M." / "T. Motors").
#[derive(Debug, Clone)]
pub struct CompanyMatcher {
    pattern: Regex,
}

impl CompanyMatcher {
    /// `None` when the name has no words.
    pub fn new(company: &str) -> Option<Self> {
        let parts: Vec<String> = company
            .trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let (first, last) = (parts.first()?, parts.last()?);

        let forward: Vec<&str> = parts.iter().map(String::as_str).collect();
        let mut variants = vec![phrase(&forward)];
        if parts.len() > 1 {
            let reversed: Vec<&str> = forward.iter().rev().copied().collect();
            variants.push(phrase(&reversed));
            let last_initial = format!("{}.", initial(last));
            variants.push(phrase(&[first.as_str(), last_initial.as_str()]));
            let first_initial = format!("{}.", initial(first));
            variants.push(phrase(&[first_initial.as_str(), last.as_str()]));
        }

        let source = format!(r"(?i)(?:^|\W)(?:{})(?:\W|$)", variants.join("|"));
        match Regex::new(&source) {
            Ok(pattern) => Some(Self { pattern }),
            Err(e) => {
                tracing::warn!("⚠️ Could not build a name pattern for '{}': {}", company, e);
                None
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Title or body mentions the company.
    pub fn mentioned_in(&self, article: &Article) -> bool {
        self.is_match(&article.title) || self.is_match(&article.raw_text)
    }
}

/// Escaped words separated by any run of whitespace.
fn phrase(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join(r"\s+")
}

fn initial(word: &str) -> String {
    word.chars().next().map(String::from).unwrap_or_default()
}
