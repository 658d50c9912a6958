//! Classifier offline dựa trên từ điển tài chính.
//!
//! Dùng khi không có quyền truy cập inference API. Kết quả thô hơn FinBERT
//! nhưng có cùng tập nhãn positive / negative / neutral.

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::{three_way_labels, SentimentClassifier};
use crate::error::{SentimentError, SentimentResult};
use crate::types::{Classification, SentimentLabel, NEGATIVE, NEUTRAL, POSITIVE};

/// |net| nhỏ hơn ngưỡng này thì coi là neutral
const NEUTRAL_BAND: f64 = 0.25;

/// Số token phía trước còn chịu ảnh hưởng của từ phủ định
const NEGATION_WINDOW: usize = 2;

static WEIGHTS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let positive: &[(&str, f64)] = &[
        ("bullish", 0.8),
        ("surge", 0.7),
        ("surges", 0.7),
        ("surged", 0.7),
        ("rally", 0.7),
        ("rallies", 0.7),
        ("rallied", 0.7),
        ("soar", 0.8),
        ("soars", 0.8),
        ("soared", 0.8),
        ("gain", 0.5),
        ("gains", 0.5),
        ("gained", 0.5),
        ("profit", 0.6),
        ("profits", 0.6),
        ("growth", 0.6),
        ("rise", 0.5),
        ("rises", 0.5),
        ("rose", 0.5),
        ("climb", 0.5),
        ("climbs", 0.5),
        ("firm", 0.3),
        ("firms", 0.3),
        ("firmer", 0.4),
        ("improve", 0.5),
        ("improves", 0.5),
        ("outperform", 0.7),
        ("beat", 0.6),
        ("beats", 0.6),
        ("strong", 0.5),
        ("stronger", 0.5),
        ("optimistic", 0.6),
        ("optimism", 0.6),
        ("record", 0.6),
        ("upgrade", 0.6),
        ("upgrades", 0.6),
        ("recovery", 0.5),
        ("recovers", 0.5),
        ("rebound", 0.5),
        ("rebounds", 0.5),
        ("boost", 0.5),
        ("boosts", 0.5),
    ];

    let negative: &[(&str, f64)] = &[
        ("bearish", -0.8),
        ("crash", -0.9),
        ("crashes", -0.9),
        ("plunge", -0.8),
        ("plunges", -0.8),
        ("plunged", -0.8),
        ("slump", -0.7),
        ("slumps", -0.7),
        ("tumble", -0.7),
        ("tumbles", -0.7),
        ("drop", -0.6),
        ("drops", -0.6),
        ("dropped", -0.6),
        ("fall", -0.5),
        ("falls", -0.5),
        ("fell", -0.5),
        ("decline", -0.6),
        ("declines", -0.6),
        ("loss", -0.6),
        ("losses", -0.6),
        ("weak", -0.5),
        ("weaker", -0.5),
        ("slide", -0.5),
        ("slides", -0.5),
        ("pessimistic", -0.6),
        ("concern", -0.5),
        ("concerns", -0.5),
        ("worry", -0.5),
        ("worries", -0.5),
        ("fear", -0.6),
        ("fears", -0.6),
        ("risk", -0.4),
        ("risks", -0.4),
        ("volatile", -0.3),
        ("uncertainty", -0.5),
        ("uncertain", -0.5),
        ("miss", -0.6),
        ("misses", -0.6),
        ("disappoint", -0.7),
        ("disappoints", -0.7),
        ("downgrade", -0.6),
        ("downgrades", -0.6),
        ("selloff", -0.6),
        ("sell-off", -0.6),
        ("crisis", -0.8),
        ("warning", -0.5),
        ("warns", -0.5),
        ("recession", -0.8),
        ("default", -0.7),
        ("fraud", -0.9),
    ];

    positive.iter().chain(negative.iter()).copied().collect()
});

static NEGATIONS: &[&str] = &[
    "not", "no", "never", "without", "cannot", "can't", "cant", "isn't", "isnt",
    "aren't", "arent", "doesn't", "doesnt", "didn't", "didnt", "won't", "wont",
    "hardly", "barely",
];

/// Kết quả chấm điểm từ điển
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconScore {
    /// Tổng trọng số sau khi xử lý phủ định
    pub net: f64,
    /// Số từ khớp từ điển
    pub matched: usize,
}

/// Tách text thành các token chữ thường
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
        .map(|token| token.trim_matches(|c| c == '\'' || c == '-').to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Chấm điểm text theo từ điển, có xử lý phủ định
pub fn score_text(text: &str) -> LexiconScore {
    let mut net = 0.0;
    let mut matched = 0;
    let mut negation_left = 0usize;

    for token in tokenize(text) {
        if NEGATIONS.contains(&token.as_str()) {
            negation_left = NEGATION_WINDOW;
            continue;
        }

        if let Some(weight) = WEIGHTS.get(token.as_str()) {
            let weight = if negation_left > 0 { -weight } else { *weight };
            net += weight;
            matched += 1;
        }

        negation_left = negation_left.saturating_sub(1);
    }

    LexiconScore { net, matched }
}

/// Classifier từ điển, không cần mạng
#[derive(Debug, Default, Clone)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Đổi điểm từ điển thành nhãn và độ tin cậy trong [0.5, 1]
    pub fn label_for(score: &LexiconScore) -> Classification {
        if score.matched == 0 {
            return Classification::new(NEUTRAL, 0.5);
        }

        let magnitude = score.net.abs();
        if magnitude < NEUTRAL_BAND {
            let confidence = (1.0 - magnitude).clamp(0.5, 1.0);
            return Classification::new(NEUTRAL, confidence);
        }

        let confidence = (0.5 + magnitude / 2.0).min(1.0);
        let label = if score.net > 0.0 { POSITIVE } else { NEGATIVE };
        Classification::new(label, confidence)
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> SentimentResult<Classification> {
        if text.trim().is_empty() {
            return Err(SentimentError::ClassificationFailure(
                "không thể phân loại text rỗng".to_string(),
            ));
        }
        Ok(Self::label_for(&score_text(text)))
    }

    fn known_labels(&self) -> Vec<SentimentLabel> {
        three_way_labels()
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
