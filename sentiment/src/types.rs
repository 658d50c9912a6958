use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SentimentError, SentimentResult};

pub const POSITIVE: &str = "positive";
pub const NEGATIVE: &str = "negative";
pub const NEUTRAL: &str = "neutral";

/// Tiêu đề một bài báo. Không rỗng, đã trim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Headline(String);

impl Headline {
    pub fn new(text: impl AsRef<str>) -> SentimentResult<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SentimentError::ClassificationFailure(
                "tiêu đề rỗng".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Headline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Headline {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Nhãn sentiment do classifier định nghĩa (tập mở), chuẩn hóa chữ thường.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentLabel(String);

impl SentimentLabel {
    pub fn new(raw: impl AsRef<str>) -> SentimentResult<Self> {
        let normalized = raw.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(SentimentError::ClassificationFailure(
                "classifier trả về nhãn rỗng".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn positive() -> Self {
        Self(POSITIVE.to_string())
    }

    pub fn negative() -> Self {
        Self(NEGATIVE.to_string())
    }

    pub fn neutral() -> Self {
        Self(NEUTRAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kết quả thô của classifier cho một đoạn text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Một dòng kết quả: tiêu đề, nhãn, độ tin cậy.
///
/// Chỉ tạo được qua [`SentimentRecord::new`], nên nhãn luôn khác rỗng và
/// score luôn nằm trong [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRecord {
    headline: Headline,
    #[serde(rename = "sentiment")]
    label: SentimentLabel,
    score: f64,
}

impl SentimentRecord {
    pub fn new(headline: Headline, label: SentimentLabel, score: f64) -> SentimentResult<Self> {
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(SentimentError::ClassificationFailure(format!(
                "score {} nằm ngoài [0, 1]",
                score
            )));
        }
        Ok(Self {
            headline,
            label,
            score,
        })
    }

    /// Dựng record từ output của classifier, kiểm tra nhãn và score
    pub fn from_classification(
        headline: Headline,
        classification: Classification,
    ) -> SentimentResult<Self> {
        let label = SentimentLabel::new(&classification.label)?;
        Self::new(headline, label, classification.score)
    }

    pub fn headline(&self) -> &Headline {
        &self.headline
    }

    pub fn label(&self) -> &SentimentLabel {
        &self.label
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}
