//! Pipeline phân loại: tiêu đề → classifier → danh sách record.
//!
//! Chính sách lỗi cố định là skip-and-continue: tiêu đề nào classifier không
//! xử lý được (hoặc trả về nhãn/score sai dạng) sẽ được log, ghi vào
//! `skipped` và bỏ khỏi kết quả. Một tiêu đề lỗi không làm hỏng cả lượt chạy.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use crate::classifier::SentimentClassifier;
use crate::types::{Headline, SentimentRecord};

/// Tiêu đề bị bỏ qua và lý do
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedHeadline {
    pub index: usize,
    pub headline: Headline,
    pub reason: String,
}

/// Kết quả một lượt phân loại
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationRun {
    /// Record theo đúng thứ tự đầu vào
    pub records: Vec<SentimentRecord>,
    pub skipped: Vec<SkippedHeadline>,
}

impl ClassificationRun {
    pub fn total(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Phân loại từng tiêu đề, giữ nguyên thứ tự.
///
/// `concurrency` là số lời gọi classifier tối đa đang chạy cùng lúc
/// (0 được coi là 1). Kết quả luôn giống hệt khi chạy tuần tự.
pub async fn classify_all(
    headlines: &[Headline],
    classifier: &dyn SentimentClassifier,
    concurrency: usize,
) -> ClassificationRun {
    let outcomes: Vec<_> = stream::iter(0..headlines.len())
        .map(|index| {
            let headline = &headlines[index];
            async move {
                let outcome = classifier
                    .classify(headline.as_str())
                    .await
                    .and_then(|c| SentimentRecord::from_classification(headline.clone(), c));
                (index, headline, outcome)
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut run = ClassificationRun::default();
    for (index, headline, outcome) in outcomes {
        match outcome {
            Ok(record) => {
                debug!(index, label = %record.label(), score = record.score(), "Đã phân loại tiêu đề");
                run.records.push(record);
            }
            Err(e) => {
                warn!(index, headline = %headline, error = %e, "Bỏ qua tiêu đề không phân loại được");
                run.skipped.push(SkippedHeadline {
                    index,
                    headline: headline.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    run
}
