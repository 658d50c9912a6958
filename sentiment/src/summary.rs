use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{SentimentLabel, SentimentRecord};

/// Số tiêu đề theo từng nhãn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SentimentSummary(BTreeMap<SentimentLabel, usize>);

impl SentimentSummary {
    pub fn get(&self, label: &SentimentLabel) -> usize {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.0.values().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SentimentLabel, usize)> {
        self.0.iter().map(|(label, count)| (label, *count))
    }
}

/// Đếm record theo nhãn.
///
/// Mọi nhãn trong `known_labels` đều có mặt (0 nếu không xuất hiện) để trục
/// biểu đồ ổn định; nhãn lạ do classifier trả về vẫn được đếm. Với
/// `known_labels` rỗng kết quả là dạng thưa.
pub fn summarize(records: &[SentimentRecord], known_labels: &[SentimentLabel]) -> SentimentSummary {
    let mut counts: BTreeMap<SentimentLabel, usize> =
        known_labels.iter().map(|label| (label.clone(), 0)).collect();

    for record in records {
        *counts.entry(record.label().clone()).or_insert(0) += 1;
    }

    SentimentSummary(counts)
}
