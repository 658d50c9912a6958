//! Biểu đồ cột số tiêu đề theo nhãn, xuất ra SVG.

use std::fs;
use std::path::PathBuf;

use minijinja::context;
use serde::Serialize;
use tracing::info;

use crate::error::SentimentResult;
use crate::summary::SentimentSummary;
use crate::templates::{environment, CHART_TEMPLATE};

// Kích thước ảnh (px)
const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const MAX_TICKS: usize = 10;

const COOL: (u8, u8, u8) = (0x3b, 0x4c, 0xc0);
const MID: (u8, u8, u8) = (0xdd, 0xdd, 0xdd);
const WARM: (u8, u8, u8) = (0xb4, 0x04, 0x26);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub count: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub center: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: usize,
    pub y: f64,
}

/// Màu thứ `index` trong `n` màu trải từ xanh sang đỏ (kiểu coolwarm)
pub fn coolwarm(index: usize, n: usize) -> String {
    let t = if n <= 1 { 0.5 } else { index as f64 / (n - 1) as f64 };
    let (from, to, local) = if t < 0.5 {
        (COOL, MID, t * 2.0)
    } else {
        (MID, WARM, (t - 0.5) * 2.0)
    };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * local).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        lerp(from.0, to.0),
        lerp(from.1, to.1),
        lerp(from.2, to.2)
    )
}

fn tick_step(max: usize) -> usize {
    let mut step = 1;
    while max / step > MAX_TICKS {
        step = match step.to_string().chars().next() {
            Some('1') => step * 2,
            Some('2') => step / 2 * 5,
            _ => step * 2,
        };
    }
    step
}

/// Tính toạ độ các cột và vạch trục y
pub fn layout(summary: &SentimentSummary) -> (Vec<Bar>, Vec<Tick>) {
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = HEIGHT - MARGIN_BOTTOM;
    let axis_max = summary.max_count().max(1);
    let n = summary.len();

    let bars = summary
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            let slot = plot_width / n as f64;
            let height = plot_height * count as f64 / axis_max as f64;
            let x = MARGIN_LEFT + slot * i as f64 + slot * 0.1;
            Bar {
                label: label.to_string(),
                count,
                x,
                y: baseline - height,
                width: slot * 0.8,
                height,
                center: x + slot * 0.4,
                color: coolwarm(i, n),
            }
        })
        .collect();

    let step = tick_step(axis_max);
    let ticks = (0..=axis_max)
        .step_by(step)
        .map(|value| Tick {
            value,
            y: baseline - plot_height * value as f64 / axis_max as f64,
        })
        .collect();

    (bars, ticks)
}

/// Vẽ biểu đồ và ghi ra file
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    title: String,
    output_path: PathBuf,
}

impl ChartRenderer {
    pub fn new(title: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            output_path: output_path.into(),
        }
    }

    pub fn render_svg(&self, summary: &SentimentSummary) -> SentimentResult<String> {
        let (bars, ticks) = layout(summary);
        let template = environment()?.get_template(CHART_TEMPLATE)?;
        let svg = template.render(context! {
            title => &self.title,
            width => WIDTH,
            height => HEIGHT,
            left => MARGIN_LEFT,
            right => WIDTH - MARGIN_RIGHT,
            top => MARGIN_TOP,
            baseline => HEIGHT - MARGIN_BOTTOM,
            plot_center => MARGIN_LEFT + (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / 2.0,
            plot_middle => MARGIN_TOP + (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM) / 2.0,
            bars => bars,
            ticks => ticks,
            empty => summary.total() == 0,
        })?;
        Ok(svg)
    }

    /// Ghi SVG ra `output_path`, tạo thư mục cha nếu cần
    pub fn write(&self, svg: &str) -> SentimentResult<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.output_path, svg)?;
        info!("Đã lưu biểu đồ sentiment tại {}", self.output_path.display());
        Ok(())
    }
}
