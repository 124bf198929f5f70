//! 検出レポートの内容
//!
//! PDF描画はCLI側（`synthetix::export::pdf`）で行い、ここでは
//! 表示する文字列・色・配置（mm単位）だけを決める。

use crate::types::{DetectionResult, Verdict};

pub const REPORT_TITLE: &str = "SYNTHETIX AI FORENSICS";
pub const DEFAULT_REPORT_FILE: &str = "Synthetix_Report.pdf";

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// 情報行（上端からの距離 mm）
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub text: String,
    pub x_mm: f32,
    pub top_mm: f32,
}

/// 判定帯
#[derive(Debug, Clone, PartialEq)]
pub struct VerdictBanner {
    pub text: String,
    pub x_mm: f32,
    pub top_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
    /// RGB (0-255)
    pub fill: (u8, u8, u8),
}

/// 検出レポート
#[derive(Debug, Clone)]
pub struct ForensicReport {
    pub file_name: String,
    pub generated_at: String,
    pub result: DetectionResult,
}

impl ForensicReport {
    pub fn new(file_name: impl Into<String>, generated_at: impl Into<String>, result: DetectionResult) -> Self {
        Self {
            file_name: file_name.into(),
            generated_at: generated_at.into(),
            result,
        }
    }

    pub fn info_lines(&self) -> Vec<ReportLine> {
        [
            format!("FILE: {}", self.file_name),
            format!("DATE: {}", self.generated_at),
            format!("MODEL: {}", self.result.model_name),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, text)| ReportLine {
            text,
            x_mm: 20.0,
            top_mm: 60.0 + i as f32 * 10.0,
        })
        .collect()
    }

    pub fn verdict_text(&self) -> String {
        format!(
            "VERDICT: {} ({:.2}%)",
            self.result.label, self.result.confidence_percentage
        )
    }

    pub fn verdict_banner(&self) -> VerdictBanner {
        let fill = match self.result.label {
            Verdict::Fake => (239, 68, 68),
            Verdict::Real => (34, 197, 94),
        };
        VerdictBanner {
            text: self.verdict_text(),
            x_mm: 20.0,
            top_mm: 100.0,
            width_mm: 170.0,
            height_mm: 15.0,
            fill,
        }
    }
}
