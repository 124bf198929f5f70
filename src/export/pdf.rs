use crate::error::{Result, SynthetixError};
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use synthetix_common::report::{ForensicReport, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, REPORT_TITLE};

const PT_TO_MM: f32 = 0.3528;
/// Courier の1文字幅（フォントサイズ比）
const COURIER_ADVANCE: f32 = 0.6;

const TITLE_SIZE: f32 = 22.0;
const BODY_SIZE: f32 = 12.0;
const TITLE_TOP_MM: f32 = 20.0;
/// 判定帯の上端から文字のベースラインまで
const BANNER_BASELINE_MM: f32 = 8.0;

const BACKGROUND: (u8, u8, u8) = (5, 5, 9);
const TITLE_COLOR: (u8, u8, u8) = (34, 197, 94);
const TEXT_COLOR: (u8, u8, u8) = (255, 255, 255);

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

/// 上端からの距離を PDF 座標（下端基準）に変換
fn from_top(top_mm: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - top_mm)
}

/// 中央揃えの開始位置（等幅フォント前提）
fn centered_x(text: &str, font_size: f32, center_mm: f32) -> Mm {
    let width = text.chars().count() as f32 * COURIER_ADVANCE * font_size * PT_TO_MM;
    Mm((center_mm - width / 2.0).max(0.0))
}

fn fill_rect(layer: &PdfLayerReference, x: f32, top: f32, width: f32, height: f32, color: (u8, u8, u8)) {
    layer.set_fill_color(rgb(color));
    let rect = Rect::new(
        Mm(x),
        from_top(top + height),
        Mm(x + width),
        from_top(top),
    );
    layer.add_rect(rect);
}

/// 検出レポートを PDF に書き出す
pub fn generate_report(report: &ForensicReport, output_path: &Path) -> Result<()> {
    let (doc, page1, layer1) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page1).get_layer(layer1);

    let regular = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| SynthetixError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::CourierBold)
        .map_err(|e| SynthetixError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;

    let center = PAGE_WIDTH_MM / 2.0;

    // 背景
    fill_rect(&layer, 0.0, 0.0, PAGE_WIDTH_MM, PAGE_HEIGHT_MM, BACKGROUND);

    layer.set_fill_color(rgb(TITLE_COLOR));
    layer.use_text(
        REPORT_TITLE,
        TITLE_SIZE,
        centered_x(REPORT_TITLE, TITLE_SIZE, center),
        from_top(TITLE_TOP_MM),
        &bold,
    );

    layer.set_fill_color(rgb(TEXT_COLOR));
    for line in report.info_lines() {
        layer.use_text(line.text, BODY_SIZE, Mm(line.x_mm), from_top(line.top_mm), &regular);
    }

    let banner = report.verdict_banner();
    fill_rect(
        &layer,
        banner.x_mm,
        banner.top_mm,
        banner.width_mm,
        banner.height_mm,
        banner.fill,
    );
    layer.set_fill_color(rgb(TEXT_COLOR));
    layer.use_text(
        banner.text.as_str(),
        BODY_SIZE,
        centered_x(&banner.text, BODY_SIZE, center),
        from_top(banner.top_mm + BANNER_BASELINE_MM),
        &bold,
    );

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| SynthetixError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))?;

    tracing::info!("レポート出力: {}", output_path.display());
    Ok(())
}
