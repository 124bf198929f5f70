pub mod pdf;

use crate::error::Result;
use std::path::{Path, PathBuf};
use synthetix_common::report::DEFAULT_REPORT_FILE;
use synthetix_common::ForensicReport;

/// 出力先がディレクトリなら既定のファイル名を付ける
pub fn report_path(output: Option<&Path>) -> PathBuf {
    match output {
        None => PathBuf::from(DEFAULT_REPORT_FILE),
        Some(path) if path.is_dir() || path.extension().is_none() => path.join(DEFAULT_REPORT_FILE),
        Some(path) => path.to_path_buf(),
    }
}

/// レポートを書き出して出力先を返す
pub fn export_report(report: &ForensicReport, output: Option<&Path>) -> Result<PathBuf> {
    let path = report_path(output);
    pdf::generate_report(report, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_report_path() {
        assert_eq!(report_path(None), PathBuf::from(DEFAULT_REPORT_FILE));

        let dir = tempdir().unwrap();
        assert_eq!(report_path(Some(dir.path())), dir.path().join(DEFAULT_REPORT_FILE));

        let file = dir.path().join("scan.pdf");
        assert_eq!(report_path(Some(&file)), file);
    }
}
