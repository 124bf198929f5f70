//! tracing によるログ設定
//!
//! 進捗表示を崩さないよう、ログは端末ではなくファイルへ出力する。

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_NAME: &str = "synthetix.log";

/// ログを初期化
///
/// 出力先は `<data_dir>/logs/`、レベルは `SYNTHETIX_LOG` で変更できる。
///
/// ```bash
/// SYNTHETIX_LOG=debug synthetix detect clip.mp4
/// ```
pub fn init(data_dir: &Path, verbose: bool) -> Result<()> {
    let log_dir = log_directory(data_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let default_filter = if verbose {
        "synthetix=debug,synthetix_common=debug,warn"
    } else {
        "synthetix=info,synthetix_common=info,warn"
    };
    let env_filter = EnvFilter::try_from_env("SYNTHETIX_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("Synthetix client starting (log dir: {})", log_dir.display());
    Ok(())
}

pub fn log_directory(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}
