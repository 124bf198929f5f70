use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "synthetix")]
#[command(about = "Synthetix AI クライアント（顔合成・ディープフェイク検出）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ログイン（新規登録・外部IDプロファイルにも対応）
    Login {
        /// メールアドレス（省略時は入力を求める）
        #[arg(short, long)]
        email: Option<String>,

        /// 新規登録する
        #[arg(long)]
        signup: bool,

        /// 表示名（新規登録時）
        #[arg(short, long)]
        name: Option<String>,

        /// 外部IDプロバイダのプロフィールJSON
        #[arg(long, conflicts_with_all = ["email", "signup", "name"])]
        federated: Option<PathBuf>,
    },

    /// ログアウト
    Logout,

    /// 顔画像と動画から合成動画を生成
    Generate {
        /// 元の顔画像
        #[arg(required = true)]
        source_image: PathBuf,

        /// 対象動画
        #[arg(required = true)]
        target_video: PathBuf,

        /// 出力ファイル（デフォルト: synthetix_<ミリ秒>.mp4）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 動画がディープフェイクか判定
    Detect {
        /// 解析する動画
        #[arg(required = true)]
        video: PathBuf,

        /// PDFレポートの出力先（ファイルまたはディレクトリ）
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// 履歴を表示
    History {
        /// 履歴を全削除
        #[arg(long)]
        clear: bool,
    },

    /// 設定を表示・変更
    Config {
        /// APIのURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// テーマを切り替え（dark/light）
        #[arg(long)]
        toggle_theme: bool,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 対話シェルを起動
    Shell,
}
