use clap::Parser;
use dialoguer::{Input, Password};
use std::path::Path;
use synthetix::api::ApiClient;
use synthetix::cli::{Cli, Commands};
use synthetix::config::Config;
use synthetix::error::{Result, SynthetixError};
use synthetix::history::{self, FileHistoryStore};
use synthetix::media::StagingBackend;
use synthetix::screens::{DetectScreen, GenerateScreen, JobEnv};
use synthetix::session::Session;
use synthetix::shell::{self, Shell};
use synthetix::terminal::TerminalAttention;
use synthetix::{auth, logging};
use synthetix_common::validation::LoginForm;
use synthetix_common::{JobState, TabAttentionGuard};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    let data_dir = Config::data_dir();
    if let Err(e) = logging::init(&data_dir, cli.verbose) {
        eprintln!("ログを初期化できません: {}", e);
    }
    let config_dir = Config::config_dir()?;

    match cli.command {
        Commands::Login { email, signup, name, federated } => {
            let client = ApiClient::from_config(&config)?;
            let user = match federated {
                Some(profile_path) => {
                    let profile = auth::load_federated_profile(&profile_path)?;
                    auth::complete_federated_login(&client, profile).await
                }
                None => {
                    let name = match (signup, name) {
                        (true, Some(name)) => name,
                        (true, None) => Input::new().with_prompt("Name").interact_text()?,
                        (false, _) => String::new(),
                    };
                    let email = match email {
                        Some(email) => email,
                        None => Input::new().with_prompt("Email").interact_text()?,
                    };
                    let password = Password::new().with_prompt("Password").interact()?;
                    let form = LoginForm { name, email, password, signup };
                    auth::submit_login(&client, &form).await?
                }
            };

            Session::new(user.clone()).save(&config_dir)?;
            println!("✔ ログインしました: {} <{}>", user.name, user.email);
        }

        Commands::Logout => {
            if Session::remove(&config_dir)? {
                println!("✔ ログアウトしました");
            } else {
                println!("ログインしていません");
            }
        }

        Commands::Generate { source_image, target_video, output } => {
            Session::require(&config_dir)?;
            let client = ApiClient::from_config(&config)?;
            let mut log = FileHistoryStore::open(&data_dir);
            let (platform, mut events) = TerminalAttention::new();
            let mut guard = TabAttentionGuard::new(platform);

            let mut screen = GenerateScreen::new(StagingBackend::new()?);
            screen.select_source(&source_image)?;
            screen.select_target(&target_video)?;
            let destination = output.unwrap_or_else(|| GenerateScreen::default_output(Path::new(".")));

            println!("⚡ Synthetix - 合成動画を生成");
            println!("  完了まで数分かかります。この端末を閉じないでください。\n");
            let mut env = JobEnv {
                client: &client,
                log: &mut log,
                guard: &mut guard,
                events: &mut events,
                theme: config.theme,
                profile: config.progress_profile(),
                show_progress: true,
            };
            screen.submit(&mut env, destination).await?;

            match screen.state() {
                JobState::Succeeded(video) => {
                    println!("✔ 保存しました: {} ({} bytes)", video.path.display(), video.bytes);
                }
                JobState::Failed(message) => return Err(SynthetixError::JobFailed(message.clone())),
                _ => println!("ジョブを放棄しました（サーバー側の処理は続行される場合があります）"),
            }
        }

        Commands::Detect { video, report } => {
            Session::require(&config_dir)?;
            let client = ApiClient::from_config(&config)?;
            let mut log = FileHistoryStore::open(&data_dir);
            let (platform, mut events) = TerminalAttention::new();
            let mut guard = TabAttentionGuard::new(platform);

            let mut screen = DetectScreen::new(StagingBackend::new()?);
            screen.select(&video)?;

            println!("🔍 Synthetix - ディープフェイク検出\n");
            let mut env = JobEnv {
                client: &client,
                log: &mut log,
                guard: &mut guard,
                events: &mut events,
                theme: config.theme,
                profile: config.progress_profile(),
                show_progress: true,
            };
            screen.submit(&mut env).await?;

            match screen.state() {
                JobState::Succeeded(result) => {
                    println!("{}", shell::format_verdict(result));
                }
                JobState::Failed(message) => return Err(SynthetixError::JobFailed(message.clone())),
                _ => {
                    println!("ジョブを放棄しました");
                    return Ok(());
                }
            }

            if let Some(report) = report {
                let path = screen.export_report(Some(&report))?;
                println!("✔ レポート出力: {}", path.display());
            }
        }

        Commands::History { clear } => {
            let mut log = FileHistoryStore::open(&data_dir);
            if clear {
                history::clear_history(&mut log)?;
                println!("✔ 履歴を削除しました");
            } else {
                history::print_history(&log);
            }
        }

        Commands::Config { set_api_url, toggle_theme, show } => {
            let mut changed = false;
            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ APIのURLを保存しました");
                changed = true;
            }
            if toggle_theme {
                let theme = config.toggle_theme()?;
                println!("✔ テーマ: {}", theme);
                changed = true;
            }
            if show || !changed {
                print_config(&config, &config_dir, &data_dir)?;
            }
        }

        Commands::Shell => {
            Shell::new(config, &data_dir)?.run().await?;
        }
    }

    Ok(())
}

fn print_config(config: &Config, config_dir: &Path, data_dir: &Path) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    println!();
    println!("設定ファイル: {}", Config::config_path()?.display());
    println!("セッション:   {}", Session::path(config_dir).display());
    println!("履歴:         {}", FileHistoryStore::new(data_dir).path().display());
    println!("ログ:         {}", logging::log_directory(data_dir).display());
    if let Some(session) = Session::load(config_dir) {
        println!("ログイン中:   {} <{}>", session.user.name, session.user.email);
    }
    Ok(())
}
