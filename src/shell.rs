//! 対話シェル
//!
//! ログイン → ダッシュボード → 生成/検出 の画面遷移をメニューで操作する。
//! 履歴・設定はどの画面からも開けるサイドバー扱い。

use crate::api::ApiClient;
use crate::app::{AppContext, Message, View};
use crate::auth;
use crate::config::Config;
use crate::error::{Result, SynthetixError};
use crate::history::{self, FileHistoryStore};
use crate::media::StagingBackend;
use crate::screens::{DetectScreen, GenerateScreen, JobEnv};
use crate::session::Session;
use crate::terminal::TerminalAttention;
use dialoguer::{Confirm, Input, Password, Select};
use std::path::{Path, PathBuf};
use synthetix_common::validation::{self, LoginForm};
use synthetix_common::{
    ActivityLog, AttentionEvent, DetectionResult, JobState, SlotKind, TabAttentionGuard,
};
use tokio::sync::mpsc;

pub struct Shell {
    config: Config,
    config_dir: PathBuf,
    client: Option<ApiClient>,
    ctx: AppContext,
    log: ActivityLog<FileHistoryStore>,
    generate: GenerateScreen,
    detect: DetectScreen,
    guard: TabAttentionGuard<TerminalAttention>,
    events: mpsc::UnboundedReceiver<AttentionEvent>,
}

/// 画面の操作結果
enum Flow {
    Continue,
    Quit,
}

impl Shell {
    pub fn new(config: Config, data_dir: &Path) -> Result<Self> {
        let config_dir = Config::config_dir()?;
        let user = Session::load(&config_dir).map(|session| session.user);
        let (platform, events) = TerminalAttention::new();

        let mut shell = Self {
            ctx: AppContext::new(config.theme, user),
            config,
            config_dir,
            client: None,
            log: FileHistoryStore::open(data_dir),
            generate: GenerateScreen::new(StagingBackend::new()?),
            detect: DetectScreen::new(StagingBackend::new()?),
            guard: TabAttentionGuard::new(platform),
            events,
        };
        shell.refresh_client();
        Ok(shell)
    }

    /// 設定から API クライアントを作り直す
    fn refresh_client(&mut self) {
        self.client = match ApiClient::from_config(&self.config) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("APIクライアントを作成できません: {}", e);
                None
            }
        };
    }

    pub async fn run(mut self) -> Result<()> {
        println!("⚡ Synthetix AI\n");

        loop {
            let flow = if self.ctx.history_open {
                self.history_sidebar()?
            } else if self.ctx.settings_open {
                self.settings_sidebar()?
            } else {
                match self.ctx.view {
                    View::Login => self.login_view().await?,
                    View::Home => self.home_view()?,
                    View::Generate => self.generate_view().await?,
                    View::Detect => self.detect_view().await?,
                }
            };

            if let Flow::Quit = flow {
                break;
            }
        }

        println!("Bye.");
        Ok(())
    }

    // ===== ログイン =====

    async fn login_view(&mut self) -> Result<Flow> {
        let items = [
            "Sign in",
            "Create account",
            "Continue with identity provider profile",
            "Quit",
        ];
        let choice = Select::new()
            .with_prompt("Welcome to Synthetix")
            .items(&items)
            .default(0)
            .interact()?;

        let Some(client) = self.client.clone() else {
            if choice != 3 {
                println!("✗ {}", SynthetixError::MissingApiUrl);
                self.prompt_api_url()?;
            }
            return Ok(if choice == 3 { Flow::Quit } else { Flow::Continue });
        };

        let user = match choice {
            0 | 1 => {
                let signup = choice == 1;
                let name = if signup {
                    Input::<String>::new().with_prompt("Name").interact_text()?
                } else {
                    String::new()
                };
                let email: String = Input::new().with_prompt("Email").interact_text()?;
                let password = Password::new().with_prompt("Password").interact()?;

                let form = LoginForm {
                    name,
                    email,
                    password,
                    signup,
                };
                match auth::submit_login(&client, &form).await {
                    Ok(user) => user,
                    Err(e) => {
                        println!("✗ {}", e.user_message("Authentication failed"));
                        return Ok(Flow::Continue);
                    }
                }
            }
            2 => {
                let path: String = Input::new()
                    .with_prompt("Profile JSON path")
                    .interact_text()?;
                match auth::load_federated_profile(Path::new(path.trim())) {
                    Ok(profile) => auth::complete_federated_login(&client, profile).await,
                    Err(e) => {
                        println!("✗ Login Failed: {}", e);
                        return Ok(Flow::Continue);
                    }
                }
            }
            _ => return Ok(Flow::Quit),
        };

        Session::new(user.clone()).save(&self.config_dir)?;
        println!("✔ Welcome, {}\n", display_name(&user.name, &user.email));
        self.ctx.update(Message::LoggedIn(user));
        Ok(Flow::Continue)
    }

    // ===== ダッシュボード =====

    fn home_view(&mut self) -> Result<Flow> {
        let items = [
            "Generate (face synthesis)",
            "Detect (forensic scan)",
            "History",
            "Settings",
            "Logout",
            "Quit",
        ];
        let choice = Select::new()
            .with_prompt("Dashboard")
            .items(&items)
            .default(0)
            .interact()?;

        match choice {
            0 => self.ctx.update(Message::Navigate(View::Generate)),
            1 => self.ctx.update(Message::Navigate(View::Detect)),
            2 => self.ctx.update(Message::ToggleHistory),
            3 => self.ctx.update(Message::ToggleSettings),
            4 => self.logout()?,
            _ => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn logout(&mut self) -> Result<()> {
        Session::remove(&self.config_dir)?;
        self.generate.reset();
        self.detect.reset();
        self.ctx.update(Message::Logout);
        println!("✔ Logged out\n");
        Ok(())
    }

    // ===== 生成 =====

    async fn generate_view(&mut self) -> Result<Flow> {
        println!("\nDeepfake Synthesis");
        for kind in [SlotKind::SourceImage, SlotKind::TargetVideo] {
            match self.generate.slot(kind) {
                Some(slot) => println!("  {}: {}", kind.label(), slot.file_name()),
                None => println!("  {}: -", kind.label()),
            }
        }
        print_job_state(self.generate.state(), |video| {
            format!("✔ Saved: {} ({} bytes)", video.path.display(), video.bytes)
        });

        let items = [
            "Select source face (image)",
            "Select target video",
            "Start generation",
            "Generate another",
            "History",
            "Settings",
            "Back",
        ];
        let choice = Select::new()
            .with_prompt("Generate")
            .items(&items)
            .default(0)
            .interact()?;

        match choice {
            0 | 1 => {
                let path = prompt_path("File path")?;
                let result = if choice == 0 {
                    self.generate.select_source(&path).map(|_| ())
                } else {
                    self.generate.select_target(&path).map(|_| ())
                };
                if let Err(e) = result {
                    println!("✗ {}", e.user_message(&e.to_string()));
                }
            }
            2 => {
                let default = GenerateScreen::default_output(&std::env::current_dir()?);
                let output: String = Input::new()
                    .with_prompt("Save result to")
                    .default(default.display().to_string())
                    .interact_text()?;

                let Some(client) = self.client.as_ref() else {
                    println!("✗ {}", SynthetixError::MissingApiUrl);
                    return Ok(Flow::Continue);
                };
                println!("Keep this terminal open and focused until the job finishes.");
                let mut env = JobEnv {
                    client,
                    log: &mut self.log,
                    guard: &mut self.guard,
                    events: &mut self.events,
                    theme: self.ctx.theme,
                    profile: self.config.progress_profile(),
                    show_progress: true,
                };
                if let Err(e) = self.generate.submit(&mut env, PathBuf::from(output.trim())).await {
                    println!("✗ {}", e.user_message(&e.to_string()));
                }
            }
            3 => self.generate.reset(),
            4 => self.ctx.update(Message::ToggleHistory),
            5 => self.ctx.update(Message::ToggleSettings),
            _ => self.ctx.update(Message::Navigate(View::Home)),
        }
        Ok(Flow::Continue)
    }

    // ===== 検出 =====

    async fn detect_view(&mut self) -> Result<Flow> {
        println!("\nForensic Detection Unit");
        match self.detect.slot() {
            Some(slot) => println!("  Video: {}", slot.file_name()),
            None => println!("  Video: -"),
        }
        print_job_state(self.detect.state(), format_verdict);

        let has_result = self.detect.result().is_some();
        let items: &[&str] = if has_result {
            &["Download report (PDF)", "Scan another video", "History", "Settings", "Back"]
        } else {
            &["Select video", "Clear selection", "Start scan", "History", "Settings", "Back"]
        };
        let choice = Select::new()
            .with_prompt("Detect")
            .items(items)
            .default(0)
            .interact()?;

        match (has_result, choice) {
            (true, 0) => {
                let output: String = Input::new()
                    .with_prompt("Save report to")
                    .default(synthetix_common::report::DEFAULT_REPORT_FILE.to_string())
                    .interact_text()?;
                match self.detect.export_report(Some(Path::new(output.trim()))) {
                    Ok(path) => println!("✔ Report: {}", path.display()),
                    Err(e) => println!("✗ {}", e),
                }
            }
            (true, 1) => self.detect.reset(),
            (false, 0) => {
                let path = prompt_path("Video path")?;
                if let Err(e) = self.detect.select(&path) {
                    println!("✗ {}", e.user_message(&e.to_string()));
                }
            }
            (false, 1) => self.detect.clear_selection(),
            (false, 2) => {
                let Some(client) = self.client.as_ref() else {
                    println!("✗ {}", SynthetixError::MissingApiUrl);
                    return Ok(Flow::Continue);
                };
                let mut env = JobEnv {
                    client,
                    log: &mut self.log,
                    guard: &mut self.guard,
                    events: &mut self.events,
                    theme: self.ctx.theme,
                    profile: self.config.progress_profile(),
                    show_progress: true,
                };
                if let Err(e) = self.detect.submit(&mut env).await {
                    println!("✗ {}", e.user_message(&e.to_string()));
                }
            }
            (true, 2) | (false, 3) => self.ctx.update(Message::ToggleHistory),
            (true, 3) | (false, 4) => self.ctx.update(Message::ToggleSettings),
            _ => self.ctx.update(Message::Navigate(View::Home)),
        }
        Ok(Flow::Continue)
    }

    // ===== サイドバー =====

    fn history_sidebar(&mut self) -> Result<Flow> {
        println!();
        history::print_history(&self.log);

        let items = ["Close", "Clear history"];
        let choice = Select::new()
            .with_prompt("History")
            .items(&items)
            .default(0)
            .interact()?;

        if choice == 1
            && Confirm::new()
                .with_prompt("Delete all entries?")
                .default(false)
                .interact()?
        {
            history::clear_history(&mut self.log)?;
            println!("✔ History cleared");
        }
        self.ctx.update(Message::CloseSidebars);
        Ok(Flow::Continue)
    }

    fn settings_sidebar(&mut self) -> Result<Flow> {
        let theme_item = format!("Theme: {} (toggle)", self.ctx.theme);
        let mut items = vec![theme_item.as_str(), "Set API URL"];
        if self.ctx.is_logged_in() {
            items.extend(["Edit profile", "Change password", "Logout"]);
        }
        items.push("Close");

        let choice = Select::new()
            .with_prompt("Settings")
            .items(&items[..])
            .default(0)
            .interact()?;

        match items[choice] {
            "Set API URL" => self.prompt_api_url()?,
            "Edit profile" => self.edit_profile()?,
            "Change password" => change_password()?,
            "Logout" => self.logout()?,
            "Close" => self.ctx.update(Message::CloseSidebars),
            _ => {
                self.ctx.update(Message::ToggleTheme);
                self.config.theme = self.ctx.theme;
                self.config.save()?;
                println!("✔ Theme: {}", self.ctx.theme);
            }
        }
        Ok(Flow::Continue)
    }

    fn prompt_api_url(&mut self) -> Result<()> {
        let url: String = Input::new()
            .with_prompt("API URL")
            .default(self.config.api_url.clone().unwrap_or_default())
            .interact_text()?;

        match self.config.set_api_url(url.trim().to_string()) {
            Ok(()) => {
                self.refresh_client();
                println!("✔ API URL saved");
            }
            Err(e) => println!("✗ {}", e),
        }
        Ok(())
    }

    fn edit_profile(&mut self) -> Result<()> {
        let Some(current) = self.ctx.user.clone() else {
            return Ok(());
        };
        let name: String = Input::new()
            .with_prompt("Name")
            .default(current.name.clone())
            .interact_text()?;
        let email: String = Input::new()
            .with_prompt("Email")
            .default(current.email.clone())
            .interact_text()?;

        if let Err(e) = validation::validate_profile(&name, &email) {
            println!("✗ {}", e);
            return Ok(());
        }

        let user = synthetix_common::User {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            ..current
        };
        Session::new(user.clone()).save(&self.config_dir)?;
        println!("✔ Profile Updated!\n  Name: {}\n  Email: {}", user.name, user.email);
        self.ctx.user = Some(user);
        Ok(())
    }
}

/// パスワード変更（入力チェックのみ）
fn change_password() -> Result<()> {
    let current = Password::new().with_prompt("Current password").interact()?;
    let new = Password::new().with_prompt("New password").interact()?;
    let confirm = Password::new().with_prompt("Confirm new password").interact()?;

    match validation::validate_password_change(&current, &new, &confirm) {
        Ok(()) => println!("✔ Password changed successfully!"),
        Err(e) => println!("✗ {}", e),
    }
    Ok(())
}

fn prompt_path(prompt: &str) -> Result<PathBuf> {
    let input: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(PathBuf::from(input.trim()))
}

fn display_name<'a>(name: &'a str, email: &'a str) -> &'a str {
    if name.trim().is_empty() {
        email
    } else {
        name
    }
}

/// 判定結果の表示
pub fn format_verdict(result: &DetectionResult) -> String {
    let mark = if result.label.is_fake() { "⚠" } else { "✔" };
    format!(
        "{} VERDICT: {} ({:.2}%)  model: {}",
        mark, result.label, result.confidence_percentage, result.model_name
    )
}

fn print_job_state<T>(state: &JobState<T>, describe: impl Fn(&T) -> String) {
    match state {
        JobState::Succeeded(output) => println!("  {}", describe(output)),
        JobState::Failed(message) => println!("  ✗ {}", message),
        _ => {}
    }
}
