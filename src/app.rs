//! 画面遷移とサイドバーの状態
//!
//! 状態は `AppContext` にまとめ、`Message` を通してのみ変更する。

use crate::config::Theme;
use synthetix_common::User;

/// 画面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Home,
    Generate,
    Detect,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Home => "Dashboard",
            View::Generate => "Generate",
            View::Detect => "Detect",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    LoggedIn(User),
    Logout,
    Navigate(View),
    ToggleTheme,
    ToggleHistory,
    ToggleSettings,
    CloseSidebars,
}

/// アプリ全体の状態
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub view: View,
    pub user: Option<User>,
    pub theme: Theme,
    pub history_open: bool,
    pub settings_open: bool,
}

impl AppContext {
    pub fn new(theme: Theme, user: Option<User>) -> Self {
        let view = if user.is_some() { View::Home } else { View::Login };
        Self {
            view,
            user,
            theme,
            history_open: false,
            settings_open: false,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// メッセージを適用する
    pub fn update(&mut self, message: Message) {
        match message {
            Message::LoggedIn(user) => {
                tracing::info!("ログイン: {}", user.email);
                self.user = Some(user);
                self.view = View::Home;
            }
            Message::Logout => {
                self.user = None;
                self.view = View::Login;
                self.history_open = false;
                self.settings_open = false;
            }
            Message::Navigate(view) => {
                // ログイン前はログイン画面から動かない
                if self.user.is_some() || view == View::Login {
                    self.view = view;
                } else {
                    tracing::debug!("未ログインのため {:?} へ遷移しない", view);
                }
            }
            Message::ToggleTheme => {
                self.theme = self.theme.toggled();
            }
            Message::ToggleHistory => {
                self.history_open = !self.history_open;
                if self.history_open {
                    self.settings_open = false;
                }
            }
            Message::ToggleSettings => {
                self.settings_open = !self.settings_open;
                if self.settings_open {
                    self.history_open = false;
                }
            }
            Message::CloseSidebars => {
                self.history_open = false;
                self.settings_open = false;
            }
        }
    }
}
