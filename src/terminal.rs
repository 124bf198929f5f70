//! 端末用の離脱防止アダプタ
//!
//! ブラウザのイベントを端末の機能に置き換える:
//! - visibilitychange → フォーカス通知 (FocusLost / FocusGained)
//! - beforeunload     → Ctrl+C（rawモード中はキー入力として受け取る）
//! - document.title   → 端末タイトル
//!
//! 端末でない場合（パイプ・リダイレクト）はフォーカス通知もタイトルも
//! 使えないため、SIGINT のみを監視する。登録を外した後の SIGINT は
//! 通常どおりプロセスを終了させる。

use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{self, SetTitle};
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use synthetix_common::{AttentionEvent, AttentionPlatform};
use tokio::sync::mpsc;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// SIGINT で終了したときの終了コード
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// SIGINT を受けたときの扱い
#[derive(Debug, PartialEq, Eq)]
enum InterruptAction {
    /// 離脱操作としてジョブへ渡す
    Forward,
    /// 既定の動作どおり終了する
    Terminate,
}

fn interrupt_action(active: bool) -> InterruptAction {
    if active {
        InterruptAction::Forward
    } else {
        InterruptAction::Terminate
    }
}

pub struct TerminalAttention {
    tx: mpsc::UnboundedSender<AttentionEvent>,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    signal_task: Option<tokio::task::JoinHandle<()>>,
    signal_active: Arc<AtomicBool>,
    interactive: bool,
    raw_mode: bool,
}

impl TerminalAttention {
    /// アダプタとイベント受信側を作る
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AttentionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
        let adapter = Self {
            tx,
            stop: Arc::new(AtomicBool::new(false)),
            reader: None,
            signal_task: None,
            signal_active: Arc::new(AtomicBool::new(false)),
            interactive,
            raw_mode: false,
        };
        (adapter, rx)
    }

    /// SIGINT を監視する
    ///
    /// tokio のハンドラは一度入れると外せないため、リスナーは残したまま
    /// 登録中だけ離脱操作として転送し、それ以外では終了する。
    fn spawn_signal_listener(&mut self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let tx = self.tx.clone();
        let active = Arc::clone(&self.signal_active);
        self.signal_task = Some(runtime.spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                let forwarded = match interrupt_action(active.load(Ordering::SeqCst)) {
                    InterruptAction::Forward => tx.send(AttentionEvent::ExitAttempt).is_ok(),
                    InterruptAction::Terminate => false,
                };
                if !forwarded {
                    tracing::info!("SIGINT を受信したため終了します");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        }));
    }

    fn spawn_reader(&mut self) {
        let tx = self.tx.clone();
        let stop = Arc::clone(&self.stop);

        self.reader = Some(std::thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        tracing::warn!("端末イベントの取得に失敗: {}", e);
                        break;
                    }
                }

                let attention = match event::read() {
                    Ok(Event::FocusLost) => Some(AttentionEvent::Hidden),
                    Ok(Event::FocusGained) => Some(AttentionEvent::Visible),
                    Ok(Event::Key(key)) if is_interrupt(&key) => Some(AttentionEvent::ExitAttempt),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!("端末イベントの読み込みに失敗: {}", e);
                        break;
                    }
                };

                if let Some(attention) = attention {
                    if tx.send(attention).is_err() {
                        break;
                    }
                }
            }
        }));
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

impl AttentionPlatform for TerminalAttention {
    fn register(&mut self) {
        if !self.interactive {
            self.signal_active.store(true, Ordering::SeqCst);
            if self.signal_task.is_none() {
                self.spawn_signal_listener();
            }
            return;
        }
        if self.reader.is_some() {
            return;
        }

        match terminal::enable_raw_mode() {
            Ok(()) => self.raw_mode = true,
            Err(e) => {
                tracing::warn!("rawモードに切り替えられません: {}", e);
                return;
            }
        }
        if let Err(e) = execute!(std::io::stdout(), EnableFocusChange) {
            tracing::debug!("フォーカス通知を有効化できません: {}", e);
        }

        self.stop.store(false, Ordering::Relaxed);
        self.spawn_reader();
    }

    fn unregister(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        self.signal_active.store(false, Ordering::SeqCst);

        if self.raw_mode {
            let _ = execute!(std::io::stdout(), DisableFocusChange);
            if let Err(e) = terminal::disable_raw_mode() {
                tracing::warn!("rawモードを解除できません: {}", e);
            }
            self.raw_mode = false;
        }
    }

    fn set_title(&mut self, title: &str) {
        if self.interactive {
            let _ = execute!(std::io::stdout(), SetTitle(title));
        }
    }
}

impl Drop for TerminalAttention {
    fn drop(&mut self) {
        self.unregister();
    }
}
