//! UI utilities for the client.

use std::io::Write;

use rustyline::{
    Cmd, ConditionalEventHandler, DefaultEditor, Event, EventContext, EventHandler, KeyCode,
    KeyEvent, Modifiers, RepeatCount, error::ReadlineError,
};
use tokio::sync::mpsc;

/// Input forwarded from the readline thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A keystroke that edits the current line
    Activity,
    /// A submitted, trimmed, non-empty line
    Line(String),
}

/// 編集キーを検知して入力中イベントを流す（キー処理自体は既定のまま）
struct ActivityNotifier {
    tx: mpsc::UnboundedSender<InputEvent>,
}

impl ConditionalEventHandler for ActivityNotifier {
    fn handle(
        &self,
        evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        _ctx: &EventContext,
    ) -> Option<Cmd> {
        if is_editing_key(evt) {
            self.tx.send(InputEvent::Activity).ok();
        }
        None
    }
}

fn is_editing_key(evt: &Event) -> bool {
    match evt.get(0) {
        Some(KeyEvent(KeyCode::Char(_), mods)) => !mods.contains(Modifiers::CTRL),
        Some(KeyEvent(KeyCode::Backspace | KeyCode::Delete, _)) => true,
        _ => false,
    }
}

/// Redisplay the prompt after printing an incoming event
pub fn redisplay_prompt(user_name: &str) {
    print!("{}> ", user_name);
    std::io::stdout().flush().ok();
}

/// Spawn a blocking thread that reads lines with rustyline.
///
/// Editing keystrokes and non-empty trimmed lines are forwarded on the
/// returned channel. The channel closes when the user presses Ctrl+C or Ctrl+D.
pub fn spawn_line_reader(user_name: &str) -> mpsc::UnboundedReceiver<InputEvent> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<InputEvent>();
    let prompt = format!("{}> ", user_name);

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };
        rl.bind_sequence(
            Event::Any,
            EventHandler::Conditional(Box::new(ActivityNotifier {
                tx: input_tx.clone(),
            })),
        );

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(InputEvent::Line(line.to_string())).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
