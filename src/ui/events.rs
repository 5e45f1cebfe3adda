use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::shutdown::ShutdownHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Terminal input relevant to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize,
}

/// What a key press means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Start when idle, stop when running.
    Toggle,
    Quit,
}

pub fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Quit)
        }
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Enter | KeyCode::Char(' ') => {
            Some(KeyAction::Toggle)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(KeyAction::Quit),
        _ => None,
    }
}

/// Read terminal events on a blocking thread and forward them.
///
/// The thread exits once `stop` is signalled or the receiver is dropped.
pub fn spawn_input_reader(stop: ShutdownHandle) -> mpsc::UnboundedReceiver<InputEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || loop {
        if stop.is_shutting_down() {
            break;
        }

        // Use short poll timeout to check the stop flag frequently
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "Terminal poll failed");
                break;
            }
        }

        let forwarded = match event::read() {
            Ok(Event::Key(key)) => tx.send(InputEvent::Key(key)),
            Ok(Event::Resize(..)) => tx.send(InputEvent::Resize),
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "Terminal read failed");
                break;
            }
        };
        if forwarded.is_err() {
            break;
        }
    });

    rx
}
