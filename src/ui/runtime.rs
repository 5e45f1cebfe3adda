use std::io;
use std::time::Duration;

use crate::session::SessionHandle;
use crate::shutdown::ShutdownHandle;
use crate::ui::events::{key_action, spawn_input_reader, InputEvent, KeyAction};
use crate::ui::render::draw;
use crate::ui::terminal_guard::setup_terminal;

const TICK_RATE: Duration = Duration::from_millis(120);

/// Render `session` in the terminal until the user quits, then tear the
/// session down.
pub async fn run(session: SessionHandle) -> io::Result<()> {
    let (mut terminal, guard) = setup_terminal()?;
    let input_stop = ShutdownHandle::new();
    let mut input = spawn_input_reader(input_stop.clone());
    let mut snapshots = session.subscribe();
    let mut ticker = tokio::time::interval(TICK_RATE);
    let mut animation_tick: u8 = 0;

    let result = loop {
        let state = snapshots.borrow_and_update().clone();
        if let Err(err) = terminal.draw(|frame| draw(frame, &state, animation_tick)) {
            break Err(err);
        }

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
            _ = ticker.tick() => {
                animation_tick = animation_tick.wrapping_add(1);
            }
            event = input.recv() => match event {
                Some(InputEvent::Key(key)) => match key_action(&key) {
                    Some(KeyAction::Toggle) if state.can_start() => session.start().await,
                    Some(KeyAction::Toggle) if state.can_stop() => session.stop().await,
                    Some(KeyAction::Quit) => break Ok(()),
                    _ => {}
                },
                Some(InputEvent::Resize) => {}
                None => break Ok(()),
            },
        }
    };

    input_stop.signal();
    drop(guard);
    session.shutdown().await;
    result
}
