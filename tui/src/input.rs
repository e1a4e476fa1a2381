//! Input handling for the Signup TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::{self, JoinHandle};
use tokio::time;
use tracing::debug;

use signup_engine::{App, FieldName};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

/// Terminals without bracketed paste deliver a paste as a burst of key
/// events. Inside a burst a bare `Enter` must not move focus or submit.
const PASTE_INTER_KEY_THRESHOLD: Duration = Duration::from_millis(20);
const PASTE_IDLE_TIMEOUT: Duration = Duration::from_millis(75);
const PASTE_QUEUE_THRESHOLD: usize = 32;

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Timing heuristics for detecting paste bursts.
#[derive(Debug)]
struct PasteDetector {
    last_key_time: Instant,
    active_until: Instant,
}

impl PasteDetector {
    fn new(now: Instant) -> Self {
        Self {
            last_key_time: now,
            active_until: now,
        }
    }

    fn update(&mut self, now: Instant, backlog: usize, event: &Event) -> bool {
        let is_key_event = matches!(
            event,
            Event::Key(KeyEvent {
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            })
        );

        let was_active = now < self.active_until;
        let backlog_high = backlog >= PASTE_QUEUE_THRESHOLD;
        let rapid =
            is_key_event && now.duration_since(self.last_key_time) < PASTE_INTER_KEY_THRESHOLD;

        let active = was_active || backlog_high || rapid;

        if is_key_event {
            if active {
                self.active_until = now + PASTE_IDLE_TIMEOUT;
            }
            self.last_key_time = now;
        }

        active
    }
}

/// Reads terminal events on a blocking thread and hands them to the frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
    paste: PasteDetector,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
            paste: PasteDetector::new(Instant::now()),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a backpressured send unblocks.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending terminal events into `app`. Returns true when the app
/// should exit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        let backlog = input.rx.len();
        let paste_active = input.paste.update(Instant::now(), backlog, &ev);
        if paste_active {
            debug!(backlog, "Input paste detection active");
        }

        if apply_event(app, ev, paste_active) {
            return Ok(true);
        }
        processed += 1;
    }
    Ok(app.should_quit())
}

pub(crate) fn apply_event(app: &mut App, event: Event, paste_active: bool) -> bool {
    match event {
        Event::Key(key) => {
            if matches!(key.kind, KeyEventKind::Release) {
                return app.should_quit();
            }
            handle_key(app, key, paste_active);
        }
        Event::Paste(text) => app.insert_text(&text),
        _ => {}
    }
    app.should_quit()
}

fn handle_key(app: &mut App, key: KeyEvent, paste_active: bool) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => app.request_quit(),
        KeyCode::Esc => app.request_quit(),
        KeyCode::Char('s') if ctrl => app.submit(),
        KeyCode::Char('r') if ctrl => app.toggle_password_visibility(),
        KeyCode::Char('u') if ctrl => app.clear_field(),
        KeyCode::Char('w') if ctrl => app.delete_word_backwards(),
        KeyCode::Backspace if alt || ctrl => app.delete_word_backwards(),
        KeyCode::Tab | KeyCode::Down => app.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
        KeyCode::Enter => {
            if paste_active {
                return;
            }
            if app.focus() == FieldName::Terms {
                app.submit();
            } else {
                app.focus_next();
            }
        }
        KeyCode::PageUp => app.scroll_up(),
        KeyCode::PageDown => app.scroll_down(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Delete => app.delete_char_forward(),
        KeyCode::Char(c) if !ctrl && !alt => app.insert_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use signup_engine::{App, Banner, FieldName, PostalClient, RegistrationClient};

    use super::{PasteDetector, apply_event};

    fn offline_app() -> App {
        let postal = PostalClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let registration =
            RegistrationClient::new("http://127.0.0.1:9/r", Duration::from_secs(1)).unwrap();
        App::with_clients(postal, registration)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn press(app: &mut App, event: Event) -> bool {
        apply_event(app, event, false)
    }

    #[test]
    fn typing_and_tab_navigation() {
        let mut app = offline_app();
        for c in "Ana".chars() {
            press(&mut app, key(KeyCode::Char(c)));
        }
        press(&mut app, key(KeyCode::Tab));
        assert_eq!(app.values().name, "Ana");
        assert_eq!(app.focus(), FieldName::LastName);

        press(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.focus(), FieldName::Name);
        press(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.values().name, "An");
    }

    #[test]
    fn enter_advances_until_last_field_then_submits() {
        let mut app = offline_app();
        press(&mut app, key(KeyCode::Enter));
        assert_eq!(app.focus(), FieldName::LastName);
        assert_eq!(app.form().submit_count(), 0);

        app.set_focus(FieldName::Terms);
        press(&mut app, key(KeyCode::Enter));
        assert_eq!(app.form().submit_count(), 1);
        assert_eq!(app.banner(), Some(Banner::Failure));
    }

    #[test]
    fn enter_during_paste_burst_is_ignored() {
        let mut app = offline_app();
        apply_event(&mut app, key(KeyCode::Enter), true);
        assert_eq!(app.focus(), FieldName::Name);
    }

    #[test]
    fn ctrl_shortcuts() {
        let mut app = offline_app();
        press(&mut app, ctrl('s'));
        assert_eq!(app.form().submit_count(), 1);

        app.set_focus(FieldName::Password);
        press(&mut app, ctrl('r'));
        assert!(app.is_revealed(FieldName::Password));

        press(&mut app, key(KeyCode::Char('x')));
        press(&mut app, ctrl('u'));
        assert_eq!(app.values().password, "");

        assert!(press(&mut app, ctrl('c')));
    }

    #[test]
    fn ctrl_chars_are_not_inserted() {
        let mut app = offline_app();
        press(&mut app, ctrl('a'));
        assert_eq!(app.values().name, "");
    }

    #[test]
    fn space_on_terms_toggles_checkbox() {
        let mut app = offline_app();
        app.set_focus(FieldName::Terms);
        press(&mut app, key(KeyCode::Char(' ')));
        assert!(app.values().terms);
    }

    #[test]
    fn esc_quits_and_release_is_ignored() {
        let mut app = offline_app();
        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Esc,
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert!(!press(&mut app, release));
        assert!(press(&mut app, key(KeyCode::Esc)));
    }

    #[test]
    fn paste_event_inserts_text() {
        let mut app = offline_app();
        app.set_focus(FieldName::Cpf);
        press(&mut app, Event::Paste("123.456.789-00\n".to_string()));
        assert_eq!(app.values().cpf, "123.456.789-00");
    }

    #[test]
    fn paste_detector_flags_rapid_keys() {
        let start = Instant::now();
        let mut detector = PasteDetector::new(start);
        let ev = key(KeyCode::Char('a'));
        assert!(!detector.update(start + Duration::from_millis(100), 0, &ev));
        assert!(detector.update(start + Duration::from_millis(105), 0, &ev));
        assert!(detector.update(start + Duration::from_millis(150), 0, &ev));
        assert!(!detector.update(start + Duration::from_millis(400), 0, &ev));
        assert!(detector.update(start + Duration::from_millis(900), 40, &ev));
    }
}
