//! Wires the scan controller, the keyboard surface, the prediction worker and
//! the announcer, and runs line commands against them.

use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use scan_core::{Action, Announcer, Key, ScanController, VirtualScheduler, deliver};
use scan_ngram::SharedNgramStore;
use scan_predict::{PredictionEngine, PredictionWorker, Suggestions};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::console::{Transcript, describe_focus};
use crate::keyboard::{Keyboard, KeyboardEvent, PREDICT_GROUP};
use crate::script::{self, Command, HELP};

/// Headroom on top of the remote timeout before `sync` gives up.
const PREDICTION_GRACE_MS: u64 = 1_000;

pub struct App {
    ctl: ScanController<VirtualScheduler>,
    keyboard: Keyboard,
    worker: PredictionWorker,
    announcer: Announcer,
    /// Text of the last prediction request.
    requested: Option<String>,
    /// A request is out and its result not applied yet.
    awaiting: bool,
    prediction_wait: Duration,
}

impl App {
    pub fn new(config: AppConfig, announcer: Announcer) -> Result<Self> {
        let store = SharedNgramStore::open(&config.store);
        info!(path = %config.store.path.display(), "ngram store opened");
        let remote_ms = config.prediction.remote.as_ref().map_or(0, |r| r.timeout_ms);
        let engine = PredictionEngine::from_config(store, config.prediction)?;
        let worker = PredictionWorker::spawn(engine)?;
        let keyboard = Keyboard::new();
        let ctl = ScanController::new(keyboard.groups(), config.scan, VirtualScheduler::new())?;
        Ok(Self {
            ctl,
            keyboard,
            worker,
            announcer,
            requested: None,
            awaiting: false,
            prediction_wait: Duration::from_millis(remote_ms + PREDICTION_GRACE_MS),
        })
    }

    pub fn text(&self) -> String {
        self.keyboard.text()
    }

    /// Renders the initial focus and asks for the first suggestions.
    pub fn start(&mut self, out: &mut impl Write) -> Result<()> {
        let actions = self.ctl.initial_actions();
        self.render(actions, out)?;
        self.refresh_suggestions(out)
    }

    /// Reads commands until `quit` or end of input. With `interactive`,
    /// prompts and reports bad lines instead of stopping on them.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write, interactive: bool) -> Result<()> {
        if interactive {
            write!(out, "> ")?;
            out.flush()?;
        }
        for (n, line) in input.lines().enumerate() {
            let line = line?;
            match script::parse(&line) {
                Ok(Some(command)) => {
                    if !self.execute(command, out)? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) if interactive => writeln!(out, "error: {err}")?,
                Err(err) => return Err(err).with_context(|| format!("script line {}", n + 1)),
            }
            if interactive {
                write!(out, "> ")?;
                out.flush()?;
            }
        }
        self.ctl.shutdown();
        self.worker.cancel();
        Ok(())
    }

    /// Runs one command. `Ok(false)` means quit. Suggestions that arrived
    /// since the last command are applied first; none are waited for.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<bool> {
        self.apply_ready(out)?;
        let actions = match command {
            Command::Press(key) => self.ctl.press(key),
            Command::Release(key) => self.ctl.release(key),
            Command::Tap(key) => self.tap(key),
            Command::Hold(key, ms) => {
                let mut actions = self.ctl.press(key);
                actions.append(&mut self.ctl.wait(ms));
                actions.append(&mut self.ctl.release(key));
                actions
            }
            Command::Wait(ms) => self.ctl.wait(ms),
            Command::Focus => {
                writeln!(out, "{}", describe_focus(self.ctl.groups(), self.ctl.focus()))?;
                return Ok(true);
            }
            Command::Text => {
                writeln!(out, "message: {:?}", self.keyboard.text())?;
                return Ok(true);
            }
            Command::Sync => {
                self.sync_suggestions(out)?;
                return Ok(true);
            }
            Command::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(true);
            }
            Command::Quit => return Ok(false),
        };
        self.render(actions, out)?;
        self.handle_keyboard_events()?;
        self.refresh_suggestions(out)?;
        Ok(true)
    }

    fn tap(&mut self, key: Key) -> Vec<Action> {
        let timing = self.ctl.config().timing(key);
        let down_ms = (timing.short_min_ms + timing.hold_start_ms) / 2;
        let cooldown_ms = self.ctl.config().cooldown_ms;
        let mut actions = self.ctl.press(key);
        actions.append(&mut self.ctl.wait(down_ms));
        actions.append(&mut self.ctl.release(key));
        actions.append(&mut self.ctl.wait(cooldown_ms));
        actions
    }

    fn render(&self, actions: Vec<Action>, out: &mut impl Write) -> Result<()> {
        let mut transcript = Transcript::new(self.ctl.groups());
        deliver(actions, &mut transcript);
        for line in &transcript.lines {
            writeln!(out, "{line}")?;
        }
        for text in transcript.speech {
            self.announcer.announce(text);
        }
        Ok(())
    }

    fn handle_keyboard_events(&mut self) -> Result<()> {
        for event in self.keyboard.drain_events() {
            match event {
                KeyboardEvent::Speak(message) => {
                    self.announcer.announce(message.clone());
                    self.worker.record(message)?;
                    // The model changed even though the text did not.
                    self.requested = None;
                }
            }
        }
        Ok(())
    }

    /// Applies a finished result, then asks for new suggestions if the text
    /// moved on. Never blocks.
    fn refresh_suggestions(&mut self, out: &mut impl Write) -> Result<()> {
        self.apply_ready(out)?;
        let text = self.keyboard.text();
        if self.requested.as_deref() == Some(text.as_str()) {
            return Ok(());
        }
        self.worker.request(text.clone())?;
        self.requested = Some(text);
        self.awaiting = true;
        Ok(())
    }

    fn apply_ready(&mut self, out: &mut impl Write) -> Result<()> {
        match self.worker.poll() {
            Some(suggestions) => self.apply_suggestions(suggestions, out),
            None => Ok(()),
        }
    }

    fn sync_suggestions(&mut self, out: &mut impl Write) -> Result<()> {
        self.refresh_suggestions(out)?;
        if !self.awaiting {
            return Ok(());
        }
        match self.worker.recv_timeout(self.prediction_wait) {
            Some(suggestions) => self.apply_suggestions(suggestions, out),
            None => {
                warn!("suggestions not ready, keeping the previous row");
                Ok(())
            }
        }
    }

    fn apply_suggestions(&mut self, suggestions: Suggestions, out: &mut impl Write) -> Result<()> {
        self.awaiting = false;
        let items = self.keyboard.suggestion_items(&suggestions.words);
        let (_, actions) = self.ctl.replace_items(PREDICT_GROUP, items);
        writeln!(out, "suggestions: {}", suggestions.words.join(", "))?;
        self.render(actions, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scan_core::{Interrupt, ScanMode, SpeechSink};
    use scan_ngram::{NgramKind, NgramStore, StoreConfig};
    use scan_predict::RemoteConfig;
    use std::net::TcpListener;
    use std::time::Instant;

    struct Silent;

    impl SpeechSink for Silent {
        fn speak(&mut self, _text: &str, _interrupt: &Interrupt) {}
    }

    fn config(dir: &tempfile::TempDir) -> AppConfig {
        AppConfig {
            store: StoreConfig {
                path: dir.path().join("ngrams.json"),
                ..StoreConfig::default()
            },
            ..AppConfig::default()
        }
    }

    fn app(dir: &tempfile::TempDir) -> App {
        App::new(config(dir), Announcer::spawn(Silent).unwrap()).unwrap()
    }

    fn run(app: &mut App, script: &str) -> String {
        let mut out = Vec::new();
        app.run(script.as_bytes(), &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn start_then_sync_offers_default_words() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let mut out = Vec::new();
        app.start(&mut out).unwrap();
        app.execute(Command::Sync, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("suggestions: i, you, yes, no, the, what"), "{out}");
    }

    #[test]
    fn letter_row_stays_on_its_letters_until_select_hold() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let out = run(
            &mut app,
            "tap scan\n\
             tap scan\n\
             tap scan\n\
             tap select\n\
             tap select\n\
             tap scan\n\
             tap select\n",
        );
        assert_eq!(app.text(), "ab");
        assert!(out.contains("group  [abcdef]"), "{out}");
        assert!(out.contains("activated [a]"), "{out}");
        assert_eq!(app.ctl.focus().mode, ScanMode::Item);

        run(&mut app, "hold select 1000\n");
        assert_eq!(app.ctl.focus().mode, ScanMode::Group);
        assert_eq!(app.ctl.focus().group_index, 2);
        assert_eq!(app.text(), "ab");
    }

    #[test]
    fn speak_records_message_into_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        // wake, predict, row1, enter, type "a", leave the row, then five rows
        // down to edit, enter, four items along to "speak", activate
        let script = "\
            tap scan\ntap scan\ntap scan\ntap select\ntap select\n\
            hold select 1000\n\
            tap scan\ntap scan\ntap scan\ntap scan\ntap scan\n\
            tap select\n\
            tap scan\ntap scan\ntap scan\ntap scan\n\
            tap select\n\
            sync\n";
        let out = run(&mut app, script);
        assert!(out.contains("activated [speak]"), "{out}");

        let store = NgramStore::load(dir.path().join("ngrams.json"));
        assert_eq!(store.get(NgramKind::Word, "A").map(|e| e.count), Some(1));
    }

    #[test]
    fn slow_remote_does_not_hold_up_switch_input() {
        // accepts connections but never answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir);
        config.prediction.remote = Some(RemoteConfig {
            url: format!("http://{}/predict", listener.local_addr().unwrap()),
            timeout_ms: 2_000,
        });
        let mut app = App::new(config, Announcer::spawn(Silent).unwrap()).unwrap();

        let started = Instant::now();
        let mut out = Vec::new();
        app.start(&mut out).unwrap();
        for _ in 0..4 {
            app.execute(Command::Tap(Key::Scan), &mut out).unwrap();
        }
        assert!(started.elapsed() < Duration::from_millis(1_000));
        assert_eq!(app.ctl.focus().group_index, 3);
        assert!(!String::from_utf8_lossy(&out).contains("suggestions:"));

        app.execute(Command::Sync, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("suggestions: i, you, yes, no, the, what"), "{out}");
        drop(listener);
    }

    #[test]
    fn quit_stops_and_bad_script_line_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let out = run(&mut app, "quit\ntap scan\n");
        assert!(out.is_empty(), "{out}");

        let mut out = Vec::new();
        let err = app.run("wait 10\nwiggle\n".as_bytes(), &mut out, false).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn interactive_mode_reports_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let mut out = Vec::new();
        app.run("wiggle\nfocus\n".as_bytes(), &mut out, true).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("error: unknown command: wiggle"), "{out}");
        assert!(out.contains("idle"), "{out}");
    }
}
