//! `ScanController`: the scanning session object a host drives.
//!
//! The controller itself makes no navigation decisions. It:
//! - owns the groups, the `ScanState`, one `ScanTimingModel` per key, and the scheduler
//! - turns raw key edges and fired timers into `SwitchSignal`s
//! - passes each signal through the processor chain until one consumes it
//! - returns the resulting `Action`s to the host
use std::collections::HashSet;

use tracing::{debug, info};

use crate::{
    config::ScanConfig,
    context::ScanState,
    error::{ConfigError, Result},
    key_event::{Action, Key, SwitchSignal},
    model::{Focus, ScanGroup, ScanItem, ScanMode},
    processor::{
        CooldownProcessor, IdleWakeProcessor, ProcessStatus, Processor, ScanEnv, ScanKeyProcessor,
        SelectKeyProcessor,
    },
    scheduler::{Fired, Scheduler, TimerKind, VirtualScheduler},
    timing::ScanTimingModel,
};

pub struct ScanController<S> {
    groups: Vec<ScanGroup>,
    config: ScanConfig,
    state: ScanState,
    scan_key: ScanTimingModel,
    select_key: ScanTimingModel,
    scheduler: S,
    processors: Vec<Box<dyn Processor>>,
}

impl<S> ScanController<S>
where
    S: Scheduler,
{
    /// Starts a session over `groups` with the default processor chain.
    pub fn new(groups: Vec<ScanGroup>, config: ScanConfig, scheduler: S) -> Result<Self> {
        config.validate()?;
        check_unique_ids(&groups)?;
        let state = ScanState::start(&config, &groups);
        Ok(Self {
            scan_key: ScanTimingModel::new(Key::Scan, config.scan_key),
            select_key: ScanTimingModel::new(Key::Select, config.select_key),
            groups,
            config,
            state,
            scheduler,
            processors: vec![
                Box::new(CooldownProcessor),
                Box::new(IdleWakeProcessor),
                Box::new(ScanKeyProcessor),
                Box::new(SelectKeyProcessor),
            ],
        })
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn focus(&self) -> Focus {
        self.state.focus()
    }

    pub fn groups(&self) -> &[ScanGroup] {
        &self.groups
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Actions to render the initial focus when the session does not start idle.
    pub fn initial_actions(&self) -> Vec<Action> {
        match self.groups.get(self.state.group_index) {
            Some(group) if self.state.mode == ScanMode::Group => vec![
                Action::FocusChanged(self.state.focus()),
                Action::Announce(group.focus_announcement(&self.config.no_items_text)),
            ],
            _ => Vec::new(),
        }
    }

    /// Replaces every group (a menu was rebuilt). Starts a new session.
    pub fn set_groups(&mut self, groups: Vec<ScanGroup>) -> Result<()> {
        check_unique_ids(&groups)?;
        self.cancel_all();
        self.groups = groups;
        self.state = ScanState::start(&self.config, &self.groups);
        info!(groups = self.groups.len(), "scan groups replaced");
        Ok(())
    }

    /// Swaps the items of one group (fresh suggestions). If the session is
    /// scanning inside that group it drops back to group level first.
    /// Returns `false` when no group has that id.
    pub fn replace_items(&mut self, group_id: &str, items: Vec<ScanItem>) -> (bool, Vec<Action>) {
        let Some(index) = self.groups.iter().position(|g| g.id == group_id) else {
            return (false, Vec::new());
        };
        let mut actions = Vec::new();
        if self.state.mode == ScanMode::Item && self.state.group_index == index {
            debug!(group = group_id, "items replaced under focus, back to groups");
            self.state.mode = ScanMode::Group;
            self.stop_repeats();
            actions.push(Action::FocusChanged(self.state.focus()));
        }
        self.groups[index].items = items;
        (true, actions)
    }

    pub fn press(&mut self, key: Key) -> Vec<Action> {
        let model = match key {
            Key::Scan => &mut self.scan_key,
            Key::Select => &mut self.select_key,
        };
        model.on_press(&mut self.scheduler);
        Vec::new()
    }

    pub fn release(&mut self, key: Key) -> Vec<Action> {
        let model = match key {
            Key::Scan => &mut self.scan_key,
            Key::Select => &mut self.select_key,
        };
        let signal = model.on_release(&mut self.scheduler);
        self.sync_hold();
        match signal {
            Some(signal) => self.dispatch(SwitchSignal::new(key, signal)),
            None => Vec::new(),
        }
    }

    pub fn on_timer(&mut self, fired: Fired) -> Vec<Action> {
        let key = match fired.kind {
            TimerKind::HoldStart(key) | TimerKind::HoldRepeat(key) => key,
        };
        let model = match key {
            Key::Scan => &mut self.scan_key,
            Key::Select => &mut self.select_key,
        };
        let signal = model.on_timer(&fired, &mut self.scheduler);
        self.sync_hold();
        match signal {
            Some(signal) => self.dispatch(SwitchSignal::new(key, signal)),
            None => Vec::new(),
        }
    }

    /// Feeds one classified signal through the processor chain.
    pub fn dispatch(&mut self, signal: SwitchSignal) -> Vec<Action> {
        let before = self.state.mode;
        let env = ScanEnv {
            groups: &self.groups,
            config: &self.config,
            now_ms: self.scheduler.now_ms(),
        };
        let mut actions = Vec::new();
        for p in &mut self.processors {
            let (status, mut a) = p.process(&env, &mut self.state, &signal);
            actions.append(&mut a);
            if status == ProcessStatus::Consume {
                break;
            }
        }
        if !actions.is_empty() {
            self.state.last_signal_ms = Some(env.now_ms);
        }
        if self.state.mode != before {
            self.stop_repeats();
        }
        actions
    }

    /// Focus came back to the scanning surface: nothing is held any more.
    pub fn reset_input(&mut self) {
        self.scan_key.reset(&mut self.scheduler);
        self.select_key.reset(&mut self.scheduler);
        self.state.hold_active = false;
        debug!("key state reset");
    }

    /// Surface is being torn down.
    pub fn shutdown(&mut self) {
        self.cancel_all();
        info!("scan session closed");
    }

    fn cancel_all(&mut self) {
        self.reset_input();
    }

    /// Mode changed: no hold may keep repeating into the new mode.
    fn stop_repeats(&mut self) {
        self.scan_key.stop_repeat(&mut self.scheduler);
        self.select_key.stop_repeat(&mut self.scheduler);
    }

    fn sync_hold(&mut self) {
        self.state.hold_active = self.scan_key.hold_active() || self.select_key.hold_active();
    }
}

impl ScanController<VirtualScheduler> {
    /// Runs the virtual clock to `now_ms`, delivering every timer due on the way.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Some(fired) = self.scheduler.pop_due(now_ms) {
            actions.append(&mut self.on_timer(fired));
        }
        self.scheduler.set_now(now_ms);
        actions
    }

    /// Advances the clock by `ms`.
    pub fn wait(&mut self, ms: u64) -> Vec<Action> {
        let target = self.scheduler.now_ms() + ms;
        self.advance_to(target)
    }
}

fn check_unique_ids(groups: &[ScanGroup]) -> Result<()> {
    let mut seen = HashSet::new();
    for g in groups {
        if !seen.insert(g.id.as_str()) {
            return Err(ConfigError::DuplicateGroup(g.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::key_event::Signal;

    fn groups() -> Vec<ScanGroup> {
        vec![
            ScanGroup::new("a", "row a").items(vec![ScanItem::inert("x"), ScanItem::inert("y")]),
            ScanGroup::new("b", "row b").item(ScanItem::inert("z")),
            ScanGroup::new("predict", "suggestions").predictive(),
        ]
    }

    fn controller() -> ScanController<VirtualScheduler> {
        ScanController::new(groups(), ScanConfig::default(), VirtualScheduler::new()).unwrap()
    }

    /// Press, hold for `held_ms`, release; returns every action produced.
    fn press_for(ctl: &mut ScanController<VirtualScheduler>, key: Key, held_ms: u64) -> Vec<Action> {
        let mut actions = ctl.press(key);
        actions.extend(ctl.wait(held_ms));
        actions.extend(ctl.release(key));
        actions
    }

    #[test]
    fn rejects_duplicate_group_ids() {
        let dup = vec![ScanGroup::new("a", "a"), ScanGroup::new("a", "b")];
        assert!(matches!(
            ScanController::new(dup, ScanConfig::default(), VirtualScheduler::new()),
            Err(ConfigError::DuplicateGroup(id)) if id == "a"
        ));
    }

    #[test]
    fn first_tap_wakes_then_advances() {
        let mut ctl = controller();
        assert_eq!(ctl.focus().mode, ScanMode::Idle);
        press_for(&mut ctl, Key::Scan, 100);
        assert_eq!(ctl.focus().mode, ScanMode::Group);
        assert_eq!(ctl.focus().group_index, 0);
        ctl.wait(1_000);
        press_for(&mut ctl, Key::Scan, 100);
        assert_eq!(ctl.focus().group_index, 1);
    }

    #[test]
    fn double_press_inside_cooldown_acts_once() {
        let mut ctl = controller();
        press_for(&mut ctl, Key::Scan, 100);
        ctl.wait(1_000);
        let first = press_for(&mut ctl, Key::Scan, 100);
        ctl.wait(100);
        let second = press_for(&mut ctl, Key::Scan, 100);
        assert!(!first.is_empty());
        assert!(second.is_empty());
        assert_eq!(ctl.focus().group_index, 1);
    }

    #[test]
    fn hold_retreats_repeatedly() {
        let mut ctl = controller();
        press_for(&mut ctl, Key::Scan, 100);
        ctl.wait(1_000);
        // hold start at 800 ms, ticks at 1400 and 2000
        ctl.press(Key::Scan);
        ctl.wait(2_100);
        assert!(ctl.state().hold_active);
        let on_release = ctl.release(Key::Scan);
        assert!(on_release.is_empty());
        assert!(!ctl.state().hold_active);
        // 0 -> 2 -> 1 -> 0
        assert_eq!(ctl.focus().group_index, 0);
        assert_eq!(ctl.scheduler().pending(), 0);
    }

    #[test]
    fn enter_activate_returns_to_group() {
        let mut ctl = controller();
        press_for(&mut ctl, Key::Scan, 100);
        ctl.wait(1_000);
        press_for(&mut ctl, Key::Select, 100);
        assert_eq!(ctl.focus().mode, ScanMode::Item);
        assert_eq!(ctl.focus().item_index, Some(0));
        ctl.wait(1_000);
        let actions = press_for(&mut ctl, Key::Select, 100);
        assert!(actions.contains(&Action::Activated {
            group_index: 0,
            item_index: 0
        }));
        assert_eq!(ctl.focus().mode, ScanMode::Group);
        assert_eq!(ctl.focus().group_index, 0);
    }

    #[test]
    fn select_hold_escapes_and_stops_repeating() {
        let mut ctl = controller();
        press_for(&mut ctl, Key::Scan, 100);
        ctl.wait(1_000);
        press_for(&mut ctl, Key::Select, 100);
        ctl.wait(1_000);
        ctl.press(Key::Select);
        let actions = ctl.wait(900);
        assert!(actions.contains(&Action::Announce("rows".into())));
        assert_eq!(ctl.focus().mode, ScanMode::Group);
        // the repeat timer was cancelled on the mode change
        assert_eq!(ctl.scheduler().pending(), 0);
        assert!(ctl.release(Key::Select).is_empty());
    }

    #[test]
    fn select_hold_in_groups_jumps_to_predictions() {
        let mut ctl = controller();
        press_for(&mut ctl, Key::Scan, 100);
        ctl.wait(1_000);
        ctl.replace_items("predict", vec![ScanItem::inert("hello")]);
        let actions = press_for(&mut ctl, Key::Select, 900);
        assert_eq!(ctl.focus().group_index, 2);
        assert_eq!(ctl.focus().mode, ScanMode::Group);
        assert!(actions.contains(&Action::Announce("hello".into())));
    }

    #[test]
    fn replacing_focused_items_drops_to_groups() {
        let mut ctl = controller();
        press_for(&mut ctl, Key::Scan, 100);
        ctl.wait(1_000);
        press_for(&mut ctl, Key::Select, 100);
        assert_eq!(ctl.focus().mode, ScanMode::Item);

        let (found, actions) = ctl.replace_items("a", vec![ScanItem::inert("q")]);
        assert!(found);
        assert_eq!(ctl.focus().mode, ScanMode::Group);
        assert_eq!(actions.len(), 1);
        assert!(!ctl.replace_items("missing", Vec::new()).0);
    }

    #[test]
    fn reset_input_unsticks_a_held_key() {
        let mut ctl = controller();
        ctl.press(Key::Scan);
        ctl.wait(900);
        assert!(ctl.state().hold_active);
        ctl.reset_input();
        assert!(!ctl.state().hold_active);
        assert_eq!(ctl.scheduler().pending(), 0);
        // a fresh tap works normally afterwards
        ctl.wait(1_000);
        let actions = press_for(&mut ctl, Key::Scan, 100);
        assert!(!actions.is_empty());
    }

    #[test]
    fn shutdown_cancels_everything() {
        let mut ctl = controller();
        ctl.press(Key::Scan);
        ctl.press(Key::Select);
        assert_eq!(ctl.scheduler().pending(), 2);
        ctl.shutdown();
        assert_eq!(ctl.scheduler().pending(), 0);
    }

    #[test]
    fn eager_start_reports_initial_focus() {
        let config = ScanConfig {
            start_idle: false,
            ..ScanConfig::default()
        };
        let ctl = ScanController::new(groups(), config, VirtualScheduler::new()).unwrap();
        let actions = ctl.initial_actions();
        assert!(actions.contains(&Action::Announce("row a".into())));
    }

    #[test]
    fn dispatch_accepts_external_signals() {
        let mut ctl = controller();
        ctl.dispatch(SwitchSignal::new(Key::Scan, Signal::ShortActivation));
        assert_eq!(ctl.focus().mode, ScanMode::Group);
    }

    #[test]
    fn set_groups_restarts_session() {
        let mut ctl = controller();
        press_for(&mut ctl, Key::Scan, 100);
        ctl.set_groups(vec![ScanGroup::new("menu", "menu")]).unwrap();
        assert_eq!(ctl.focus().mode, ScanMode::Idle);
        assert_eq!(ctl.groups().len(), 1);
    }
}
