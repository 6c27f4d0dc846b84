use crate::{key_event::Action, model::Focus};

/// UI collaborator: renders focus and forwards announcements to speech.
pub trait ScanObserver {
    fn on_focus_changed(&mut self, focus: Focus);
    fn on_announce(&mut self, text: &str);
    fn on_activated(&mut self, _group_index: usize, _item_index: usize) {}
}

/// Hands a batch of controller actions to an observer, in order.
pub fn deliver(actions: Vec<Action>, observer: &mut dyn ScanObserver) {
    for action in actions {
        match action {
            Action::FocusChanged(focus) => observer.on_focus_changed(focus),
            Action::Announce(text) => observer.on_announce(&text),
            Action::Activated {
                group_index,
                item_index,
            } => observer.on_activated(group_index, item_index),
        }
    }
}
