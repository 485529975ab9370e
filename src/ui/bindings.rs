/// Key → action bindings for the playing phase.
///
/// A key may carry several actions; they fire in the order they were
/// registered, and keys are visited in the order they were first bound.
/// Every held key fires every tick, so holding Right keeps walking.

use crossterm::event::KeyCode;

use crate::domain::entity::Facing;

use super::input::InputState;

/// Held to hide. Polled directly by the loop rather than bound, because
/// releasing it has to reveal the player again.
pub const HIDE_KEY: KeyCode = KeyCode::Down;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Jump,
    Walk(Facing),
    Quit,
}

#[derive(Default)]
pub struct KeyBindings {
    entries: Vec<(KeyCode, Vec<Action>)>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The in-game bindings: q quits, Up jumps, Left/Right walk.
    pub fn standard() -> Self {
        let mut b = KeyBindings::new();
        b.register(KeyCode::Char('q'), Action::Quit);
        b.register(KeyCode::Up, Action::Jump);
        b.register(KeyCode::Left, Action::Walk(Facing::Left));
        b.register(KeyCode::Right, Action::Walk(Facing::Right));
        b
    }

    /// Bind another action to `key`, after any already bound to it.
    pub fn register(&mut self, key: KeyCode, action: Action) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, actions)) => actions.push(action),
            None => self.entries.push((key, vec![action])),
        }
    }

    /// Actions for every held key, in binding order.
    pub fn dispatch(&self, kb: &InputState) -> Vec<Action> {
        self.entries
            .iter()
            .filter(|(key, _)| kb.is_held(*key))
            .flat_map(|(_, actions)| actions.iter().copied())
            .collect()
    }
}
