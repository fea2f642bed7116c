use std::collections::HashSet;

use sdl2::keyboard::Keycode;

use campus_core::types::Direction;

/// Merged movement/interaction input from keyboard and the on-screen pad.
///
/// The virtual pad wins whenever it is held; keyboard direction follows a
/// fixed priority (up, down, left, right) so holding two keys is stable.
#[derive(Default)]
pub struct InputState {
    pressed: HashSet<Keycode>,
    pad_direction: Option<Direction>,
    interact_queued: bool,
}

impl InputState {
    pub fn key_down(&mut self, key: Keycode) {
        match key {
            Keycode::E => self.interact_queued = true,
            _ => {
                self.pressed.insert(key);
            }
        }
    }

    pub fn key_up(&mut self, key: Keycode) {
        self.pressed.remove(&key);
    }

    /// Drops held keys, e.g. when a text field steals the keyboard.
    pub fn clear_keys(&mut self) {
        self.pressed.clear();
        self.interact_queued = false;
    }

    /// Set each frame by the virtual pad UI; `None` when no pad button is
    /// held.
    pub fn set_pad_direction(&mut self, direction: Option<Direction>) {
        self.pad_direction = direction;
    }

    /// Queues one interaction, from the pad's action button.
    pub fn queue_interact(&mut self) {
        self.interact_queued = true;
    }

    fn keyboard_direction(&self) -> Option<Direction> {
        if self.pressed.contains(&Keycode::Up) || self.pressed.contains(&Keycode::W) {
            Some(Direction::Up)
        } else if self.pressed.contains(&Keycode::Down) || self.pressed.contains(&Keycode::S) {
            Some(Direction::Down)
        } else if self.pressed.contains(&Keycode::Left) || self.pressed.contains(&Keycode::A) {
            Some(Direction::Left)
        } else if self.pressed.contains(&Keycode::Right) || self.pressed.contains(&Keycode::D) {
            Some(Direction::Right)
        } else {
            None
        }
    }

    /// Current combined direction; the pad overrides the keyboard.
    pub fn direction(&self) -> Option<Direction> {
        self.pad_direction.or_else(|| self.keyboard_direction())
    }

    /// Consumes the queued interaction edge, if any.
    pub fn take_interact(&mut self) -> bool {
        std::mem::take(&mut self.interact_queued)
    }
}
