//! Pointer/touch input mapping

use crate::sim::Player;

/// Horizontal velocity that moves the player toward a pointer.
///
/// `pointer_x` is relative to the play field's left edge.
pub fn follow_pointer(pointer_x: f32, player: &Player, gain: f32) -> f32 {
    (pointer_x - player.center().x) * gain
}

/// Convert a client-space x coordinate to field space
pub fn client_to_field_x(client_x: f32, field_left: f32, css_width: f32, field_width: f32) -> f32 {
    if css_width <= 0.0 {
        return client_x - field_left;
    }
    (client_x - field_left) * field_width / css_width
}

/// Pointer steering state. The player only follows while a button or
/// finger is down; letting go stops it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerTracker {
    /// Field x of the held pointer
    held_x: Option<f32>,
    /// Released since the last velocity read
    released: bool,
}

impl PointerTracker {
    /// Button or finger went down at field x
    pub fn press(&mut self, x: f32) {
        self.held_x = Some(x);
        self.released = false;
    }

    /// Pointer moved. Ignored unless something is held.
    pub fn drag(&mut self, x: f32, held: bool) {
        if held {
            self.press(x);
        }
    }

    pub fn release(&mut self) {
        if self.held_x.take().is_some() {
            self.released = true;
        }
    }

    pub fn is_held(&self) -> bool {
        self.held_x.is_some()
    }

    /// Velocity to feed the next tick: follow while held, zero once after a
    /// release, otherwise leave the current velocity alone
    pub fn velocity(&mut self, player: &Player, gain: f32) -> Option<f32> {
        match self.held_x {
            Some(x) => Some(follow_pointer(x, player, gain)),
            None if self.released => {
                self.released = false;
                Some(0.0)
            }
            None => None,
        }
    }
}
