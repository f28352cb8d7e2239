use glam::Vec2;
use std::collections::BTreeSet;

/// Movement buttons tracked while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Button {
    Forward,
    Backward,
    Left,
    Right,
    Sprint,
}

/// Input for one simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// `x` strafes right, `y` moves forward. Each component is in -1..=1.
    pub movement: Vec2,
    pub sprint: bool,
    /// Mouse motion in pixels since the previous tick.
    pub look: Vec2,
}

impl FrameInput {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Input that walks straight ahead.
    pub fn forward() -> Self {
        Self {
            movement: Vec2::Y,
            ..Self::default()
        }
    }
}

/// Accumulates raw input between ticks.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: BTreeSet<Button>,
    look: Vec2,
    look_enabled: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, button: Button) {
        self.held.insert(button);
    }

    pub fn release(&mut self, button: Button) {
        self.held.remove(&button);
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held.contains(&button)
    }

    /// Mouse look only accumulates while enabled (e.g. a mouse button is down).
    pub fn set_look_enabled(&mut self, enabled: bool) {
        self.look_enabled = enabled;
    }

    pub fn add_look(&mut self, dx: f32, dy: f32) {
        if self.look_enabled {
            self.look += Vec2::new(dx, dy);
        }
    }

    /// Drop everything held, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
        self.look = Vec2::ZERO;
    }

    /// Build this tick's input and consume accumulated look motion.
    pub fn take_frame(&mut self) -> FrameInput {
        let axis = |pos: Button, neg: Button| {
            (self.is_held(pos) as i32 - self.is_held(neg) as i32) as f32
        };
        let frame = FrameInput {
            movement: Vec2::new(
                axis(Button::Right, Button::Left),
                axis(Button::Forward, Button::Backward),
            ),
            sprint: self.is_held(Button::Sprint),
            look: self.look,
        };
        self.look = Vec2::ZERO;
        if frame.look != Vec2::ZERO {
            tracing::trace!(dx = frame.look.x, dy = frame.look.y, "look");
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_buttons_cancel() {
        let mut input = InputState::new();
        input.press(Button::Forward);
        input.press(Button::Backward);
        input.press(Button::Right);
        let frame = input.take_frame();
        assert_eq!(frame.movement, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn held_buttons_persist_across_frames() {
        let mut input = InputState::new();
        input.press(Button::Forward);
        input.press(Button::Sprint);
        assert_eq!(input.take_frame().movement, Vec2::Y);
        let frame = input.take_frame();
        assert_eq!(frame.movement, Vec2::Y);
        assert!(frame.sprint);

        input.release(Button::Forward);
        assert_eq!(input.take_frame().movement, Vec2::ZERO);
    }

    #[test]
    fn look_is_consumed_once() {
        let mut input = InputState::new();
        input.set_look_enabled(true);
        input.add_look(3.0, -2.0);
        input.add_look(1.0, 0.0);
        assert_eq!(input.take_frame().look, Vec2::new(4.0, -2.0));
        assert_eq!(input.take_frame().look, Vec2::ZERO);
    }

    #[test]
    fn look_ignored_when_disabled() {
        let mut input = InputState::new();
        input.add_look(5.0, 5.0);
        assert_eq!(input.take_frame().look, Vec2::ZERO);
    }

    #[test]
    fn clear_releases_everything() {
        let mut input = InputState::new();
        input.press(Button::Left);
        input.clear();
        assert!(!input.is_held(Button::Left));
        assert_eq!(input.take_frame(), FrameInput::idle());
    }
}
