//! Mouse Input Module
//!
//! Mouse buttons, pointer positions and wheel deltas.
//! Decoupled from winit to use generic types.

/// Wheel pixels per scrolled line.
pub const PIXELS_PER_LINE: f64 = 100.0;

/// Mouse button identifiers, independent of windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    /// Additional mouse buttons (button 4, 5, etc.)
    Other(u16),
}

impl MouseButton {
    /// The button that grabs, spins and selects.
    pub fn is_primary(&self) -> bool {
        matches!(self, MouseButton::Left)
    }
}

/// Pointer position in pixels, origin top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64)> for Position {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

/// Scroll wheel delta in pixels.
///
/// Positive `y` scrolls down the page, which zooms out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollDelta {
    pub x: f64,
    pub y: f64,
}

impl ScrollDelta {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// From a line delta (mouse wheels). Winit reports positive lines when
    /// the wheel turns away from the user.
    pub fn from_lines(x: f32, y: f32) -> Self {
        Self {
            x: -(x as f64) * PIXELS_PER_LINE,
            y: -(y as f64) * PIXELS_PER_LINE,
        }
    }

    /// From a pixel delta (trackpads). Winit reports positive pixels when
    /// the content moves down.
    pub fn from_pixels(x: f64, y: f64) -> Self {
        Self { x: -x, y: -y }
    }

    /// Check if there's any scroll movement.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_button() {
        assert!(MouseButton::Left.is_primary());
        assert!(!MouseButton::Right.is_primary());
        assert!(!MouseButton::Other(4).is_primary());
    }

    #[test]
    fn test_position_distance() {
        let p1 = Position::new(0.0, 0.0);
        let p2 = Position::new(3.0, 4.0);
        assert_eq!(p1.distance(&p2), 5.0);
    }

    #[test]
    fn test_wheel_toward_user_zooms_out() {
        let scroll = ScrollDelta::from_lines(0.0, -1.0);
        assert_eq!(scroll.y, 100.0);
        assert!(!scroll.is_zero());
    }

    #[test]
    fn test_trackpad_pixels_flip_sign() {
        let scroll = ScrollDelta::from_pixels(0.0, 40.0);
        assert_eq!(scroll.y, -40.0);
        assert!(ScrollDelta::default().is_zero());
    }
}
