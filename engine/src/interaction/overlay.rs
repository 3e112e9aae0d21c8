//! Overlay cooperation.
//!
//! UI drawn above the globe (menus, pickers) can claim the wheel while the
//! pointer is over it. The globe asks before zooming.

pub trait OverlayProbe {
    fn overlay_hovered(&self) -> bool;
}

impl<F: Fn() -> bool> OverlayProbe for F {
    fn overlay_hovered(&self) -> bool {
        self()
    }
}

/// No overlay: the wheel always reaches the globe.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlay;

impl OverlayProbe for NoOverlay {
    fn overlay_hovered(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_closure_probe() {
        let hovered = Cell::new(false);
        let probe = || hovered.get();
        assert!(!probe.overlay_hovered());
        hovered.set(true);
        assert!(probe.overlay_hovered());
        assert!(!NoOverlay.overlay_hovered());
    }
}
