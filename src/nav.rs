/// Viewport width above which the hamburger menu is hidden by CSS.
pub const DEFAULT_BREAKPOINT_PX: u32 = 768;

/// Open/closed state of the hamburger menu.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct NavMenu {
    open: bool,
    breakpoint: u32,
}

impl Default for NavMenu {
    fn default() -> Self {
        Self::new(DEFAULT_BREAKPOINT_PX)
    }
}

impl NavMenu {
    pub fn new(breakpoint: u32) -> Self {
        Self {
            open: false,
            breakpoint,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Returns whether the menu was open.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// Closes the menu once the viewport is wider than the breakpoint.
    pub fn on_resize(&mut self, width: u32) -> bool {
        width > self.breakpoint && self.close()
    }

    pub fn aria_expanded(&self) -> &'static str {
        if self.open { "true" } else { "false" }
    }
}
