use crate::config::EffectsConfig;

/// Tracks the "scrolled" style of the top navigation bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Navbar {
    threshold: f32,
    scrolled: bool,
}

impl Navbar {
    pub fn new(config: &EffectsConfig) -> Self {
        Self {
            threshold: config.navbar_scroll_threshold,
            scrolled: false,
        }
    }

    /// Returns `true` when the scrolled style flips.
    pub fn on_scroll(&mut self, scroll_y: f32) -> bool {
        let scrolled = scroll_y > self.threshold;
        let changed = scrolled != self.scrolled;
        self.scrolled = scrolled;
        changed
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClickTarget {
    Toggle,
    Menu,
    Outside,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn on_click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Toggle => self.open = !self.open,
            ClickTarget::Menu => {}
            ClickTarget::Outside => self.open = false,
        }
    }

    /// In-page link followed.
    pub fn on_navigate(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navbar_flips_only_past_threshold() {
        let mut navbar = Navbar::new(&EffectsConfig::default());
        assert!(!navbar.on_scroll(50.0));
        assert!(!navbar.is_scrolled());
        assert!(navbar.on_scroll(50.5));
        assert!(!navbar.on_scroll(400.0));
        assert!(navbar.on_scroll(0.0));
        assert!(!navbar.is_scrolled());
    }

    #[test]
    fn menu_closes_on_outside_click_and_navigation() {
        let mut menu = MobileMenu::new();
        menu.on_click(ClickTarget::Toggle);
        assert!(menu.is_open());
        menu.on_click(ClickTarget::Menu);
        assert!(menu.is_open());
        menu.on_click(ClickTarget::Outside);
        assert!(!menu.is_open());

        menu.on_click(ClickTarget::Toggle);
        menu.on_navigate();
        assert!(!menu.is_open());

        menu.on_click(ClickTarget::Toggle);
        menu.on_click(ClickTarget::Toggle);
        assert!(!menu.is_open());
    }
}
