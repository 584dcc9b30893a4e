//! Decorative page effects as plain computations.
//!
//! Nothing here touches a document. Callers feed in scroll positions,
//! pointer coordinates and element rectangles, and apply the returned
//! offsets, transforms and frames however their renderer wants.

mod motion;
mod nav;
mod parallax;
mod reveal;
mod sequence;

pub use motion::MotionLevel;
pub use nav::{ClickTarget, MobileMenu, Navbar};
pub use parallax::{Tilt, card_tilt, orb_offsets, scroll_parallax};
pub use reveal::{RevealTracker, intersection_ratio};
pub use sequence::{SkillReveal, Typewriter, TypewriterFrame};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub fn css_translate(&self) -> String {
        format!("translate({}px, {}px)", self.x, self.y)
    }

    pub fn css_translate_y(&self) -> String {
        format!("translateY({}px)", self.y)
    }
}
