use std::collections::BTreeSet;

use super::{Rect, Size};
use crate::config::EffectsConfig;

/// Fraction of `element` inside the viewport once its bottom edge is pulled
/// up by `bottom_margin`.
pub fn intersection_ratio(element: Rect, viewport: Size, bottom_margin: f32) -> f32 {
    let root_bottom = (viewport.height - bottom_margin).max(0.0);
    let visible_height = element.bottom().min(root_bottom) - element.top.max(0.0);
    let visible_width = element.right().min(viewport.width) - element.left.max(0.0);
    if visible_height < 0.0 || visible_width < 0.0 {
        return 0.0;
    }
    let area = element.width * element.height;
    if area <= 0.0 {
        return 1.0;
    }
    ((visible_height * visible_width) / area).clamp(0.0, 1.0)
}

/// Latches elements as revealed the first time enough of them is on screen.
#[derive(Clone, Debug)]
pub struct RevealTracker<K> {
    threshold: f32,
    bottom_margin: f32,
    revealed: BTreeSet<K>,
}

impl<K> RevealTracker<K>
where
    K: Ord,
{
    pub fn new(config: &EffectsConfig) -> Self {
        Self {
            threshold: config.reveal_threshold,
            bottom_margin: config.reveal_bottom_margin_px,
            revealed: BTreeSet::new(),
        }
    }

    pub fn is_intersecting(&self, element: Rect, viewport: Size) -> bool {
        let ratio = intersection_ratio(element, viewport, self.bottom_margin);
        ratio > 0.0 && ratio >= self.threshold
    }

    /// Returns `true` only on the observation that reveals `key`.
    pub fn observe(&mut self, key: K, element: Rect, viewport: Size) -> bool {
        if self.revealed.contains(&key) || !self.is_intersecting(element, viewport) {
            return false;
        }
        self.revealed.insert(key)
    }

    pub fn is_revealed(&self, key: &K) -> bool {
        self.revealed.contains(key)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }
}
