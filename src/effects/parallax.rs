use super::{Offset, Point, Rect, Size};
use crate::config::EffectsConfig;

/// Vertical shift of a scroll-parallax layer. `speed` falls back to the
/// configured default when the layer does not declare one.
pub fn scroll_parallax(scroll_y: f32, speed: Option<f32>, config: &EffectsConfig) -> Offset {
    let speed = speed.unwrap_or(config.parallax_speed);
    Offset {
        x: 0.0,
        y: scroll_y * speed * config.motion.scale(),
    }
}

/// Offsets of `count` floating orbs following the pointer. Orb `i` moves
/// `(i + 1) * orb_speed_step` times the base spread.
pub fn orb_offsets(
    pointer: Point,
    viewport: Size,
    count: usize,
    config: &EffectsConfig,
) -> Vec<Offset> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return vec![Offset::default(); count];
    }
    let nx = pointer.x / viewport.width - 0.5;
    let ny = pointer.y / viewport.height - 0.5;
    let spread = config.orb_spread_px * config.motion.scale();
    (0..count)
        .map(|index| {
            let speed = (index + 1) as f32 * config.orb_speed_step;
            Offset {
                x: nx * spread * speed,
                y: ny * spread * speed,
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tilt {
    pub rotate_x_deg: f32,
    pub rotate_y_deg: f32,
}

impl Tilt {
    pub fn rest() -> Self {
        Self::default()
    }

    pub fn css(&self, perspective_px: f32) -> String {
        format!(
            "perspective({perspective_px}px) rotateX({}deg) rotateY({}deg)",
            self.rotate_x_deg, self.rotate_y_deg
        )
    }
}

/// 3D tilt of a card for a pointer inside it; pointer above centre tips the
/// top edge away.
pub fn card_tilt(pointer: Point, card: Rect, config: &EffectsConfig) -> Tilt {
    if config.tilt_divisor == 0.0 {
        return Tilt::rest();
    }
    let x = pointer.x - card.left;
    let y = pointer.y - card.top;
    let scale = config.motion.scale();
    Tilt {
        rotate_x_deg: (y - card.height / 2.0) / config.tilt_divisor * scale,
        rotate_y_deg: (card.width / 2.0 - x) / config.tilt_divisor * scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::MotionLevel;

    #[test]
    fn scroll_parallax_uses_layer_or_default_speed() {
        let config = EffectsConfig::default();
        assert_eq!(scroll_parallax(200.0, None, &config).y, 100.0);
        assert_eq!(scroll_parallax(200.0, Some(0.2), &config).y, 40.0);
        assert_eq!(
            scroll_parallax(200.0, None, &config).css_translate_y(),
            "translateY(100px)"
        );
    }

    #[test]
    fn orbs_spread_with_index() {
        let config = EffectsConfig::default();
        let offsets = orb_offsets(
            Point::new(1000.0, 250.0),
            Size::new(1000.0, 1000.0),
            3,
            &config,
        );
        assert_eq!(
            offsets,
            vec![
                Offset { x: 25.0, y: -12.5 },
                Offset { x: 50.0, y: -25.0 },
                Offset { x: 75.0, y: -37.5 },
            ]
        );
    }

    #[test]
    fn orbs_stay_put_without_viewport_or_motion() {
        let config = EffectsConfig::default();
        assert!(
            orb_offsets(Point::new(5.0, 5.0), Size::default(), 2, &config)
                .iter()
                .all(|offset| *offset == Offset::default())
        );

        let still = EffectsConfig {
            motion: MotionLevel::None,
            ..EffectsConfig::default()
        };
        let offsets = orb_offsets(Point::new(0.0, 0.0), Size::new(100.0, 100.0), 1, &still);
        assert_eq!(offsets[0].x, 0.0);
    }

    #[test]
    fn card_tilts_toward_pointer() {
        let config = EffectsConfig::default();
        let card = Rect::new(100.0, 100.0, 200.0, 100.0);

        let centre = card_tilt(Point::new(200.0, 150.0), card, &config);
        assert_eq!(centre, Tilt::rest());

        let corner = card_tilt(Point::new(100.0, 100.0), card, &config);
        assert_eq!(corner.rotate_x_deg, -5.0);
        assert_eq!(corner.rotate_y_deg, 10.0);
        assert_eq!(
            corner.css(config.tilt_perspective_px),
            "perspective(1000px) rotateX(-5deg) rotateY(10deg)"
        );
    }

    #[test]
    fn reduced_motion_halves_tilt() {
        let config = EffectsConfig {
            motion: MotionLevel::Reduced,
            ..EffectsConfig::default()
        };
        let tilt = card_tilt(
            Point::new(0.0, 0.0),
            Rect::new(0.0, 0.0, 200.0, 100.0),
            &config,
        );
        assert_eq!(tilt.rotate_x_deg, -2.5);
        assert_eq!(tilt.rotate_y_deg, 5.0);
    }
}
