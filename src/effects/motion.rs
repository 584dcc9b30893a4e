use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MotionLevel {
    #[default]
    Full,
    Reduced,
    None,
}

impl MotionLevel {
    /// Multiplier applied to pointer and scroll driven offsets.
    pub fn scale(self) -> f32 {
        match self {
            MotionLevel::Full => 1.0,
            MotionLevel::Reduced => 0.5,
            MotionLevel::None => 0.0,
        }
    }

    /// Whether timed sequences play out or jump to their final frame.
    pub fn animates(self) -> bool {
        self != MotionLevel::None
    }
}
