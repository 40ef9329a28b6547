//! Easing functions for tweens

use serde::{Deserialize, Serialize};

const BOUNCE_SCALE: f32 = 7.5625;
const BOUNCE_SPAN: f32 = 2.75;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseInQuad,
    #[default]
    EaseOutQuad,
    EaseInOutQuad,
    EaseOutBounce,
}

impl Easing {
    /// Every easing curve, in declaration order
    pub const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseOutBounce,
    ];

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseOutBounce => ease_out_bounce(t),
        }
    }
}

/// Piecewise quadratic bounce that lands at 1.0 with three decaying rebounds
fn ease_out_bounce(t: f32) -> f32 {
    let (offset, baseline) = if t < 1.0 / BOUNCE_SPAN {
        (0.0, 0.0)
    } else if t < 2.0 / BOUNCE_SPAN {
        (1.5 / BOUNCE_SPAN, 0.75)
    } else if t < 2.5 / BOUNCE_SPAN {
        (2.25 / BOUNCE_SPAN, 0.9375)
    } else {
        (2.625 / BOUNCE_SPAN, 0.984375)
    };
    let d = t - offset;
    BOUNCE_SCALE * d * d + baseline
}
