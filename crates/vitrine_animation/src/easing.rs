//! Easing functions
//!
//! Transfer functions mapping a `[0, 1]` progress ratio to an eased ratio.
//! The default for transitions is [`Easing::Linear`] (clamped identity);
//! entrances typically use [`Easing::EaseOutBack`] for a slight overshoot and
//! exits/shared legs use [`Easing::EaseOutExpo`].

/// Easing curve applied to normalized animation progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Identity (clamped)
    #[default]
    Linear,
    /// Quadratic ease-out
    EaseOutQuad,
    /// Cubic ease-out
    EaseOutCubic,
    /// Cubic ease-in-out
    EaseInOutCubic,
    /// Exponential ease-out
    EaseOutExpo,
    /// Back ease-out (overshoots, then settles)
    EaseOutBack,
}

impl Easing {
    /// Apply the curve to a progress ratio.
    ///
    /// Input is clamped to `[0, 1]`. Every curve maps 0 to 0 and 1 to 1;
    /// `EaseOutBack` may exceed 1 in between.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Easing::EaseOutBack => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                let u = t - 1.0;
                1.0 + C3 * u * u * u + C1 * u * u
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 6] = [
        Easing::Linear,
        Easing::EaseOutQuad,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseOutExpo,
        Easing::EaseOutBack,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!((easing.apply(0.0)).abs() < 1e-4, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-4, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_input_is_clamped() {
        for easing in ALL {
            assert_eq!(easing.apply(-0.5), easing.apply(0.0));
            assert_eq!(easing.apply(1.5), easing.apply(1.0));
        }
    }

    #[test]
    fn test_ease_out_back_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::EaseOutBack.apply(i as f32 / 100.0))
            .fold(0.0_f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_ease_out_expo_is_front_loaded() {
        assert!(Easing::EaseOutExpo.apply(0.5) > 0.9);
    }
}
