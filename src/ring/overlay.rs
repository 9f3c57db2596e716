//! Enter/exit presence of the focus overlay.
//!
//! The selection state flips instantly; the overlay keeps the last focused
//! item mounted while it fades out, and fades in over [`OVERLAY_DURATION`].

use crate::ring::model::ItemIndex;
use crate::ring::{OVERLAY_DURATION, OVERLAY_EASE};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OverlayPresence {
    #[default]
    Hidden,
    /// `amount` is the linear visibility in `[0, 1]`.
    Entering { index: ItemIndex, amount: f64 },
    Shown { index: ItemIndex },
    Exiting { index: ItemIndex, amount: f64 },
}

impl OverlayPresence {
    pub fn open(&mut self, index: ItemIndex) {
        let amount = match *self {
            Self::Exiting { index: i, amount } if i == index => amount,
            _ => 0.0,
        };
        *self = Self::Entering { index, amount };
    }

    pub fn close(&mut self) {
        *self = match *self {
            Self::Entering { index, amount } => Self::Exiting { index, amount },
            Self::Shown { index } => Self::Exiting { index, amount: 1.0 },
            other => other,
        };
    }

    /// Advances the fade; returns true while the overlay is still animating.
    pub fn tick(&mut self, dt: f64) -> bool {
        let step = dt.max(0.0) / OVERLAY_DURATION;
        match *self {
            Self::Entering { index, amount } => {
                let amount = amount + step;
                if amount >= 1.0 {
                    *self = Self::Shown { index };
                    false
                } else {
                    *self = Self::Entering { index, amount };
                    true
                }
            }
            Self::Exiting { index, amount } => {
                let amount = amount - step;
                if amount <= 0.0 {
                    *self = Self::Hidden;
                    false
                } else {
                    *self = Self::Exiting { index, amount };
                    true
                }
            }
            Self::Hidden | Self::Shown { .. } => false,
        }
    }

    pub fn index(&self) -> Option<ItemIndex> {
        match *self {
            Self::Hidden => None,
            Self::Entering { index, .. } | Self::Shown { index } | Self::Exiting { index, .. } => {
                Some(index)
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Entering { .. } | Self::Exiting { .. })
    }

    fn amount(&self) -> f64 {
        match *self {
            Self::Hidden => 0.0,
            Self::Shown { .. } => 1.0,
            Self::Entering { amount, .. } | Self::Exiting { amount, .. } => amount,
        }
    }

    fn eased(&self) -> f64 {
        let [x1, y1, x2, y2] = OVERLAY_EASE;
        CubicBezier::new(x1, y1, x2, y2).ease(self.amount())
    }

    pub fn opacity(&self) -> f64 {
        self.eased()
    }

    /// The overlay grows from nothing alongside its fade.
    pub fn scale(&self) -> f64 {
        self.eased()
    }
}

/// CSS-style `cubic-bezier(x1, y1, x2, y2)` timing curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x: [f64; 3],
    y: [f64; 3],
}

impl CubicBezier {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: Self::coefficients(x1, x2),
            y: Self::coefficients(y1, y2),
        }
    }

    fn coefficients(p1: f64, p2: f64) -> [f64; 3] {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        [a, b, c]
    }

    fn sample([a, b, c]: [f64; 3], t: f64) -> f64 {
        ((a * t + b) * t + c) * t
    }

    fn slope([a, b, c]: [f64; 3], t: f64) -> f64 {
        (3.0 * a * t + 2.0 * b) * t + c
    }

    /// Curve parameter whose x coordinate is `x`.
    fn solve_t(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..8 {
            let err = Self::sample(self.x, t) - x;
            if err.abs() < 1e-7 {
                return t;
            }
            let d = Self::slope(self.x, t);
            if d.abs() < 1e-6 {
                break;
            }
            t -= err / d;
        }

        // newton stalled on a flat section
        let (mut lo, mut hi) = (0.0, 1.0);
        t = x;
        while hi - lo > 1e-7 {
            if Self::sample(self.x, t) < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        t
    }

    pub fn ease(&self, progress: f64) -> f64 {
        let x = progress.clamp(0.0, 1.0);
        if x == 0.0 || x == 1.0 {
            return x;
        }
        Self::sample(self.y, self.solve_t(x))
    }
}
