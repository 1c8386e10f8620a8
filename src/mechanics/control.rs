/// Control mechanics: signed percentage nudges on model parameters.

/// Direction of a single control nudge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nudge {
    Down,
    Hold,
    Up,
}

impl Nudge {
    /// Parse a raw action component; anything outside {-1, 0, 1} is `None`.
    #[inline]
    pub fn from_unit(v: i8) -> Option<Self> {
        match v {
            -1 => Some(Nudge::Down),
            0 => Some(Nudge::Hold),
            1 => Some(Nudge::Up),
            _ => None,
        }
    }

    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Nudge::Down => -1.0,
            Nudge::Hold => 0.0,
            Nudge::Up => 1.0,
        }
    }
}

/// Multiplicative nudge: x' = clamp(x + sign * pct * x).
#[inline]
pub fn shift(x: f64, nudge: Nudge, pct: f64, lo: f64, hi: f64) -> f64 {
    (x + nudge.sign() * pct * x).clamp(lo, hi)
}
