//! Table functions: piecewise-linear lookups over evenly spaced abscissae,
//! held flat outside the tabulated range (System-Dynamics convention).

#[derive(Clone, Copy, Debug)]
pub struct Table {
    pub x_min: f64,
    pub x_max: f64,
    pub ys: &'static [f64],
}

impl Table {
    pub const fn new(x_min: f64, x_max: f64, ys: &'static [f64]) -> Self {
        Self { x_min, x_max, ys }
    }

    #[inline]
    pub fn at(&self, x: f64) -> f64 {
        let n = self.ys.len();
        if n == 0 {
            return 0.0;
        }
        if n == 1 || !x.is_finite() || x <= self.x_min {
            return if x >= self.x_max { self.ys[n - 1] } else { self.ys[0] };
        }
        if x >= self.x_max {
            return self.ys[n - 1];
        }
        let step = (self.x_max - self.x_min) / (n - 1) as f64;
        let pos = (x - self.x_min) / step;
        let i = (pos.floor() as usize).min(n - 2);
        let frac = pos - i as f64;
        self.ys[i] + frac * (self.ys[i + 1] - self.ys[i])
    }
}
