/// A viewport-relative box, as reported by `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }
}

/// Scroll state of a scrollable element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self { scroll_top, scroll_height, client_height }
    }

    /// The largest valid `scroll_top`; never negative.
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// Current offset as a fraction of `max_scroll`, 0 when nothing can scroll.
    pub fn fraction(&self) -> f64 {
        let max = self.max_scroll();
        if max > 0.0 { (self.scroll_top / max).clamp(0.0, 1.0) } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_scroll_never_negative() {
        let m = ScrollMetrics::new(0.0, 300.0, 500.0);
        assert_eq!(m.max_scroll(), 0.0);
        assert_eq!(m.fraction(), 0.0);
    }

    #[test]
    fn fraction_of_max() {
        let m = ScrollMetrics::new(250.0, 1500.0, 500.0);
        assert_eq!(m.max_scroll(), 1000.0);
        assert!((m.fraction() - 0.25).abs() < f64::EPSILON);
    }
}
