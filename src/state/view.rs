//! Viewport and variable selection state

use std::collections::BTreeSet;

/// Visible sub-range of the relative time axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    min: f64,
    max: f64,
}

impl Viewport {
    /// Bounds are reordered if given backwards
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The whole series
    pub fn full(total_elapsed: f64) -> Self {
        Self::new(0.0, total_elapsed.max(0.0))
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.min && t <= self.max
    }

    /// Clamp both bounds into `[0, total_elapsed]`
    pub fn clamped(self, total_elapsed: f64) -> Self {
        let total = total_elapsed.max(0.0);
        Self::new(self.min.clamp(0.0, total), self.max.clamp(0.0, total))
    }

    /// Shift by `delta`, keeping the width when hitting either end
    pub fn pan(self, delta: f64, total_elapsed: f64) -> Self {
        let total = total_elapsed.max(0.0);
        let width = self.range().min(total);
        let min = (self.min + delta).clamp(0.0, total - width);
        Self::new(min, min + width)
    }

    /// Scale the width by `factor` around `anchor` (< 1 zooms in)
    pub fn zoom(self, factor: f64, anchor: f64, total_elapsed: f64) -> Self {
        let factor = if factor.is_finite() && factor > 0.0 { factor } else { 1.0 };
        let min = anchor - (anchor - self.min) * factor;
        let max = anchor + (self.max - anchor) * factor;
        Self::new(min, max).clamped(total_elapsed)
    }

    /// True if the bounds differ by more than `epsilon`
    pub fn differs_from(&self, other: &Viewport, epsilon: f64) -> bool {
        (self.min - other.min).abs() > epsilon || (self.max - other.max).abs() > epsilon
    }
}

/// Column names chosen for plotting; order is irrelevant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedVariables {
    names: BTreeSet<String>,
}

impl SelectedVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Flip the selection of `name`; returns the new state
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.names.remove(name) {
            false
        } else {
            self.names.insert(name.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Drop names that are not in `available`
    pub fn retain_available(&mut self, available: &[String]) {
        self.names.retain(|n| available.contains(n));
    }
}

impl<S: Into<String>> FromIterator<S> for SelectedVariables {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_orders_bounds() {
        let vp = Viewport::new(5.0, 2.0);
        assert_eq!(vp.min(), 2.0);
        assert_eq!(vp.max(), 5.0);
        assert_eq!(vp.range(), 3.0);
    }

    #[test]
    fn test_viewport_clamp() {
        let vp = Viewport::new(-4.0, 50.0).clamped(10.0);
        assert_eq!(vp, Viewport::new(0.0, 10.0));
    }

    #[test]
    fn test_pan_keeps_width_at_edges() {
        let vp = Viewport::new(2.0, 4.0);
        assert_eq!(vp.pan(1.0, 10.0), Viewport::new(3.0, 5.0));
        assert_eq!(vp.pan(100.0, 10.0), Viewport::new(8.0, 10.0));
        assert_eq!(vp.pan(-100.0, 10.0), Viewport::new(0.0, 2.0));
    }

    #[test]
    fn test_zoom_around_anchor() {
        let vp = Viewport::new(0.0, 10.0);
        let zoomed = vp.zoom(0.5, 5.0, 10.0);
        assert_eq!(zoomed, Viewport::new(2.5, 7.5));
        // Zooming out past the data clamps to the full range
        assert_eq!(zoomed.zoom(10.0, 5.0, 10.0), Viewport::full(10.0));
    }

    #[test]
    fn test_selection_toggle() {
        let mut selected = SelectedVariables::new();
        assert!(selected.toggle("altitude"));
        assert!(selected.contains("altitude"));
        assert!(!selected.toggle("altitude"));
        assert!(selected.is_empty());
    }

    #[test]
    fn test_retain_available() {
        let mut selected: SelectedVariables = ["a", "b", "gone"].into_iter().collect();
        selected.retain_available(&["a".to_string(), "b".to_string()]);
        assert_eq!(selected.len(), 2);
        assert!(!selected.contains("gone"));
    }
}
