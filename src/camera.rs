use cgmath::Deg;

pub const MIN_FOV: Deg<f32> = Deg(20.);
pub const MAX_FOV: Deg<f32> = Deg(110.);
pub const DEFAULT_FOV: Deg<f32> = Deg(80.);
/// Degrees of field of view per unit of wheel delta.
pub const DEFAULT_WHEEL_SCALE: f32 = 0.04;

/// Clamped field-of-view accumulator driven by wheel deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomController {
    fov: Deg<f32>,
    min: Deg<f32>,
    max: Deg<f32>,
    scale: f32,
}

impl ZoomController {
    pub fn new(initial: Deg<f32>, min: Deg<f32>, max: Deg<f32>, scale: f32) -> Self {
        let (min, max) = if min.0 <= max.0 { (min, max) } else { (max, min) };
        Self {
            fov: clamp(initial, min, max),
            min,
            max,
            scale,
        }
    }

    pub fn fov(&self) -> Deg<f32> {
        self.fov
    }

    pub fn limits(&self) -> (Deg<f32>, Deg<f32>) {
        (self.min, self.max)
    }

    /// Applies one wheel event and returns the new field of view.
    /// Scrolling down (positive delta) widens the view.
    pub fn on_wheel(&mut self, delta_y: f32) -> Deg<f32> {
        if !delta_y.is_finite() {
            log::warn!("ignoring non-finite wheel delta {delta_y}");
            return self.fov;
        }
        self.fov = clamp(self.fov + Deg(delta_y * self.scale), self.min, self.max);
        self.fov
    }

    pub fn set_fov(&mut self, fov: Deg<f32>) -> Deg<f32> {
        self.fov = clamp(fov, self.min, self.max);
        self.fov
    }

    pub fn is_min(&self) -> bool {
        self.fov.0 <= self.min.0
    }

    pub fn is_max(&self) -> bool {
        self.fov.0 >= self.max.0
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new(DEFAULT_FOV, MIN_FOV, MAX_FOV, DEFAULT_WHEEL_SCALE)
    }
}

fn clamp(fov: Deg<f32>, min: Deg<f32>, max: Deg<f32>) -> Deg<f32> {
    Deg(fov.0.clamp(min.0, max.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_default() {
        let zoom = ZoomController::default();
        assert_eq!(zoom.fov(), Deg(80.));
        assert_eq!(zoom.limits(), (Deg(20.), Deg(110.)));
    }

    #[test]
    fn wheel_scales_delta() {
        let mut zoom = ZoomController::default();
        assert_eq!(zoom.on_wheel(100.), Deg(84.));
        assert_eq!(zoom.on_wheel(-200.), Deg(76.));
    }

    #[test]
    fn zero_delta_is_noop() {
        let mut zoom = ZoomController::default();
        zoom.on_wheel(37.);
        let before = zoom.fov();
        assert_eq!(zoom.on_wheel(0.), before);
    }

    #[test]
    fn clamps_both_ends() {
        let mut zoom = ZoomController::default();
        assert_eq!(zoom.on_wheel(10_000.), Deg(110.));
        assert!(zoom.is_max());
        assert_eq!(zoom.on_wheel(-10_000.), Deg(20.));
        assert!(zoom.is_min());
    }

    #[test]
    fn any_sequence_stays_in_range() {
        let mut zoom = ZoomController::default();
        let mut delta = 13.7f32;
        for i in 0..2_000 {
            // deterministic but irregular deltas of both signs
            delta = (delta * 31.3 + i as f32).rem_euclid(1_500.) - 750.;
            let fov = zoom.on_wheel(delta);
            assert!((20. ..=110.).contains(&fov.0), "{fov:?} after {delta}");
        }
    }

    #[test]
    fn non_finite_delta_is_ignored() {
        let mut zoom = ZoomController::default();
        assert_eq!(zoom.on_wheel(f32::NAN), Deg(80.));
        assert_eq!(zoom.on_wheel(f32::INFINITY), Deg(80.));
    }

    #[test]
    fn initial_value_is_clamped() {
        let zoom = ZoomController::new(Deg(150.), Deg(110.), Deg(20.), 0.04);
        assert_eq!(zoom.fov(), Deg(110.));
        assert_eq!(zoom.limits(), (Deg(20.), Deg(110.)));
    }
}
