//! Numeric conversions carried by graph edges

use std::fmt;
use std::sync::Arc;

/// Caller-supplied conversion function
pub type ConversionFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A pair of forward/backward numeric functions.
///
/// Linear and affine conversions are kept symbolic so that composing a path
/// stays closed-form; only `Custom` needs closures.
#[derive(Clone)]
pub enum Conversion {
    /// forward: x * factor, backward: x / factor
    Linear(f64),
    /// forward: x * scale + offset, backward: (x - offset) / scale
    Affine { scale: f64, offset: f64 },
    /// Arbitrary closures; backward(forward(x)) ≈ x is the caller's contract
    Custom { forward: ConversionFn, backward: ConversionFn },
}

impl Conversion {
    pub fn identity() -> Self {
        Conversion::Linear(1.0)
    }

    pub fn linear(factor: f64) -> Self {
        Conversion::Linear(factor)
    }

    /// Affine conversion; collapses to `Linear` when there is no offset
    pub fn affine(scale: f64, offset: f64) -> Self {
        if offset == 0.0 {
            Conversion::Linear(scale)
        } else {
            Conversion::Affine { scale, offset }
        }
    }

    pub fn custom<F, B>(forward: F, backward: B) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
        B: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Conversion::Custom {
            forward: Arc::new(forward),
            backward: Arc::new(backward),
        }
    }

    pub fn forward(&self, x: f64) -> f64 {
        match self {
            Conversion::Linear(factor) => x * factor,
            Conversion::Affine { scale, offset } => x * scale + offset,
            Conversion::Custom { forward, .. } => forward(x),
        }
    }

    pub fn backward(&self, x: f64) -> f64 {
        match self {
            Conversion::Linear(factor) => x / factor,
            Conversion::Affine { scale, offset } => (x - offset) / scale,
            Conversion::Custom { backward, .. } => backward(x),
        }
    }

    /// The same conversion traversed the other way
    pub fn inverse(&self) -> Self {
        match self {
            Conversion::Linear(factor) => Conversion::Linear(1.0 / factor),
            Conversion::Affine { scale, offset } => Conversion::affine(1.0 / scale, -offset / scale),
            Conversion::Custom { forward, backward } => Conversion::Custom {
                forward: Arc::clone(backward),
                backward: Arc::clone(forward),
            },
        }
    }

    /// Apply `self`, then `next`
    pub fn then(&self, next: &Conversion) -> Self {
        match (self.as_affine(), next.as_affine()) {
            (Some((s1, o1)), Some((s2, o2))) => {
                if o1 == 0.0 && o2 == 0.0 {
                    Conversion::Linear(s1 * s2)
                } else {
                    Conversion::affine(s1 * s2, o1 * s2 + o2)
                }
            }
            _ => {
                let (first, second) = (self.clone(), next.clone());
                let (first_back, second_back) = (self.clone(), next.clone());
                Conversion::custom(
                    move |x| second.forward(first.forward(x)),
                    move |y| first_back.backward(second_back.backward(y)),
                )
            }
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Conversion::Linear(_))
    }

    /// Change in output per unit change in input, f(1) - f(0).
    ///
    /// Equals the factor for linear conversions; for affine ones it drops the
    /// offset, which is what a unit inside a compound expression needs.
    pub fn slope(&self) -> f64 {
        match self {
            Conversion::Linear(factor) => *factor,
            Conversion::Affine { scale, .. } => *scale,
            Conversion::Custom { forward, .. } => forward(1.0) - forward(0.0),
        }
    }

    fn as_affine(&self) -> Option<(f64, f64)> {
        match self {
            Conversion::Linear(factor) => Some((*factor, 0.0)),
            Conversion::Affine { scale, offset } => Some((*scale, *offset)),
            Conversion::Custom { .. } => None,
        }
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::Linear(factor) => f.debug_tuple("Linear").field(factor).finish(),
            Conversion::Affine { scale, offset } => f
                .debug_struct("Affine")
                .field("scale", scale)
                .field("offset", offset)
                .finish(),
            Conversion::Custom { .. } => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        let tol = 1e-12 * a.abs().max(b.abs()).max(1.0);
        assert!((a - b).abs() <= tol, "{} != {}", a, b);
    }

    #[test]
    fn test_linear_round_trip() {
        let c = Conversion::linear(1e-2);
        assert_eq!(c.forward(1.0), 0.01);
        assert_close(c.backward(c.forward(123.0)), 123.0);
    }

    #[test]
    fn test_affine_round_trip() {
        // F -> C
        let c = Conversion::affine(5.0 / 9.0, -160.0 / 9.0);
        assert_close(c.forward(212.0), 100.0);
        assert_close(c.backward(c.forward(-40.0)), -40.0);
    }

    #[test]
    fn test_affine_without_offset_is_linear() {
        assert!(Conversion::affine(2.0, 0.0).is_linear());
    }

    #[test]
    fn test_compose_linear_stays_linear() {
        let cm_to_m = Conversion::linear(1e-2);
        let m_to_km = Conversion::linear(1e-3);
        let composed = cm_to_m.then(&m_to_km);
        assert!(composed.is_linear());
        assert_close(composed.forward(1e5), 1.0);
    }

    #[test]
    fn test_compose_affine() {
        let f_to_c = Conversion::affine(5.0 / 9.0, -160.0 / 9.0);
        let c_to_k = Conversion::affine(1.0, 273.15);
        let f_to_k = f_to_c.then(&c_to_k);
        assert!(matches!(f_to_k, Conversion::Affine { .. }));
        assert_close(f_to_k.forward(32.0), 273.15);
        assert_close(f_to_k.backward(273.15), 32.0);
    }

    #[test]
    fn test_compose_custom() {
        let square = Conversion::custom(|x| x * x, |y: f64| y.sqrt());
        let double = Conversion::linear(2.0);
        let c = square.then(&double);
        assert_close(c.forward(3.0), 18.0);
        assert_close(c.backward(18.0), 3.0);
    }

    #[test]
    fn test_inverse() {
        let f_to_c = Conversion::affine(5.0 / 9.0, -160.0 / 9.0);
        let c_to_f = f_to_c.inverse();
        assert_close(c_to_f.forward(100.0), 212.0);

        let custom = Conversion::custom(|x| x + 1.0, |y| y - 1.0);
        assert_close(custom.inverse().forward(5.0), 4.0);
    }

    #[test]
    fn test_slope() {
        assert_eq!(Conversion::linear(1e3).slope(), 1e3);
        assert_eq!(Conversion::affine(1.0, 273.15).slope(), 1.0);
        assert_close(Conversion::custom(|x| 3.0 * x + 2.0, |y| (y - 2.0) / 3.0).slope(), 3.0);
    }
}
