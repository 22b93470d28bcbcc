/// A point in `D`-dimensional space. The engine never looks inside a point,
/// so any fixed dimension works; every preset uses the plane.
pub type Point<const D: usize> = [f64; D];

pub type Point2 = Point<2>;

/// Planar affine map `(x, y) -> (a x + b y + c, d x + e y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
    };

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Affine { a, b, c, d, e, f }
    }

    /// Uniform scale and counter-clockwise rotation by `angle` radians,
    /// followed by a translation of `(tx, ty)`.
    pub fn similarity(scale: f64, angle: f64, tx: f64, ty: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Affine {
            a: scale * cos,
            b: -scale * sin,
            c: tx,
            d: scale * sin,
            e: scale * cos,
            f: ty,
        }
    }

    /// Uniform scale toward the origin followed by a translation.
    pub fn scale_translate(scale: f64, tx: f64, ty: f64) -> Self {
        Affine::new(scale, 0.0, tx, 0.0, scale, ty)
    }

    pub fn apply(&self, p: &Point2) -> Point2 {
        let [x, y] = *p;
        [
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        ]
    }
}

impl Default for Affine {
    fn default() -> Self {
        Affine::IDENTITY
    }
}
