use common::Xy;

/// The triangle of chromaticities a family of lamps can reproduce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gamut {
    pub red: Xy,
    pub green: Xy,
    pub blue: Xy,
}

/// Gamut of current generation colour bulbs.
pub const GAMUT_C: Gamut = Gamut {
    red: Xy::new(0.692, 0.308),
    green: Xy::new(0.17, 0.7),
    blue: Xy::new(0.153, 0.048),
};

impl Gamut {
    pub fn contains(&self, p: Xy) -> bool {
        let v1 = sub(self.green, self.red);
        let v2 = sub(self.blue, self.red);
        let q = sub(p, self.red);

        let denom = cross(v1, v2);
        let s = cross(q, v2) / denom;
        let t = cross(v1, q) / denom;

        s >= 0.0 && t >= 0.0 && s + t <= 1.0
    }

    /// Returns `p` if the lamps can show it, otherwise the nearest point on
    /// the triangle's edges.
    pub fn clamp(&self, p: Xy) -> Xy {
        if self.contains(p) {
            return p;
        }

        [
            closest_on_segment(self.red, self.green, p),
            closest_on_segment(self.blue, self.red, p),
            closest_on_segment(self.green, self.blue, p),
        ]
        .into_iter()
        .min_by(|a, b| distance(*a, p).total_cmp(&distance(*b, p)))
        .unwrap_or(p)
    }
}

fn sub(a: Xy, b: Xy) -> Xy {
    Xy::new(a.x - b.x, a.y - b.y)
}

fn cross(a: Xy, b: Xy) -> f64 {
    a.x * b.y - a.y * b.x
}

fn distance(a: Xy, b: Xy) -> f64 {
    let d = sub(a, b);
    (d.x * d.x + d.y * d.y).sqrt()
}

fn closest_on_segment(a: Xy, b: Xy, p: Xy) -> Xy {
    let ap = sub(p, a);
    let ab = sub(b, a);
    let t = ((ap.x * ab.x + ap.y * ab.y) / (ab.x * ab.x + ab.y * ab.y)).clamp(0.0, 1.0);

    Xy::new(a.x + ab.x * t, a.y + ab.y * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_are_inside() {
        assert!(GAMUT_C.contains(GAMUT_C.red));
        assert!(GAMUT_C.contains(GAMUT_C.green));
        assert!(GAMUT_C.contains(GAMUT_C.blue));
    }

    #[test]
    fn test_inside_point_is_untouched() {
        let p = Xy::new(0.35, 0.35);
        assert_eq!(GAMUT_C.clamp(p), p);
    }

    #[test]
    fn test_outside_point_lands_on_edge() {
        // Below the blue-red edge
        let clamped = GAMUT_C.clamp(Xy::new(0.4, 0.1));
        assert!(clamped.y > 0.1);
        assert!(GAMUT_C.contains(Xy::new(clamped.x - 1e-6, clamped.y + 1e-6)));
    }
}
