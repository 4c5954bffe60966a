use nalgebra::DMatrix;
use vspace_core::{ensure_dim, ErrorInfo, Point, VsError};
use vspace_geom::Hyperplane;

/// Ellipsoid `{x : (x - c)^T P^{-1} (x - c) <= 1}` with `P = L D L^T`.
///
/// Both the dense scale `P` (needed for the axis probes) and its `LDL^T`
/// factorization (needed for O(n^2) cuts) are kept in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    center: Point,
    scale: DMatrix<f64>,
    l: DMatrix<f64>,
    d: Point,
}

impl Ellipsoid {
    /// Ball of the given radius centred at the origin.
    pub fn ball(dim: usize, radius: f64) -> Result<Self, VsError> {
        vspace_core::ensure_positive("dim", dim)?;
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(VsError::Configuration(
                ErrorInfo::new("invalid-radius", "ellipsoid radius must be positive and finite")
                    .with_context("radius", radius),
            ));
        }
        let sq_radius = radius * radius;
        Ok(Self {
            center: Point::zeros(dim),
            scale: DMatrix::identity(dim, dim) * sq_radius,
            l: DMatrix::identity(dim, dim),
            d: Point::from_element(dim, sq_radius),
        })
    }

    /// Assembles an ellipsoid from explicit parts.
    pub fn from_parts(
        center: Point,
        scale: DMatrix<f64>,
        l: DMatrix<f64>,
        d: Point,
    ) -> Result<Self, VsError> {
        let dim = center.len();
        vspace_core::ensure_positive("dim", dim)?;
        ensure_dim(dim, d.len())?;
        for matrix in [&scale, &l] {
            ensure_dim(dim, matrix.nrows())?;
            ensure_dim(dim, matrix.ncols())?;
        }
        Ok(Self { center, scale, l, d })
    }

    /// Dimension of the ambient space.
    pub fn dim(&self) -> usize {
        self.center.len()
    }

    /// Centre.
    pub fn center(&self) -> &Point {
        &self.center
    }

    /// Dense scale matrix `P`.
    pub fn scale(&self) -> &DMatrix<f64> {
        &self.scale
    }

    /// Unit lower triangular factor `L`.
    pub fn l(&self) -> &DMatrix<f64> {
        &self.l
    }

    /// Diagonal factor `D`.
    pub fn d(&self) -> &Point {
        &self.d
    }

    /// `L diag(sqrt(D))`, mapping the unit ball onto the (centred) ellipsoid.
    pub fn cholesky_factor(&self) -> DMatrix<f64> {
        let sqrt_d = self.d.map(f64::sqrt);
        let mut factor = self.l.clone();
        for (mut column, &s) in factor.column_iter_mut().zip(sqrt_d.iter()) {
            column *= s;
        }
        factor
    }

    /// Shrinks `self` to the minimum-volume ellipsoid containing its
    /// intersection with the negative half-space `{x : margin(x) <= 0}`.
    ///
    /// Returns whether the ellipsoid changed; shallow cuts leave it untouched.
    pub fn cut(&mut self, hyperplane: &Hyperplane) -> Result<bool, VsError> {
        let n = self.dim();
        ensure_dim(n, hyperplane.dim())?;
        let nf = n as f64;

        let a_hat = self.l.tr_mul(hyperplane.weights());
        let gamma = a_hat.component_mul(&a_hat).dot(&self.d).sqrt();
        if !(gamma > 0.0 && gamma.is_finite()) {
            return Err(VsError::DegenerateGeometry(
                ErrorInfo::new("flat-cut", "cutting hyperplane has no extent along the ellipsoid")
                    .with_context("gamma", gamma),
            ));
        }
        let alpha = hyperplane.margin(&self.center) / gamma;

        if alpha >= 1.0 {
            return Err(VsError::InvalidCut(
                ErrorInfo::new(
                    "positive-side",
                    "ellipsoid lies entirely in the hyperplane's positive half-space",
                )
                .with_context("alpha", alpha),
            ));
        }
        if alpha <= -1.0 / nf {
            return Ok(false);
        }

        let p = self.d.component_mul(&a_hat) / gamma;
        let pg = &self.l * &p;

        let tau = (1.0 + nf * alpha) / (nf + 1.0);
        self.center -= &pg * tau;

        if n == 1 {
            // The kept interval has half-length (1 - alpha) / 2 of the old one.
            let shrink = (1.0 - alpha) * (1.0 - alpha) / 4.0;
            self.d[0] *= shrink;
            self.scale[(0, 0)] *= shrink;
            return Ok(true);
        }

        let sigma = 2.0 * tau / (alpha + 1.0);
        let delta = (1.0 - alpha * alpha) * (nf * nf / (nf * nf - 1.0));

        let beta = self.update_diagonal(&p, sigma, delta);
        self.update_factor(&p, &beta);

        self.scale -= (&pg * pg.transpose()) * sigma;
        self.scale *= delta;

        Ok(true)
    }

    /// Rank-one downdate of `D`, processed from the last index to the first.
    fn update_diagonal(&mut self, p: &Point, sigma: f64, delta: f64) -> Point {
        let n = self.dim();
        let mut beta = Point::zeros(n);
        let mut t_next = 1.0 - sigma;

        for i in (0..n).rev() {
            let p_i = p[i];
            let d_i = self.d[i];

            let t_i = t_next + sigma * p_i * p_i / d_i;
            self.d[i] = d_i * t_next / t_i;
            beta[i] = -sigma * p_i / (d_i * t_next);

            t_next = t_i;
        }

        self.d *= delta;
        beta
    }

    /// Multiplies `L` by the unit lower triangular factor of the downdate.
    fn update_factor(&mut self, p: &Point, beta: &Point) {
        let n = self.dim();
        for i in 1..n {
            let mut v = p[i];
            for j in (0..i).rev() {
                let value = self.l[(i, j)];
                self.l[(i, j)] = value + beta[j] * v;
                v += value * p[j];
            }
        }
    }

    /// Extends the ellipsoid by one dimension without refitting.
    ///
    /// The centre gains a zero coordinate, `D` and the scale gain `dim` on the
    /// new diagonal entry, both are multiplied by `1 + 1/dim`, and `L` gains a
    /// unit diagonal entry.
    pub fn lifted(&self) -> Ellipsoid {
        let cur = self.dim();
        let new = cur + 1;
        let factor = 1.0 + 1.0 / cur as f64;

        let center = vspace_core::resize(&self.center, new);

        let mut scale = self.scale.clone().resize(new, new, 0.0);
        scale[(cur, cur)] = cur as f64;
        scale *= factor;

        let mut l = self.l.clone().resize(new, new, 0.0);
        l[(cur, cur)] = 1.0;

        let mut d = vspace_core::resize(&self.d, new);
        d[cur] = cur as f64;
        d *= factor;

        Ellipsoid { center, scale, l, d }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(values: &[f64]) -> Point {
        Point::from_vec(values.to_vec())
    }

    fn reconstructed(e: &Ellipsoid) -> DMatrix<f64> {
        e.l() * DMatrix::from_diagonal(e.d()) * e.l().transpose()
    }

    #[test]
    fn ball_parts() {
        let e = Ellipsoid::ball(3, 2.0).unwrap();
        assert_eq!(e.center(), &Point::zeros(3));
        assert_eq!(e.scale(), &(DMatrix::identity(3, 3) * 4.0));
        assert_eq!(e.cholesky_factor(), DMatrix::identity(3, 3) * 2.0);
        assert!(Ellipsoid::ball(3, f64::INFINITY).is_err());
        assert!(Ellipsoid::ball(0, 1.0).is_err());
    }

    #[test]
    fn central_cut_of_disk() {
        let mut e = Ellipsoid::ball(2, 1.0).unwrap();
        assert!(e.cut(&Hyperplane::centered(p(&[1.0, 0.0]))).unwrap());
        assert!((e.center() - p(&[-1.0 / 3.0, 0.0])).norm() < 1e-12);
        let expected = DMatrix::from_diagonal(&p(&[4.0 / 9.0, 4.0 / 3.0]));
        assert!((e.scale() - &expected).norm() < 1e-12);
        assert!((reconstructed(&e) - e.scale()).norm() < 1e-12);
    }

    #[test]
    fn factorization_tracks_scale_over_many_cuts() {
        let mut e = Ellipsoid::ball(3, 1.0).unwrap();
        let planes = [
            Hyperplane::new(0.1, p(&[1.0, 0.5, 0.0])),
            Hyperplane::new(0.0, p(&[0.0, -1.0, 1.0])),
            Hyperplane::new(-0.05, p(&[0.3, 0.2, -1.0])),
        ];
        for plane in &planes {
            let before = e.clone();
            let changed = e.cut(plane).unwrap();
            if changed {
                assert_ne!(before, e);
            }
            assert!((reconstructed(&e) - e.scale()).norm() < 1e-10);
            for i in 0..3 {
                assert_eq!(e.l()[(i, i)], 1.0);
                for j in (i + 1)..3 {
                    assert_eq!(e.l()[(i, j)], 0.0);
                }
            }
        }
    }

    #[test]
    fn shallow_cut_leaves_ellipsoid_unchanged() {
        let mut e = Ellipsoid::ball(2, 1.0).unwrap();
        let before = e.clone();
        assert!(!e.cut(&Hyperplane::new(-0.8, p(&[1.0, 0.0]))).unwrap());
        assert_eq!(before, e);
    }

    #[test]
    fn wrong_side_cut_is_rejected() {
        let mut e = Ellipsoid::ball(2, 1.0).unwrap();
        let err = e.cut(&Hyperplane::new(2.0, p(&[1.0, 0.0]))).unwrap_err();
        assert!(matches!(err, VsError::InvalidCut(_)));
    }

    #[test]
    fn one_dimensional_cut_is_exact() {
        let mut e = Ellipsoid::ball(1, 1.0).unwrap();
        // keep x <= 0.5
        assert!(e.cut(&Hyperplane::new(-0.5, p(&[1.0]))).unwrap());
        assert!((e.center()[0] + 0.25).abs() < 1e-12);
        assert!((e.d()[0] - 0.75 * 0.75).abs() < 1e-12);
        // [-1, 0.5] is covered exactly.
        let half = e.d()[0].sqrt();
        assert!((e.center()[0] - half + 1.0).abs() < 1e-12);
        assert!((e.center()[0] + half - 0.5).abs() < 1e-12);
    }

    #[test]
    fn one_dimensional_deep_cut_keeps_remaining_interval() {
        let mut e = Ellipsoid::ball(1, 2.0).unwrap();
        // keep x >= 1, i.e. -x + 1 <= 0
        assert!(e.cut(&Hyperplane::new(1.0, p(&[-1.0]))).unwrap());
        assert!((e.center()[0] - 1.5).abs() < 1e-12);
        assert!((e.d()[0] - 0.25).abs() < 1e-12);
        assert!((e.scale()[(0, 0)] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn lifting_appends_a_scaled_axis() {
        let e = Ellipsoid::from_parts(
            p(&[0.1, -0.2]),
            DMatrix::from_diagonal(&p(&[0.5, 0.25])),
            DMatrix::identity(2, 2),
            p(&[0.5, 0.25]),
        )
        .unwrap();
        let lifted = e.lifted();
        assert_eq!(lifted.center(), &p(&[0.1, -0.2, 0.0]));
        assert_eq!(lifted.d(), &p(&[0.5 * 1.5, 0.25 * 1.5, 2.0 * 1.5]));
        assert_eq!(lifted.l(), &DMatrix::identity(3, 3));
        assert_eq!(lifted.scale()[(2, 2)], 3.0);
        assert_eq!(lifted.scale()[(0, 2)], 0.0);
    }
}
