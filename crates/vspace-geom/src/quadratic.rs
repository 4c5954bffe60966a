use vspace_core::{ErrorInfo, VsError};

/// Solves `a t^2 + 2 b t + c = 0`, returning the two real roots in increasing order.
///
/// Only the two-distinct-roots case is accepted: a tangent or missing
/// intersection means the geodesic does not cross the body.
pub fn solve_second_degree(a: f64, b: f64, c: f64) -> Result<(f64, f64), VsError> {
    let delta = b * b - a * c;
    if delta <= 0.0 || a == 0.0 {
        return Err(VsError::DegenerateGeometry(
            ErrorInfo::new(
                "no-distinct-roots",
                "second degree equation has fewer than two real roots",
            )
            .with_context("a", a)
            .with_context("b", b)
            .with_context("c", c)
            .with_context("delta", delta),
        ));
    }
    let sq_delta = delta.sqrt();
    let first = (-b - sq_delta) / a;
    let second = (-b + sq_delta) / a;
    Ok((first.min(second), first.max(second)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_roots_sorted() {
        // t^2 - 1 = 0
        assert_eq!(solve_second_degree(1.0, 0.0, -1.0).unwrap(), (-1.0, 1.0));
        // -t^2 + 4t - 3 = 0 -> 1, 3
        let (lo, hi) = solve_second_degree(-1.0, 2.0, -3.0).unwrap();
        assert!((lo - 1.0).abs() < 1e-12 && (hi - 3.0).abs() < 1e-12);
    }

    #[test]
    fn tangent_and_missing_roots_fail() {
        assert!(solve_second_degree(1.0, 1.0, 1.0).is_err());
        assert!(solve_second_degree(1.0, 0.0, 1.0).is_err());
        assert!(solve_second_degree(0.0, 1.0, 1.0).is_err());
    }
}
