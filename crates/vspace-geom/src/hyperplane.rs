use vspace_core::Point;

/// Affine hyperplane `{x : <weights, x> + bias = 0}`.
///
/// When used as a separator, the point being separated has a positive margin
/// and every point of the body a non-positive one.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperplane {
    bias: f64,
    weights: Point,
}

impl Hyperplane {
    /// Creates a hyperplane from its bias and weight vector.
    pub fn new(bias: f64, weights: Point) -> Self {
        Self { bias, weights }
    }

    /// Hyperplane through the origin.
    pub fn centered(weights: Point) -> Self {
        Self::new(0.0, weights)
    }

    /// Bias term.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Weight vector.
    pub fn weights(&self) -> &Point {
        &self.weights
    }

    /// Dimension of the ambient space.
    pub fn dim(&self) -> usize {
        self.weights.len()
    }

    /// Signed margin `<weights, x> + bias`.
    pub fn margin(&self, point: &Point) -> f64 {
        self.weights.dot(point) + self.bias
    }
}
