/*!

Junction scoring strategies.

A junction between two intervals is scored as the sum of an
[`ExonPairScore`] of the two interval scores and an
[`IntronLengthScore`] of the gap between them. The default curves are
quadratic fits; any `Fn(i32) -> f64` can stand in for either.

*/

/// Scores a junction by the summed (scaled) scores of the two
/// intervals it joins.
pub trait ExonPairScore: Send + Sync {
    fn score(&self, summed: i32) -> f64;
}

/// Scores a junction by the length of the intron it spans.
pub trait IntronLengthScore: Send + Sync {
    fn score(&self, length: i32) -> f64;
}

impl<F> ExonPairScore for F
where
    F: Fn(i32) -> f64 + Send + Sync,
{
    #[inline]
    fn score(&self, summed: i32) -> f64 {
        self(summed)
    }
}

impl<F> IntronLengthScore for F
where
    F: Fn(i32) -> f64 + Send + Sync,
{
    #[inline]
    fn score(&self, length: i32) -> f64 {
        self(length)
    }
}

/// `a * x^2 + b * x + c`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadratic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Quadratic {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Quadratic { a, b, c }
    }

    /// The fitted intron length curve.
    pub fn intron_length() -> Self {
        Quadratic::new(9e-9, -0.0004, 1.3198)
    }

    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        (self.a * x + self.b) * x + self.c
    }
}

impl Default for Quadratic {
    fn default() -> Self {
        Quadratic::intron_length()
    }
}

impl IntronLengthScore for Quadratic {
    #[inline]
    fn score(&self, length: i32) -> f64 {
        self.eval(length as f64)
    }
}

/// A curve made of quadratic pieces. Each piece applies up to and
/// including its breakpoint; past the last breakpoint the score is
/// the constant `beyond`.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseQuadratic {
    pieces: Vec<(i32, Quadratic)>,
    beyond: f64,
}

impl PiecewiseQuadratic {
    /// Breakpoints must be ascending.
    pub fn new(pieces: Vec<(i32, Quadratic)>, beyond: f64) -> Self {
        debug_assert!(pieces.windows(2).all(|w| w[0].0 < w[1].0));
        PiecewiseQuadratic { pieces, beyond }
    }

    /// The fitted exon pair curve.
    pub fn exon_pair() -> Self {
        PiecewiseQuadratic::new(
            vec![
                (700, Quadratic::new(-8e-6, 0.0058, -0.5825)),
                (1300, Quadratic::new(-4e-6, 0.0079, -3.4403)),
            ],
            0.0,
        )
    }

    pub fn eval(&self, x: i32) -> f64 {
        self.pieces
            .iter()
            .find(|(limit, _)| x <= *limit)
            .map(|(_, curve)| curve.eval(x as f64))
            .unwrap_or(self.beyond)
    }
}

impl Default for PiecewiseQuadratic {
    fn default() -> Self {
        PiecewiseQuadratic::exon_pair()
    }
}

impl ExonPairScore for PiecewiseQuadratic {
    #[inline]
    fn score(&self, summed: i32) -> f64 {
        self.eval(summed)
    }
}
