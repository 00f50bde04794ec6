//! Sampling strategies that turn a bound function into drawable segments.
//!
//! A sampler walks an even x grid across the viewport, evaluates the
//! expression at every grid point, and splits the output into polyline
//! segments wherever the value is NaN, infinite, or the x falls outside the
//! function's own domain clamp. The raw value at every grid index is kept
//! regardless, so later functions in the pass can call this one by index.

use kurbo::Point;
use tracing::debug;

use crate::bound::BoundFunction;
use crate::document::{AngleMode, FunctionRenderCache, Viewport};
use crate::error::{CancellationToken, Cancelled};
use crate::eval::{evaluate, DependencyValues};

/// Everything a sampler needs besides the function itself.
pub struct EvaluationContext<'a> {
    pub viewport: &'a Viewport,
    pub angle_mode: AngleMode,
    /// Value arrays of functions already sampled this pass.
    pub dependencies: &'a DependencyValues,
}

/// A sampling strategy. Implementations must check `cancel` at least once
/// per grid point.
pub trait ExpressionSampler {
    fn sample(
        &self,
        function: &BoundFunction,
        context: &EvaluationContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<FunctionRenderCache, Cancelled>;
}

/// The default pure-Rust sampler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedSampler;

impl ExpressionSampler for ManagedSampler {
    fn sample(
        &self,
        function: &BoundFunction,
        context: &EvaluationContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<FunctionRenderCache, Cancelled> {
        let viewport = context.viewport;
        let count = viewport.samples.max(2);
        let x0 = viewport.x_min();
        let span = viewport.x_max() - x0;

        let mut builder = SegmentBuilder::with_capacity(count);
        for i in 0..count {
            cancel.check()?;
            // Interpolating by ratio keeps the endpoints exact and puts a
            // grid point exactly on zero for a symmetric viewport.
            let x = x0 + span * (i as f64 / (count - 1) as f64);
            if !function.in_domain(x) {
                builder.push_invalid();
                continue;
            }
            let y = evaluate(
                &function.expression,
                x,
                0.0,
                context.angle_mode,
                context.dependencies,
                i,
            );
            builder.push(x, y);
        }

        let cache = builder.finish();
        debug!(
            name = %function.name,
            segments = cache.segments.len(),
            "sampled function"
        );
        Ok(cache)
    }
}

/// Accumulates grid samples into segments, recording every raw value.
///
/// A segment closes on any invalid sample and is kept only when it has at
/// least two points; isolated valid points are dropped.
pub struct SegmentBuilder {
    segments: Vec<Vec<Point>>,
    current: Vec<Point>,
    values: Vec<f64>,
}

impl SegmentBuilder {
    #[must_use]
    pub fn with_capacity(count: usize) -> Self {
        Self {
            segments: Vec::new(),
            current: Vec::new(),
            values: Vec::with_capacity(count),
        }
    }

    /// Record a sample; splits the polyline when `y` is not finite.
    pub fn push(&mut self, x: f64, y: f64) {
        self.values.push(y);
        if y.is_finite() {
            self.current.push(Point::new(x, y));
        } else {
            self.flush();
        }
    }

    /// Record a grid point outside the drawable domain.
    pub fn push_invalid(&mut self) {
        self.values.push(f64::NAN);
        self.flush();
    }

    fn flush(&mut self) {
        if self.current.len() >= 2 {
            self.segments.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }

    #[must_use]
    pub fn finish(mut self) -> FunctionRenderCache {
        self.flush();
        FunctionRenderCache {
            segments: self.segments,
            values: self.values,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Binder;
    use crate::parser::Parser;
    use crate::symbols::{FunctionId, SymbolTable};

    fn bind(text: &str) -> BoundFunction {
        let input = Parser::new(text).parse_expression_input();
        let symbols = SymbolTable::new();
        let params = vec!["x".to_string()];
        let bound = Binder::new(&symbols, &params).bind(&input.body);
        assert!(bound.diagnostics.is_empty());
        BoundFunction {
            id: FunctionId::new(),
            name: "f".to_string(),
            expression: bound.expression,
            x_min: None,
            x_max: None,
            style_index: 0,
        }
    }

    fn sample(function: &BoundFunction, viewport: &Viewport) -> FunctionRenderCache {
        let deps = DependencyValues::new();
        let context = EvaluationContext {
            viewport,
            angle_mode: AngleMode::Radians,
            dependencies: &deps,
        };
        ManagedSampler
            .sample(function, &context, &CancellationToken::new())
            .unwrap()
    }

    fn viewport(samples: usize) -> Viewport {
        Viewport {
            samples,
            ..Viewport::default()
        }
    }

    // -- grid --

    #[test]
    fn grid_is_even_with_exact_endpoints() {
        let function = bind("x");
        let vp = viewport(11);
        let cache = sample(&function, &vp);
        assert_eq!(cache.values.len(), 11);
        assert_eq!(cache.segments.len(), 1);
        let segment = &cache.segments[0];
        assert_eq!(segment.first().map(|p| p.x), Some(vp.x_min()));
        assert!((segment.last().map_or(f64::NAN, |p| p.x) - vp.x_max()).abs() < 1e-12);
        let step = segment[1].x - segment[0].x;
        for pair in segment.windows(2) {
            assert!((pair[1].x - pair[0].x - step).abs() < 1e-12);
        }
    }

    #[test]
    fn values_follow_grid_indices() {
        let function = bind("x * 2");
        let vp = viewport(5);
        let cache = sample(&function, &vp);
        assert_eq!(cache.values[0], vp.x_min() * 2.0);
        assert_eq!(cache.values[4], vp.x_max() * 2.0);
    }

    // -- segment splitting --

    #[test]
    fn sqrt_splits_at_domain_boundary() {
        // sqrt(x) is NaN for x < 0: everything left of zero is dropped and
        // exactly one segment with at least two points remains.
        let function = bind("sqrt(x)");
        let cache = sample(&function, &viewport(101));
        assert_eq!(cache.segments.len(), 1);
        assert!(cache.segments[0].len() >= 2);
        assert!(cache.segments[0].iter().all(|p| p.x >= 0.0));
        assert!(cache.values[..50].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn pole_splits_into_two_segments() {
        let function = bind("1 / x");
        // Odd count puts a grid point exactly on x = 0.
        let cache = sample(&function, &viewport(101));
        assert_eq!(cache.segments.len(), 2);
        assert!(cache.segments.iter().all(|s| s.len() >= 2));
        assert!(cache.values[50].is_nan());
    }

    #[test]
    fn isolated_point_is_dropped() {
        // Valid only at the single grid point x = 0.
        let function = bind("x == 0 ? 0 : sqrt(0 - 1)");
        let cache = sample(&function, &viewport(101));
        assert!(cache.segments.is_empty());
        assert_eq!(cache.values.len(), 101);
    }

    #[test]
    fn fully_invalid_function_yields_values_but_no_segments() {
        let function = bind("sqrt(0 - 1)");
        let cache = sample(&function, &viewport(21));
        assert!(cache.segments.is_empty());
        assert_eq!(cache.values.len(), 21);
        assert!(cache.values.iter().all(|v| v.is_nan()));
    }

    // -- domain clamp --

    #[test]
    fn domain_clamp_limits_segment_extent() {
        let mut function = bind("x");
        function.x_min = Some(-1.0);
        function.x_max = Some(1.0);
        let cache = sample(&function, &viewport(201));
        assert_eq!(cache.segments.len(), 1);
        for point in &cache.segments[0] {
            assert!(point.x >= -1.0 && point.x <= 1.0);
        }
    }

    // -- cancellation --

    #[test]
    fn cancelled_token_aborts_sampling() {
        let function = bind("x");
        let token = CancellationToken::new();
        token.cancel();
        let deps = DependencyValues::new();
        let vp = viewport(10);
        let context = EvaluationContext {
            viewport: &vp,
            angle_mode: AngleMode::Radians,
            dependencies: &deps,
        };
        assert!(ManagedSampler.sample(&function, &context, &token).is_err());
    }
}
