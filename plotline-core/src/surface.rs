//! Surface meshing for two-parameter functions.
//!
//! In 3D mode one function is sampled over a square grid spanning the
//! viewport rectangle, producing an indexed triangle mesh. A grid corner is
//! valid only when its z value is finite and within the viewport-derived
//! magnitude limit; a grid cell contributes its two triangles only when all
//! four corners are valid, so a singularity removes exactly the cells that
//! touch it.

use tracing::debug;

use crate::bound::BoundFunction;
use crate::document::{AngleMode, Viewport};
use crate::error::{CancellationToken, Cancelled};
use crate::eval::{evaluate, DependencyValues};

/// Grid resolution along each axis.
pub const GRID_SIZE: usize = 80;

/// A point in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// An indexed triangle mesh. Every three entries of `indices` name one
/// triangle's vertices in `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    pub positions: Vec<Point3>,
    pub indices: Vec<usize>,
}

impl SurfaceMesh {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// The z magnitude above which a corner is treated as off-scale.
#[must_use]
pub fn z_limit(viewport: &Viewport) -> f64 {
    (viewport.scale_y * 5.0).max(1.0)
}

/// Sample `function` (two parameters) over the viewport rectangle.
pub fn sample_surface(
    function: &BoundFunction,
    viewport: &Viewport,
    angle_mode: AngleMode,
    cancel: &CancellationToken,
) -> Result<SurfaceMesh, Cancelled> {
    sample_surface_with_grid(function, viewport, angle_mode, cancel, GRID_SIZE)
}

pub fn sample_surface_with_grid(
    function: &BoundFunction,
    viewport: &Viewport,
    angle_mode: AngleMode,
    cancel: &CancellationToken,
    grid_size: usize,
) -> Result<SurfaceMesh, Cancelled> {
    let grid_size = grid_size.max(2);
    let x0 = viewport.x_min();
    let y0 = viewport.y_min();
    let x_span = viewport.x_max() - x0;
    let y_span = viewport.y_max() - y0;
    let limit = z_limit(viewport);
    // Surfaces never call other functions by sample index.
    let deps = DependencyValues::new();

    let mut positions = vec![Point3::default(); grid_size * grid_size];
    let mut valid = vec![false; grid_size * grid_size];
    let at = |ix: usize, iy: usize| ix * grid_size + iy;

    for ix in 0..grid_size {
        cancel.check()?;
        let x = x0 + x_span * (ix as f64 / (grid_size - 1) as f64);
        for iy in 0..grid_size {
            let y = y0 + y_span * (iy as f64 / (grid_size - 1) as f64);
            let z = evaluate(&function.expression, x, y, angle_mode, &deps, 0);
            if z.is_nan() || z.is_infinite() || z.abs() > limit {
                continue;
            }
            positions[at(ix, iy)] = Point3::new(x, y, z);
            valid[at(ix, iy)] = true;
        }
    }

    let mut mesh = SurfaceMesh::default();
    for ix in 0..grid_size - 1 {
        cancel.check()?;
        for iy in 0..grid_size - 1 {
            if !valid[at(ix, iy)]
                || !valid[at(ix + 1, iy)]
                || !valid[at(ix, iy + 1)]
                || !valid[at(ix + 1, iy + 1)]
            {
                continue;
            }

            let base = mesh.positions.len();
            mesh.positions.push(positions[at(ix, iy)]);
            mesh.positions.push(positions[at(ix + 1, iy)]);
            mesh.positions.push(positions[at(ix + 1, iy + 1)]);
            mesh.positions.push(positions[at(ix, iy + 1)]);

            mesh.indices.extend([base, base + 1, base + 2]);
            mesh.indices.extend([base, base + 2, base + 3]);
        }
    }

    debug!(
        name = %function.name,
        triangles = mesh.triangle_count(),
        "sampled surface"
    );
    Ok(mesh)
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

    fn bind_two_param(text: &str) -> BoundFunction {
        let input = Parser::new(text).parse_expression_input();
        let symbols = SymbolTable::new();
        let params = vec!["x".to_string(), "y".to_string()];
        let bound = Binder::new(&symbols, &params).bind(&input.body);
        assert!(bound.diagnostics.is_empty());
        BoundFunction {
            id: FunctionId::new(),
            name: "s".to_string(),
            expression: bound.expression,
            x_min: None,
            x_max: None,
            style_index: 0,
        }
    }

    fn grid_sample(text: &str, grid: usize) -> SurfaceMesh {
        bind_and_sample(text, &Viewport::default(), grid)
    }

    fn bind_and_sample(text: &str, viewport: &Viewport, grid: usize) -> SurfaceMesh {
        let function = bind_two_param(text);
        sample_surface_with_grid(
            &function,
            viewport,
            AngleMode::Radians,
            &CancellationToken::new(),
            grid,
        )
        .unwrap()
    }

    // -- full grids --

    #[test]
    fn flat_plane_fills_every_cell() {
        let grid = 10;
        let mesh = grid_sample("0", grid);
        let cells = (grid - 1) * (grid - 1);
        assert_eq!(mesh.triangle_count(), cells * 2);
        assert_eq!(mesh.positions.len(), cells * 4);
        assert!(mesh.positions.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn both_parameters_reach_the_expression() {
        let mesh = grid_sample("x + y", 3);
        // Corner cell vertex at the viewport corner carries z = x + y.
        let corner = mesh
            .positions
            .iter()
            .find(|p| p.x == -10.0 && p.y == -10.0)
            .copied()
            .unwrap();
        assert_eq!(corner.z, -20.0);
    }

    // -- validity --

    #[test]
    fn off_scale_values_drop_only_touching_cells() {
        // 1 / (x^2 + y^2) spikes past the z limit near the origin only;
        // the mesh keeps most cells but not all of them.
        let grid = 21;
        let mesh = grid_sample("1 / (x*x + y*y)", grid);
        let full = (grid - 1) * (grid - 1) * 2;
        assert!(mesh.triangle_count() > 0);
        assert!(mesh.triangle_count() < full);
        let limit = z_limit(&Viewport::default());
        assert!(mesh.positions.iter().all(|p| p.z.abs() <= limit));
    }

    #[test]
    fn fully_invalid_surface_is_empty() {
        let mesh = grid_sample("sqrt(0 - 1)", 8);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.positions.is_empty());
    }

    #[test]
    fn z_limit_tracks_viewport_scale() {
        let mut viewport = Viewport::default();
        viewport.scale_y = 2.0;
        assert_eq!(z_limit(&viewport), 10.0);
        viewport.scale_y = 0.1;
        assert_eq!(z_limit(&viewport), 1.0);
    }

    // -- cancellation --

    #[test]
    fn cancelled_token_aborts_surface_sampling() {
        let function = bind_two_param("x * y");
        let token = CancellationToken::new();
        token.cancel();
        let result = sample_surface_with_grid(
            &function,
            &Viewport::default(),
            AngleMode::Radians,
            &token,
            8,
        );
        assert!(result.is_err());
    }
}
