//! The plotting document: angle/plot modes, viewport, and the function list.
//!
//! A document is plain cloneable data. The pipeline clones it at the start
//! of a pass and works on the snapshot, so edits arriving mid-pass never
//! race with sampling.

use kurbo::Point;

use crate::diagnostics::Diagnostic;
use crate::symbols::{FunctionId, SymbolTable};

/// How trigonometric builtins interpret their argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleMode {
    #[default]
    Radians,
    Degrees,
}

/// Whether the document plots curves or a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotMode {
    #[default]
    TwoD,
    ThreeD,
}

impl PlotMode {
    /// Number of independent parameters a plottable function must have.
    #[must_use]
    pub const fn parameter_count(self) -> usize {
        match self {
            Self::TwoD => 1,
            Self::ThreeD => 2,
        }
    }
}

/// The visible world-coordinate window.
///
/// The x range is `center_x ± scale_x`, the y range `center_y ± scale_y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Sample count along the x axis, endpoints included.
    pub samples: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            scale_x: 10.0,
            scale_y: 10.0,
            samples: 500,
        }
    }
}

impl Viewport {
    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.center_x - self.scale_x
    }

    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.center_x + self.scale_x
    }

    #[must_use]
    pub fn y_min(&self) -> f64 {
        self.center_y - self.scale_y
    }

    #[must_use]
    pub fn y_max(&self) -> f64 {
        self.center_y + self.scale_y
    }
}

/// The drawable output of one sampling pass for one function.
///
/// `values` keeps the raw sample at every grid index, NaN included, so that
/// dependent functions can index it later in the same pass. `segments` holds
/// only the drawable runs; every segment has at least two points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionRenderCache {
    pub segments: Vec<Vec<Point>>,
    pub values: Vec<f64>,
}

/// One user-entered function definition and its per-pass results.
#[derive(Debug, Clone)]
pub struct FunctionObject {
    pub id: FunctionId,
    pub name: String,
    pub expression: String,
    /// Declared parameters; refreshed from the parsed header every pass and
    /// defaulted to `x` when the expression has no header.
    pub parameters: Vec<String>,
    pub visible: bool,
    pub style_index: usize,
    /// Optional clamp on the first parameter's domain.
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    /// Replaced wholesale on every evaluation pass.
    pub diagnostics: Vec<Diagnostic>,
    pub render_cache: Option<FunctionRenderCache>,
}

impl FunctionObject {
    #[must_use]
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            id: FunctionId::new(),
            name: name.into(),
            expression: expression.into(),
            parameters: Vec::new(),
            visible: true,
            style_index: 0,
            x_min: None,
            x_max: None,
            diagnostics: Vec::new(),
            render_cache: None,
        }
    }
}

/// A complete plotting document, cloneable for snapshot-per-pass use.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub angle_mode: AngleMode,
    pub plot_mode: PlotMode,
    pub viewport: Viewport,
    pub functions: Vec<FunctionObject>,
    /// Name resolution state, rebuilt from the function list every pass.
    pub symbols: SymbolTable,
    /// The function whose mesh is built in 3D mode; falls back to the first
    /// bound two-parameter function when unset or unsuitable.
    pub selected_surface: Option<FunctionId>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, function: FunctionObject) -> FunctionId {
        let id = function.id;
        self.functions.push(function);
        id
    }

    pub fn remove_function(&mut self, id: FunctionId) {
        self.functions.retain(|f| f.id != id);
        if self.selected_surface == Some(id) {
            self.selected_surface = None;
        }
    }

    #[must_use]
    pub fn function(&self, id: FunctionId) -> Option<&FunctionObject> {
        self.functions.iter().find(|f| f.id == id)
    }

    pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut FunctionObject> {
        self.functions.iter_mut().find(|f| f.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_ranges_follow_center_and_scale() {
        let viewport = Viewport {
            center_x: 2.0,
            center_y: -1.0,
            scale_x: 3.0,
            scale_y: 4.0,
            samples: 100,
        };
        assert_eq!(viewport.x_min(), -1.0);
        assert_eq!(viewport.x_max(), 5.0);
        assert_eq!(viewport.y_min(), -5.0);
        assert_eq!(viewport.y_max(), 3.0);
    }

    #[test]
    fn remove_function_clears_surface_selection() {
        let mut document = Document::new();
        let id = document.add_function(FunctionObject::new("f", "x"));
        document.selected_surface = Some(id);
        document.remove_function(id);
        assert!(document.functions.is_empty());
        assert!(document.selected_surface.is_none());
    }

    #[test]
    fn plot_mode_parameter_counts() {
        assert_eq!(PlotMode::TwoD.parameter_count(), 1);
        assert_eq!(PlotMode::ThreeD.parameter_count(), 2);
    }
}
