//! Plotline CLI — evaluate a set of function definitions and report the
//! resulting segments, diagnostics, and surface mesh.

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;

use plotline_core::document::{AngleMode, Document, FunctionObject, PlotMode};
use plotline_core::error::CancellationToken;
use plotline_core::normalize::normalize_user_expression;
use plotline_core::offload::OffloadSampler;
use plotline_core::parser::Parser as ExpressionParser;
use plotline_core::pipeline::{EvaluationPipeline, DEFAULT_DEBOUNCE};
use plotline_core::sampler::ManagedSampler;

#[derive(Parser)]
#[command(version, about = "Plotline \u{2014} function graphing engine")]
struct Cli {
    /// Function definitions, e.g. "g(x) = sin(x)" or a bare expression in x
    #[arg(required = true)]
    expressions: Vec<String>,

    /// Plot mode: "2d" (default) or "3d"
    #[arg(long, default_value = "2d", value_parser = parse_plot_mode)]
    mode: PlotMode,

    /// Interpret trigonometric arguments as degrees
    #[arg(long)]
    degrees: bool,

    /// Viewport center on the x axis
    #[arg(long, default_value_t = 0.0)]
    center_x: f64,

    /// Viewport center on the y axis
    #[arg(long, default_value_t = 0.0)]
    center_y: f64,

    /// Viewport half-width
    #[arg(long, default_value_t = 10.0)]
    scale_x: f64,

    /// Viewport half-height
    #[arg(long, default_value_t = 10.0)]
    scale_y: f64,

    /// Sample count along the x axis
    #[arg(long, default_value_t = 500)]
    samples: usize,

    /// Normalize math-editor input (strip \left, rewrite \sqrt{..}, ...)
    #[arg(long)]
    normalize: bool,

    /// Evaluate recognized closed forms through scaled arithmetic
    #[arg(long)]
    offload: bool,

    /// Name of the function to mesh in 3d mode
    #[arg(long, value_name = "NAME")]
    surface: Option<String>,
}

fn parse_plot_mode(s: &str) -> Result<PlotMode, String> {
    match s.to_lowercase().as_str() {
        "2d" => Ok(PlotMode::TwoD),
        "3d" => Ok(PlotMode::ThreeD),
        _ => Err(format!("unknown plot mode \"{s}\": expected \"2d\" or \"3d\"")),
    }
}

fn build_document(cli: &Cli) -> Document {
    let mut document = Document::new();
    document.plot_mode = cli.mode;
    document.angle_mode = if cli.degrees {
        AngleMode::Degrees
    } else {
        AngleMode::Radians
    };
    document.viewport.center_x = cli.center_x;
    document.viewport.center_y = cli.center_y;
    document.viewport.scale_x = cli.scale_x;
    document.viewport.scale_y = cli.scale_y;
    document.viewport.samples = cli.samples.max(2);

    for (i, raw) in cli.expressions.iter().enumerate() {
        let text = if cli.normalize {
            normalize_user_expression(raw)
        } else {
            raw.clone()
        };
        // Name from the header if there is one, so definitions that call
        // each other resolve on the first pass.
        let mut function = FunctionObject::new(format!("f{}", i + 1), text);
        if let Some(name) = ExpressionParser::new(&function.expression)
            .parse_expression_input()
            .defined_name
        {
            function.name = name;
        }
        document.add_function(function);
    }
    document
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut document = build_document(&cli);

    if let Some(name) = &cli.surface {
        let selected = document
            .functions
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.id);
        match selected {
            Some(id) => document.selected_surface = Some(id),
            None => bail!("no function named \"{name}\""),
        }
    }

    let pipeline = if cli.offload {
        EvaluationPipeline::new(Arc::new(OffloadSampler::default()), DEFAULT_DEBOUNCE)
    } else {
        EvaluationPipeline::new(Arc::new(ManagedSampler), DEFAULT_DEBOUNCE)
    };

    let result = pipeline.evaluate(&mut document, &CancellationToken::new())?;
    tracing::debug!(
        functions = document.functions.len(),
        caches = result.render_caches.len(),
        "pass finished"
    );
    report(&document, &result);
    Ok(())
}

fn report(document: &Document, result: &plotline_core::pipeline::EvaluationResult) {
    for function in &document.functions {
        match &function.render_cache {
            Some(cache) => {
                let points: usize = cache.segments.iter().map(Vec::len).sum();
                println!(
                    "{}: {} segment(s), {} point(s)",
                    function.name,
                    cache.segments.len(),
                    points
                );
            }
            None => println!("{}: not plotted", function.name),
        }
        for diagnostic in &function.diagnostics {
            println!("  {diagnostic}");
        }
    }
    if let Some(surface) = &result.surface {
        println!("surface: {} triangle(s)", surface.triangle_count());
    }
}
