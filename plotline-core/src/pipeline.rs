//! The debounced, cancellable evaluation pipeline.
//!
//! One pass takes a document snapshot through parse → bind → dependency
//! order → sample, then writes diagnostics and render caches back into the
//! snapshot and returns them. Asynchronous requests debounce rapid edits:
//! each request cancels the one before it and bumps a generation counter,
//! and a finished pass is delivered only while its generation is still the
//! latest, so the callback fires at most once per request and never for a
//! superseded one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::binder::Binder;
use crate::bound::BoundFunction;
use crate::diagnostics::{Diagnostic, DiagnosticBag, DiagnosticCategory};
use crate::document::{Document, FunctionRenderCache, PlotMode};
use crate::error::{CancellationToken, Cancelled};
use crate::eval::{evaluate, DependencyValues};
use crate::parser::Parser;
use crate::resolver::evaluation_order;
use crate::sampler::{EvaluationContext, ExpressionSampler, ManagedSampler};
use crate::surface::{sample_surface, SurfaceMesh};
use crate::symbols::FunctionId;

/// Default delay between an edit and the pass it triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Everything one finished pass produced.
#[derive(Debug, Clone, Default)]
pub struct EvaluationResult {
    pub render_caches: HashMap<FunctionId, FunctionRenderCache>,
    pub diagnostics: HashMap<FunctionId, Vec<Diagnostic>>,
    /// Mesh for the surface target, 3D mode only.
    pub surface: Option<SurfaceMesh>,
}

/// Debounces, schedules, and cancels evaluation passes.
pub struct EvaluationPipeline {
    sampler: Arc<dyn ExpressionSampler + Send + Sync>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    active: Mutex<Option<CancellationToken>>,
}

impl Default for EvaluationPipeline {
    fn default() -> Self {
        Self::new(Arc::new(ManagedSampler), DEFAULT_DEBOUNCE)
    }
}

impl EvaluationPipeline {
    #[must_use]
    pub fn new(sampler: Arc<dyn ExpressionSampler + Send + Sync>, debounce: Duration) -> Self {
        Self {
            sampler,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
        }
    }

    /// Run one pass synchronously on `document`, writing diagnostics and
    /// render caches back into it.
    pub fn evaluate(
        &self,
        document: &mut Document,
        cancel: &CancellationToken,
    ) -> Result<EvaluationResult, Cancelled> {
        run_pass(self.sampler.as_ref(), document, cancel)
    }

    /// Schedule a pass over a document snapshot.
    ///
    /// The request first sleeps for the debounce interval; a newer request
    /// arriving in the meantime cancels it before any work happens. The
    /// callback runs at most once, and only if no newer request exists when
    /// the pass finishes.
    pub fn request_evaluation(
        &self,
        mut document: Document,
        on_completed: impl FnOnce(EvaluationResult) + Send + 'static,
    ) -> JoinHandle<()> {
        let token = CancellationToken::new();
        {
            let mut active = self
                .active
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(previous) = active.replace(token.clone()) {
                previous.cancel();
            }
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.generation);
        let sampler = Arc::clone(&self.sampler);
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if token.is_cancelled() {
                trace!(generation, "request superseded during debounce");
                return;
            }

            let pass_token = token.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                run_pass(sampler.as_ref(), &mut document, &pass_token)
            })
            .await;

            let Ok(Ok(result)) = outcome else {
                trace!(generation, "pass cancelled");
                return;
            };
            if latest.load(Ordering::SeqCst) == generation && !token.is_cancelled() {
                on_completed(result);
            } else {
                trace!(generation, "stale result dropped");
            }
        })
    }
}

// ---------------------------------------------------------------------------
// The pass itself
// ---------------------------------------------------------------------------

fn run_pass(
    sampler: &(dyn ExpressionSampler + Send + Sync),
    document: &mut Document,
    cancel: &CancellationToken,
) -> Result<EvaluationResult, Cancelled> {
    debug!(functions = document.functions.len(), "evaluation pass");

    let pairs: Vec<(String, FunctionId)> = document
        .functions
        .iter()
        .map(|f| (f.name.clone(), f.id))
        .collect();
    document
        .symbols
        .restore(pairs.iter().map(|(name, id)| (name.as_str(), *id)));

    let mut bound: HashMap<FunctionId, Option<BoundFunction>> = HashMap::new();
    let mut bags: HashMap<FunctionId, DiagnosticBag> = HashMap::new();

    for i in 0..document.functions.len() {
        let id = document.functions[i].id;
        let mut bag = DiagnosticBag::new();

        let text = document.functions[i].expression.clone();
        if text.trim().is_empty() {
            bag.add(DiagnosticCategory::Parse, "expression is empty");
            bags.insert(id, bag);
            bound.insert(id, None);
            continue;
        }

        let input = Parser::new(&text).parse_expression_input();

        // A changed header name renames the function; the previous name
        // stays live as an alias for the rest of the pass.
        if let Some(new_name) = &input.defined_name {
            if !new_name.eq_ignore_ascii_case(&document.functions[i].name) {
                document.functions[i].name = new_name.clone();
                document.symbols.set_name(new_name, id, true);
            }
        }

        if !input.parameters.is_empty() {
            document.functions[i].parameters = input.parameters.clone();
        }
        if document.functions[i].parameters.is_empty() {
            document.functions[i].parameters = vec!["x".to_string()];
        }

        let parameters = document.functions[i].parameters.clone();
        let result = Binder::new(&document.symbols, &parameters).bind(&input.body);
        bag.extend(result.diagnostics);

        let function = &document.functions[i];
        bound.insert(
            id,
            Some(BoundFunction {
                id,
                name: function.name.clone(),
                expression: result.expression,
                x_min: function.x_min,
                x_max: function.x_max,
                style_index: function.style_index,
            }),
        );
        bags.insert(id, bag);
    }

    let ids: Vec<FunctionId> = document.functions.iter().map(|f| f.id).collect();
    let order = evaluation_order(&ids, &bound, &mut bags);

    let mut sampled_values = DependencyValues::new();
    let mut render_caches: HashMap<FunctionId, FunctionRenderCache> = HashMap::new();

    for id in order {
        cancel.check()?;
        let Some(function) = document.function(id) else {
            continue;
        };
        let parameter_count = function.parameters.len();

        if document.plot_mode == PlotMode::TwoD && parameter_count != 1 {
            bags.entry(id).or_default().add(
                DiagnosticCategory::Domain,
                "2d plot mode requires a single parameter (x)",
            );
            continue;
        }
        let Some(Some(bound_fn)) = bound.get(&id) else {
            continue;
        };
        if document.plot_mode == PlotMode::ThreeD && parameter_count != 2 {
            bags.entry(id).or_default().add(
                DiagnosticCategory::Domain,
                "3d plot mode requires two parameters (x, y)",
            );
            continue;
        }

        let context = EvaluationContext {
            viewport: &document.viewport,
            angle_mode: document.angle_mode,
            dependencies: &sampled_values,
        };
        let cache = sampler.sample(bound_fn, &context, cancel)?;

        // Dependents read generic grid values regardless of the sampling
        // strategy, so an offloaded function feeds them the same numbers a
        // managed one would.
        let count = document.viewport.samples.max(2);
        let x0 = document.viewport.x_min();
        let span = document.viewport.x_max() - x0;
        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            let x = x0 + span * (i as f64 / (count - 1) as f64);
            values.push(evaluate(
                &bound_fn.expression,
                x,
                0.0,
                document.angle_mode,
                &sampled_values,
                i,
            ));
        }
        sampled_values.insert(id, values);

        if cache.segments.is_empty() {
            bags.entry(id).or_default().add(
                DiagnosticCategory::Overflow,
                "no drawable points in current viewport",
            );
        }
        render_caches.insert(id, cache);
    }

    let mut surface = None;
    if document.plot_mode == PlotMode::ThreeD {
        if let Some(target) = surface_target(document, &bound) {
            if let Some(Some(bound_fn)) = bound.get(&target) {
                surface = Some(sample_surface(
                    bound_fn,
                    &document.viewport,
                    document.angle_mode,
                    cancel,
                )?);
            }
        }
    }

    let mut diagnostics: HashMap<FunctionId, Vec<Diagnostic>> = HashMap::new();
    for function in &mut document.functions {
        let items = bags.remove(&function.id).unwrap_or_default().into_items();
        function.diagnostics = items.clone();
        function.render_cache = render_caches.get(&function.id).cloned();
        diagnostics.insert(function.id, items);
    }

    Ok(EvaluationResult {
        render_caches,
        diagnostics,
        surface,
    })
}

/// The explicitly selected surface function when it qualifies, otherwise
/// the first two-parameter function of the document.
fn surface_target(
    document: &Document,
    bound: &HashMap<FunctionId, Option<BoundFunction>>,
) -> Option<FunctionId> {
    if let Some(id) = document.selected_surface {
        if let Some(function) = document.function(id) {
            if function.parameters.len() == 2 && bound.contains_key(&id) {
                return Some(id);
            }
        }
    }
    document
        .functions
        .iter()
        .find(|f| f.parameters.len() == 2 && bound.contains_key(&f.id))
        .map(|f| f.id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
