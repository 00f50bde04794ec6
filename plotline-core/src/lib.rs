//! Function-graphing engine: expression compilation, dependency-ordered
//! evaluation, and plot sampling.

pub mod binder;
pub mod bound;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod eval;
pub mod expreal;
pub mod lexer;
pub mod normalize;
pub mod offload;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod sampler;
pub mod surface;
pub mod symbols;
pub mod syntax;
pub mod token;
