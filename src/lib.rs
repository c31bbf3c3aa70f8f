//! Compiler from the agent-topology diagram dialect to a positioned,
//! renderer-ready node/edge model.
//!
//! The pipeline runs strictly forward: [`parser`] classifies lines and builds
//! the raw graph, [`roles`] resolves group roles and infers the rest,
//! [`skills`] folds skill edges into their source nodes, [`layout`] hands the
//! flattened graph to a layered engine and re-centers ranks, and
//! [`render_model`] projects the result.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod focus;
pub mod ir;
pub mod layout;
pub mod parser;
pub mod render_model;
pub mod roles;
pub mod skills;

pub use config::Config;
pub use layout::{DagreEngine, LayoutEngine};
pub use render_model::RenderGraph;

#[cfg(feature = "cli")]
pub use cli::run;

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub config: Config,
}

/// Compiles `text` with the default configuration and the dagre engine.
pub fn compile(text: &str) -> RenderGraph {
    compile_with_options(text, CompileOptions::default())
}

pub fn compile_with_options(text: &str, options: CompileOptions) -> RenderGraph {
    compile_with_engine(text, &options.config, &DagreEngine)
}

/// Runs the whole pipeline against a caller-supplied layout engine. Never
/// fails: malformed fragments are skipped and empty input yields an empty model.
pub fn compile_with_engine(text: &str, config: &Config, engine: &dyn LayoutEngine) -> RenderGraph {
    let mut graph = parser::parse_diagram(text);
    roles::resolve_group_roles(&mut graph);
    roles::infer_roles(&mut graph);
    skills::aggregate_skills(&mut graph);
    let positioned = layout::compute_layout(&graph, &config.layout, engine);
    render_model::project(&graph, &positioned, config)
}
