//! Charts module - render specs and renderers

mod export;
mod renderer;
mod spec;

pub use export::JsonExporter;
pub use renderer::StaticRenderer;
pub use spec::{ChartInput, ChartKind, PreparedChart, RenderError, RenderSpec, Renderer};
