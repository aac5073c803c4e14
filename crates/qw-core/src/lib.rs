pub mod emitter;
pub mod expr;
pub mod format;
pub mod id;
pub mod layout;
pub mod lint;
pub mod model;
pub mod parser;

pub use emitter::{DEFAULT_ANGLE, emit_program};
pub use format::{Formatted, format_program};
pub use id::OpId;
pub use layout::{LayoutSnapshot, NewOperation, TrackGeometry, resolve_layout};
pub use lint::{LintDiagnostic, LintSeverity, lint_circuit, lint_program};
pub use model::*;
pub use parser::{ParseDiagnostic, ParsedProgram, SkipReason, parse_program, parse_program_with};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
