//! # whereami scope
//!
//! Answers "where am I in this file" for any line of source text, from
//! indentation alone. No grammar is involved, so unknown languages and broken
//! code are handled the same way as well-formed C or Python.
//!
//! ## Architecture
//!
//! ```text
//! Byte buffer
//!     │
//!     ├──> Line Scanner
//!     │    ├─> tab expansion, CRLF handling
//!     │    └─> comment / directive / label / brace classification
//!     │
//!     ├──> Indentation Stack Resolver
//!     │    └─> outer link per line (nearest less-indented eligible line)
//!     │
//!     └──> per query
//!          ├─> Context Chain Builder (brace skipping, proximity window)
//!          └─> Context Formatter ("..LINE: snippet" tokens)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use whereami_scope::{analyze, ScopeConfig};
//!
//! let source = b"fn main() {\n    if ready {\n        go();\n    }\n}\n";
//! let analysis = analyze(source, &ScopeConfig::unfiltered()).unwrap();
//!
//! assert_eq!(analysis.render_query(3).unwrap(), "..1: fn main(..2: if ready {");
//! ```

mod analysis;
mod chain;
mod config;
mod error;
mod formatter;
mod resolver;
mod scanner;
mod types;

pub use analysis::{
    analyze, Analysis, LineReport, ReportEntry, ELISION_MARKER, MAX_BUFFER_BYTES, MAX_LINES,
};
pub use chain::context_chain;
pub use config::{FormatOptions, ScopeConfig};
pub use error::{Result, ScopeError};
pub use formatter::{format_entry, is_control_flow, render_snippet};
pub use scanner::count_lines;
pub use types::{ChainEntry, ContextChain, LineKind, LineRecord, ScanWarning, TextSpan};
