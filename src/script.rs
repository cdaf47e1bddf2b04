//! Main module for wirescript library functionality
//!
//! Pipeline
//!
//!     source text
//!         -> lexing      (logos tokens with byte spans)
//!         -> parsing     (chumsky grammar, one production per fragment strategy)
//!         -> assembling  (lines grouped into streams, ordering rules enforced)
//!         -> ast         (immutable nodes + a RegionInfo side tree)
//!
//!     The AST is then consumed through visitors (executor, diagnostics, formats),
//!     compared structurally, or rebuilt from code with the builders.

pub mod ast;
pub mod binding;
pub mod building;
pub mod config;
pub mod diagnostics;
pub mod formats;
pub mod lexing;
pub mod parsing;
