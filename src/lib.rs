// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # clint-codegen
//!
//! Generates the clint OpenCL interception layer from the OpenCL headers.
//!
//! The headers are scanned textually. Every exported prototype becomes an
//! instrumented wrapper that traces its arguments, validates the handles it
//! is given and registers the handles it produces. Every documented group of
//! constants becomes a value-to-text function used by those traces.
//!
//! ## Outputs
//!
//! - `clint_opencl_types.h`: stringifier prototypes
//! - `clint_opencl_types.c`: stringifier definitions
//! - `clint_opencl_funcs.c`: pointer table, loader, wrappers, interpose table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clint_codegen::{generate, GeneratorConfig};
//! use std::path::Path;
//!
//! let run = generate(
//!     &["cl.h", "cl_ext.h", "cl_gl.h"],
//!     Some(Path::new("/usr/include")),
//!     GeneratorConfig::default(),
//! )?;
//! run.artifacts.write_to_dir(Path::new("build/generated"))?;
//! for diagnostic in &run.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! ```

pub mod classify;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod format;
pub mod generate;
pub mod policy;
pub mod render;
pub mod scan;
pub mod signature;
pub mod templates;

pub use classify::{FamilyKind, KnowledgeBuilder, TypeFamily, TypeKnowledge};
pub use config::GeneratorConfig;
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Error, Result};
pub use generate::{generate, Generation, Generator};
pub use render::{render_artifacts, Artifacts, ARTIFACT_NAMES};
pub use scan::{lex_line, HeaderLine, HeaderSource, Literal, PrototypeBlock};
pub use signature::{decompose, Dispatch, FunctionDescriptor, Parameter, ParamKind};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
