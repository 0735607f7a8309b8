//! Template context structures
//!
//! Bodies are synthesized in Rust and handed to the templates as finished
//! text; the templates only supply the fixed file shells.

use crate::signature::FunctionDescriptor;
use serde::Serialize;

/// Context for `types_header.h.jinja`
#[derive(Debug, Clone, Serialize)]
pub struct TypesHeaderContext {
    /// Hex SHA-256 of the scanned inputs
    pub digest: String,
    /// Extension headers that declared families, first-seen order
    pub extension_includes: Vec<String>,
    /// Stringifier prototypes
    pub declarations: Vec<String>,
}

/// Context for `types_source.c.jinja`
#[derive(Debug, Clone, Serialize)]
pub struct TypesSourceContext {
    pub digest: String,
    /// Stringifier definitions, each ending in a newline
    pub stringifiers: Vec<String>,
}

/// Context for `funcs_source.c.jinja`
#[derive(Debug, Clone, Serialize)]
pub struct FuncsSourceContext {
    pub digest: String,
    pub functions: Vec<FunctionView>,
    /// Wrapper definitions, same order as `functions`
    pub wrappers: Vec<String>,
}

/// Per-entry-point names used by the pointer table, loader and interposer
#[derive(Debug, Clone, Serialize)]
pub struct FunctionView {
    pub name: String,
    /// `typedef ...;` for the function-pointer type
    pub typedef: String,
    pub typedef_name: String,
    /// Cached pointer variable
    pub pointer: String,
    /// Resolved once at load time (otherwise through the extension lookup)
    pub core: bool,
}

impl From<&FunctionDescriptor> for FunctionView {
    fn from(func: &FunctionDescriptor) -> Self {
        Self {
            name: func.name.clone(),
            typedef: func.typedef(),
            typedef_name: func.typedef_name(),
            pointer: func.pointer_name(),
            core: func.is_core_api(),
        }
    }
}
