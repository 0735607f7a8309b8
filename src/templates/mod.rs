//! Template-based artifact shells
//!
//! Uses MiniJinja for the fixed parts of the three generated files.
//! Templates are embedded by default, with optional override via the
//! `template_dir` config setting: a file with the same name in that
//! directory replaces the embedded one.

pub mod context;

use crate::error::Result;
use minijinja::{AutoEscape, Environment, ErrorKind};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use context::{FuncsSourceContext, FunctionView, TypesHeaderContext, TypesSourceContext};

// Embedded templates (compiled into binary)
mod embedded {
    pub const BANNER: &str = include_str!("../../templates/artifacts/banner.jinja");
    pub const TYPES_HEADER: &str = include_str!("../../templates/artifacts/types_header.h.jinja");
    pub const TYPES_SOURCE: &str = include_str!("../../templates/artifacts/types_source.c.jinja");
    pub const FUNCS_SOURCE: &str = include_str!("../../templates/artifacts/funcs_source.c.jinja");

    pub fn lookup(name: &str) -> Option<&'static str> {
        match name {
            "banner.jinja" => Some(BANNER),
            "types_header.h.jinja" => Some(TYPES_HEADER),
            "types_source.c.jinja" => Some(TYPES_SOURCE),
            "funcs_source.c.jinja" => Some(FUNCS_SOURCE),
            _ => None,
        }
    }
}

pub const TYPES_HEADER_TEMPLATE: &str = "types_header.h.jinja";
pub const TYPES_SOURCE_TEMPLATE: &str = "types_source.c.jinja";
pub const FUNCS_SOURCE_TEMPLATE: &str = "funcs_source.c.jinja";

/// Template engine singleton
static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

fn base_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    // generated C must never be HTML-escaped
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env
}

/// Initialize the template engine with embedded templates
fn init_engine() -> Environment<'static> {
    let mut env = base_environment();
    env.set_loader(|name| Ok(embedded::lookup(name).map(str::to_string)));
    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Create a template engine where files in `custom_dir` override the
/// embedded templates
pub fn engine_with_override(custom_dir: &Path) -> Environment<'static> {
    let dir: PathBuf = custom_dir.to_path_buf();
    let mut env = base_environment();
    env.set_loader(move |name| {
        let path = dir.join(name);
        if path.is_file() {
            return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("failed to read {}: {}", path.display(), e),
                )
            });
        }
        Ok(embedded::lookup(name).map(str::to_string))
    });
    env
}

/// Render one template with a serializable context
pub fn render<S: Serialize>(env: &Environment<'_>, name: &str, ctx: &S) -> Result<String> {
    let template = env.get_template(name)?;
    Ok(template.render(ctx)?)
}
