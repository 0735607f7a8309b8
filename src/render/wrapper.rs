//! Call-wrapper synthesis
//!
//! Every wrapper follows the same phase order. Phases that do not apply to
//! an entry point are left out.
//!
//! ```text
//! locals, clint_init, pool begin
//! entry trace
//! scope enter
//! input checks, errcode redirect
//! policy pre-hooks
//! dispatch (optionally behind a capability guard)
//! error check
//! policy post-hooks
//! exit trace
//! output registration
//! scope exit, pool end, return
//! ```

use super::tracking;
use super::writer::CodeWriter;
use crate::classify::TypeKnowledge;
use crate::config::GeneratorConfig;
use crate::format::{printf_args, render, render_param, Direction, Rendered};
use crate::policy::{self, Scope};
use crate::signature::{Dispatch, FunctionDescriptor, Parameter};

/// Declared type, or the family a policy prints it through instead
fn display_type<'a>(func: &FunctionDescriptor, p: &'a Parameter, kb: &TypeKnowledge) -> &'a str {
    match policy::type_override(&func.name, &p.ty) {
        Some(family) if kb.family(family).is_some() => family,
        _ => &p.ty,
    }
}

fn render_for(func: &FunctionDescriptor, p: &Parameter, dir: Direction, kb: &TypeKnowledge) -> Rendered {
    if p.is_callback() {
        return render_param(p, &p.name, dir, kb);
    }
    render(display_type(func, p, kb), &p.name, dir, kb)
}

/// Trailing error-code output carrying the status of a non-`cl_int` call
fn status_param(func: &FunctionDescriptor) -> Option<&Parameter> {
    if func.return_type == "cl_int" {
        None
    } else {
        func.errcode_param()
    }
}

/// `clint_log(...)` arguments for the entry trace
pub fn entry_trace(func: &FunctionDescriptor, kb: &TypeKnowledge) -> String {
    let pieces: Vec<Rendered> = func
        .params
        .iter()
        .map(|p| render_for(func, p, Direction::Entry, kb))
        .collect();
    let labels: Vec<String> = func
        .params
        .iter()
        .zip(&pieces)
        .map(|(p, r)| format!("{}={}", p.name, r.conversion))
        .collect();
    let format = format!("{}({})\\n", func.name, labels.join(", "));
    printf_args(&format, &pieces)
}

/// `clint_log(...)` arguments for the exit trace, if one is emitted
pub fn exit_trace(func: &FunctionDescriptor, kb: &TypeKnowledge) -> Option<String> {
    if func.returns_void() && func.params.is_empty() {
        return None;
    }
    let status = status_param(func).map(|p| p.name.as_str());
    let mut format = format!("{} returned", func.name);
    let mut pieces = Vec::new();

    if !func.returns_void() {
        let r = render(&func.return_type, "retval", Direction::Exit, kb);
        format.push(' ');
        format.push_str(&r.conversion);
        pieces.push(r);
    }
    for p in &func.params {
        let output = !p.is_callback()
            && p.ty.ends_with('*')
            && !p.ty.contains("const")
            && p.ty != "void *"
            && Some(p.name.as_str()) != status;
        if !output {
            continue;
        }
        let r = render_for(func, p, Direction::Exit, kb);
        format.push_str(&format!(" {}={}", p.name, r.conversion));
        pieces.push(r);
    }
    format.push_str("\\n");
    Some(printf_args(&format, &pieces))
}

/// Callee expression for the real entry point
fn callee(func: &FunctionDescriptor, config: &GeneratorConfig) -> String {
    match func.dispatch {
        Dispatch::Static => format!("CLINTFUNC({})", func.name),
        Dispatch::Extension => format!(
            "(({})CLINTFUNC({})(\"{}\"))",
            func.typedef_name(),
            config.extension_resolver,
            func.name
        ),
    }
}

fn call_statement(func: &FunctionDescriptor, config: &GeneratorConfig) -> String {
    let call = format!("{}({})", callee(func, config), func.call_args());
    if func.returns_void() {
        format!("{};", call)
    } else {
        format!("retval = {};", call)
    }
}

/// Full wrapper definition, ending with a newline
pub fn render_wrapper(func: &FunctionDescriptor, kb: &TypeKnowledge, config: &GeneratorConfig) -> String {
    let hooks = policy::collect(func);
    let scope = Scope::of(func);
    let status = func.status_expr();
    let errcode = status_param(func);

    let mut w = CodeWriter::new();
    w.line(func.definition_header());
    w.line("{");
    w.indent();

    w.line("ClintAutopool pool;");
    if !func.returns_void() {
        w.line(format!("{} retval;", func.return_type));
    }
    if errcode.is_some() {
        w.line("cl_int errcode_local;");
    }
    w.lines(&hooks.locals);
    w.line("clint_init();");
    w.line("clint_autopool_begin(&pool);");

    w.line("if (clint_get_config(CLINT_TRACE))");
    w.line(format!("\tclint_log({});", entry_trace(func, kb)));

    if let Some(scope) = &scope {
        w.line(scope.enter());
    }
    w.lines(tracking::input_checks(func));
    if let Some(p) = errcode {
        w.line(format!("if ({0} == NULL) {0} = &errcode_local;", p.name));
    }
    w.lines(&hooks.pre);

    match &hooks.guard {
        Some(guard) => {
            w.open(format!("if ({})", guard.condition));
            w.lines(&guard.forced);
            w.reopen("else");
            w.line(call_statement(func, config));
            w.close();
        }
        None => w.line(call_statement(func, config)),
    }

    if let Some(status) = &status {
        w.open(format!("if ({} != CL_SUCCESS)", status));
        w.line("if (clint_get_config(CLINT_ERRORS))");
        w.line(format!(
            "\tclint_log(\"ERROR in {}: %s\\n\", clint_string_error({}));",
            func.name, status
        ));
        w.line("clint_log_abort();");
        w.close();
    }

    w.lines(&hooks.post);

    if let Some(args) = exit_trace(func, kb) {
        w.line("if (clint_get_config(CLINT_TRACE))");
        w.line(format!("\tclint_log({});", args));
    }

    let checks = tracking::output_checks(func);
    if !checks.is_empty() {
        match &status {
            Some(status) => {
                w.open(format!("if ({} == CL_SUCCESS)", status));
                w.lines(&checks);
                w.close();
            }
            None => w.lines(&checks),
        }
    }

    if let Some(scope) = &scope {
        w.line(scope.exit());
    }
    w.line("clint_autopool_end(&pool);");
    if !func.returns_void() {
        w.line("return retval;");
    }

    w.dedent();
    w.line("}");
    w.finish()
}
