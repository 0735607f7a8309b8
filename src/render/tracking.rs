//! Handle validation and registration calls
//!
//! Inputs of a tracked handle type are checked against the runtime's
//! registry; produced handles are registered together with the object they
//! were created from.

use crate::classify::short_name;
use crate::policy::mem_sharing;
use crate::signature::{base_type, FunctionDescriptor, Parameter};

/// Handle types the runtime keeps registries for
pub const TRACKED_KINDS: &[&str] = &[
    "cl_context",
    "cl_command_queue",
    "cl_mem",
    "cl_program",
    "cl_kernel",
    "cl_event",
    "cl_sampler",
    "cl_device_id",
];

/// Parent object candidates for a produced handle, in priority order
const SOURCE_KINDS: &[(&str, &str)] = &[
    ("cl_context", "ClintObjectType_context"),
    ("cl_command_queue", "ClintObjectType_command_queue"),
    ("cl_mem", "ClintObjectType_mem"),
    ("cl_program", "ClintObjectType_program"),
    ("cl_device_id", "ClintObjectType_device"),
];

const NO_SOURCE: [&str; 2] = ["NULL", "ClintObjectType_none"];

pub fn is_tracked(ty: &str) -> bool {
    TRACKED_KINDS.contains(&ty)
}

/// Pointer to a tracked handle, e.g. `const cl_event *`
fn tracked_pointee(p: &Parameter) -> Option<&str> {
    if p.is_callback() || !p.ty.ends_with('*') {
        return None;
    }
    let base = base_type(&p.ty);
    is_tracked(base).then_some(base)
}

/// Count parameter directly preceding an array, e.g. `cl_uint num_events`
fn array_count(func: &FunctionDescriptor, index: usize) -> Option<&str> {
    let prev = func.params.get(index.checked_sub(1)?)?;
    let counted = (prev.ty == "cl_uint" || prev.ty == "size_t") && prev.name.starts_with("num_");
    counted.then_some(prev.name.as_str())
}

/// Validation statements for the caller's inputs, in parameter order
pub fn input_checks(func: &FunctionDescriptor) -> Vec<String> {
    let mut checks = Vec::new();
    for (i, p) in func.params.iter().enumerate() {
        if let Some(kind) = tracked_pointee(p) {
            if p.is_const() {
                if let Some(count) = array_count(func, i) {
                    checks.push(format!(
                        "clint_check_input_{}s({}, {});",
                        short_name(kind),
                        count,
                        p.name
                    ));
                }
            }
            continue;
        }
        if p.is_callback() || !is_tracked(&p.ty) {
            continue;
        }
        let kind = short_name(&p.ty);
        if func.name.starts_with("clRetain") {
            checks.push(format!("clint_retain_{}({});", kind, p.name));
        } else if func.name.starts_with("clRelease") {
            checks.push(format!("clint_release_{}({});", kind, p.name));
        } else if p.ty != "cl_device_id" {
            // only sub-devices are tracked, and only retain/release see them
            checks.push(format!("clint_check_input_{}({});", kind, p.name));
        }
    }
    checks
}

/// Trailing arguments of `clint_check_output_<kind>` for a produced
/// handle of type `kind`, or `None` when such handles are not registered
fn source_args(func: &FunctionDescriptor, kind: &str) -> Option<Vec<String>> {
    let mut args: Vec<String> = SOURCE_KINDS
        .iter()
        .find_map(|(ty, object_type)| {
            func.first_param_of(ty)
                .map(|p| vec![p.name.clone(), object_type.to_string()])
        })
        .unwrap_or_else(|| NO_SOURCE.iter().map(|s| s.to_string()).collect());

    match kind {
        "cl_context" => args = NO_SOURCE.iter().map(|s| s.to_string()).collect(),
        "cl_device_id" => {
            if func.name != "clCreateSubDevices" {
                return None;
            }
            args = NO_SOURCE.iter().map(|s| s.to_string()).collect();
        }
        "cl_command_queue" if func.name == "clCreateContextAndCommandQueueAPPLE" => {
            let context = func.params.len().checked_sub(2).and_then(|i| func.params.get(i))?;
            args = vec![format!("*{}", context.name), "ClintObjectType_context".into()];
        }
        "cl_mem" => {
            let sharing = if func.name.starts_with("clCreateFrom") {
                mem_sharing(&func.name)
            } else {
                "ClintObjectSharing_none"
            };
            let flags = func
                .last_param_of("cl_mem_flags")
                .map_or("0", |p| p.name.as_str());
            let format = func
                .last_param_of("const cl_image_format *")
                .map_or("NULL", |p| p.name.as_str());
            args.push(flags.to_string());
            args.push(sharing.to_string());
            args.push(format.to_string());
        }
        _ => {}
    }
    Some(args)
}

/// Registration statements for produced handles, without the success guard
pub fn output_checks(func: &FunctionDescriptor) -> Vec<String> {
    let mut checks = Vec::new();
    for (i, p) in func.params.iter().enumerate() {
        let Some(kind) = tracked_pointee(p) else {
            continue;
        };
        if p.is_const() {
            continue;
        }
        let Some(source) = source_args(func, kind) else {
            continue;
        };
        let source = source.join(", ");
        match array_count(func, i) {
            Some(count) => checks.push(format!(
                "clint_check_output_{}s({}, {}, {});",
                short_name(kind),
                count,
                p.name,
                source
            )),
            None => {
                checks.push(format!("if ({})", p.name));
                checks.push(format!(
                    "\tclint_check_output_{}(*{}, {});",
                    short_name(kind),
                    p.name,
                    source
                ));
            }
        }
    }

    if is_tracked(&func.return_type) {
        if let Some(source) = source_args(func, &func.return_type) {
            checks.push(format!(
                "clint_check_output_{}(retval, {});",
                short_name(&func.return_type),
                source.join(", ")
            ));
        }
    }
    checks
}
