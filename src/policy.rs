//! Special-policy table
//!
//! Entry points that need more than tracing and validation are matched by
//! name against [`POLICIES`], in table order. Every matching entry adds its
//! hooks; an entry whose required parameters are missing adds nothing.
//!
//! Hook lines are C statements without the wrapper's base indentation.
//! Nested lines carry their own leading tabs.

use crate::signature::FunctionDescriptor;

/// Replaces the real call with a forced result when `condition` holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchGuard {
    pub condition: String,
    pub forced: Vec<String>,
}

/// Code contributed by the policies to one wrapper
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hooks {
    /// Extra local declarations
    pub locals: Vec<String>,
    /// Statements run before dispatch
    pub pre: Vec<String>,
    pub guard: Option<DispatchGuard>,
    /// Statements run after the error check
    pub post: Vec<String>,
}

impl Hooks {
    fn push_pre(&mut self, lines: &[&str]) {
        self.pre.extend(lines.iter().map(|l| l.to_string()));
    }

    fn push_post(&mut self, lines: &[&str]) {
        self.post.extend(lines.iter().map(|l| l.to_string()));
    }
}

pub struct PolicyEntry {
    pub name: &'static str,
    pub matches: fn(&FunctionDescriptor) -> bool,
    pub apply: fn(&FunctionDescriptor, &mut Hooks),
}

pub const POLICIES: &[PolicyEntry] = &[
    PolicyEntry {
        name: "capability-emulation",
        matches: |f| {
            (f.name.contains("Image") || f.name.contains("Texture"))
                && f.name != "clGetSupportedImageFormats"
        },
        apply: capability_emulation,
    },
    PolicyEntry {
        name: "profile-events",
        matches: |f| f.name.starts_with("clEnqueue") && f.last_param_of("cl_event *").is_some(),
        apply: profile_events,
    },
    PolicyEntry {
        name: "queue-profiling",
        matches: |f| f.name.starts_with("clCreate") && f.name.contains("CommandQueue"),
        apply: queue_profiling,
    },
    PolicyEntry {
        name: "shared-acquire",
        matches: |f| f.name.starts_with("clEnqueueAcquire") || f.name.starts_with("clEnqueueRelease"),
        apply: shared_acquire,
    },
    PolicyEntry {
        name: "build-options",
        matches: |f| f.name == "clBuildProgram" || f.name == "clCompileProgram",
        apply: build_options,
    },
    PolicyEntry {
        name: "program-sources",
        matches: |f| f.name == "clCreateProgramWithSource",
        apply: program_sources,
    },
    PolicyEntry {
        name: "context-devices",
        matches: |f| f.name.starts_with("clCreateContext"),
        apply: context_devices,
    },
    PolicyEntry {
        name: "map-tracking",
        matches: |f| f.name.starts_with("clEnqueueMap") || f.name == "clEnqueueUnmapMemObject",
        apply: map_tracking,
    },
    PolicyEntry {
        name: "info-rewrite",
        matches: |f| f.name == "clGetPlatformInfo" || f.name == "clGetDeviceInfo",
        apply: info_rewrite,
    },
];

/// Parameters printed through a family other than their declared type:
/// (entry point, declared type, family)
const TYPE_OVERRIDES: &[(&str, &str, &str)] = &[("clSetUserEventStatus", "cl_int", "execution_status")];

/// Entry points whose kernel launches are profiled under `CLINT_PROFILE`;
/// every other enqueue uses `CLINT_PROFILE_ALL`
const KERNEL_LAUNCHES: &[&str] = &["clEnqueueNDRangeKernel", "clEnqueueTask", "clEnqueueNativeKernel"];

/// Run every matching policy
pub fn collect(func: &FunctionDescriptor) -> Hooks {
    let mut hooks = Hooks::default();
    for entry in POLICIES.iter().filter(|e| (e.matches)(func)) {
        tracing::trace!(policy = entry.name, function = %func.name, "applying policy");
        (entry.apply)(func, &mut hooks);
    }
    hooks
}

/// Family used to print a parameter of type `ty` in `func`, if overridden
pub fn type_override(func: &str, ty: &str) -> Option<&'static str> {
    TYPE_OVERRIDES
        .iter()
        .find(|(f, t, _)| *f == func && *t == ty)
        .map(|(_, _, family)| *family)
}

/// Interop sharing kind implied by an entry point name
pub fn mem_sharing(func: &str) -> &'static str {
    if func.contains("GL") {
        "ClintObjectSharing_gl"
    } else if func.contains("D3D9") {
        "ClintObjectSharing_d3d9"
    } else if func.contains("D3D10") {
        "ClintObjectSharing_d3d10"
    } else if func.contains("D3D11") {
        "ClintObjectSharing_d3d11"
    } else {
        "ClintObjectSharing_none"
    }
}

/// Serialization scope held around the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Process-wide, for lifecycle-mutating entry points
    Global,
    /// Keyed by the kernel object
    Kernel(String),
}

impl Scope {
    pub fn of(func: &FunctionDescriptor) -> Option<Scope> {
        let name = func.name.as_str();
        if name.contains("Create") || name.contains("Retain") || name.contains("Release") {
            return Some(Scope::Global);
        }
        if name == "clSetKernelArg" {
            return func.params.first().map(|p| Scope::Kernel(p.name.clone()));
        }
        None
    }

    pub fn enter(&self) -> String {
        match self {
            Scope::Global => "clint_opencl_enter();".into(),
            Scope::Kernel(kernel) => format!("clint_kernel_enter({});", kernel),
        }
    }

    pub fn exit(&self) -> String {
        match self {
            Scope::Global => "clint_opencl_exit();".into(),
            Scope::Kernel(kernel) => format!("clint_kernel_exit({});", kernel),
        }
    }
}

fn param_name(func: &FunctionDescriptor, index: usize) -> Option<&str> {
    func.params.get(index).map(|p| p.name.as_str())
}

fn capability_emulation(func: &FunctionDescriptor, hooks: &mut Hooks) {
    let forced = if func.return_type == "cl_int" {
        vec!["retval = CL_INVALID_OPERATION;".to_string()]
    } else if let Some(errcode) = func.errcode_param() {
        vec![
            format!("*{} = CL_INVALID_OPERATION;", errcode.name),
            "retval = NULL;".to_string(),
        ]
    } else {
        return;
    };

    let mut condition = "clint_get_config(CLINT_DISABLE_IMAGE)".to_string();
    if func.name.contains("3D") {
        condition.push_str(" || clint_get_config(CLINT_EMBEDDED)");
    } else if func.name == "clCreateImage" {
        if let Some(desc) = func.last_param_of("const cl_image_desc *") {
            condition.push_str(&format!(
                " || (clint_get_config(CLINT_EMBEDDED) && {0} != NULL && {0}->image_type == CL_MEM_OBJECT_IMAGE3D)",
                desc.name
            ));
        }
    }

    if hooks.guard.is_none() {
        hooks.guard = Some(DispatchGuard { condition, forced });
    }
}

fn profile_events(func: &FunctionDescriptor, hooks: &mut Hooks) {
    let Some(event) = func.last_param_of("cl_event *") else {
        return;
    };
    let event = event.name.as_str();
    let config = if KERNEL_LAUNCHES.contains(&func.name.as_str()) {
        "CLINT_PROFILE"
    } else {
        "CLINT_PROFILE_ALL"
    };

    hooks.locals.push("cl_event profile_event = NULL;".into());
    hooks.pre.push(format!("if (clint_get_config({})) {{", config));
    hooks.pre.push(format!("\tif ({0} == NULL) {0} = &profile_event;", event));
    hooks.pre.push("}".into());

    match func.status_expr() {
        Some(status) => {
            hooks.post.push(format!(
                "if (clint_get_config({}) && {} == CL_SUCCESS)",
                config, status
            ));
            hooks.post.push(format!(
                "\t{} = clint_log_profile(\"{}\", *{});",
                status, func.name, event
            ));
        }
        None => {
            hooks.post.push(format!("if (clint_get_config({}))", config));
            hooks
                .post
                .push(format!("\t(void)clint_log_profile(\"{}\", *{});", func.name, event));
        }
    }
    hooks.post.push("if (profile_event != NULL) {".into());
    hooks.post.push("\tCLINTFUNC(clReleaseEvent)(profile_event);".into());
    hooks.post.push(format!("\t{} = NULL;", event));
    hooks.post.push("}".into());
}

fn queue_profiling(func: &FunctionDescriptor, hooks: &mut Hooks) {
    if let Some(props) = func.last_param_of("cl_command_queue_properties") {
        hooks.push_pre(&["if (clint_get_config(CLINT_PROFILE))"]);
        hooks.pre.push(format!("\t{} |= CL_QUEUE_PROFILING_ENABLE;", props.name));
    }
}

fn shared_acquire(func: &FunctionDescriptor, hooks: &mut Hooks) {
    let (Some(count), Some(objects)) = (param_name(func, 1), param_name(func, 2)) else {
        return;
    };
    let call = if func.name.starts_with("clEnqueueAcquire") {
        "clint_acquire_shared_mems"
    } else {
        "clint_release_shared_mems"
    };
    hooks.pre.push(format!(
        "{}({}, {}, {});",
        call,
        count,
        objects,
        mem_sharing(&func.name)
    ));
}

fn build_options(func: &FunctionDescriptor, hooks: &mut Hooks) {
    if let Some(options) = func.last_param_of("const char *") {
        hooks
            .pre
            .push(format!("{0} = clint_modify_build_options({0});", options.name));
    }
}

fn program_sources(func: &FunctionDescriptor, hooks: &mut Hooks) {
    let count = func.last_param_of("cl_uint");
    let strings = func.last_param_of("const char **");
    let lengths = func.last_param_of("const size_t *");
    if let (Some(count), Some(strings), Some(lengths)) = (count, strings, lengths) {
        hooks.pre.push(format!(
            "{1} = clint_modify_program_sources({0}, {1}, &{2});",
            count.name, strings.name, lengths.name
        ));
    }
}

fn context_devices(func: &FunctionDescriptor, hooks: &mut Hooks) {
    if func.name == "clCreateContextFromType" {
        if let Some(device_type) = func.last_param_of("cl_device_type") {
            hooks
                .pre
                .push(format!("{0} = clint_modify_device_type({0});", device_type.name));
        }
        return;
    }
    let properties = func.params.iter().find(|p| p.ty.contains("cl_context_properties"));
    let count = func.first_param_of("cl_uint");
    let devices = func.params.iter().find(|p| p.ty.contains("cl_device_id"));
    if let (Some(properties), Some(count), Some(devices)) = (properties, count, devices) {
        hooks.pre.push(format!(
            "{2} = clint_modify_context_devices({0}, &{1}, {2});",
            properties.name, count.name, devices.name
        ));
    }
}

/// Registration runs only once the call has produced (or released) a mapping
fn push_on_success(func: &FunctionDescriptor, hooks: &mut Hooks, statement: String) {
    match func.status_expr() {
        Some(status) => {
            hooks.post.push(format!("if ({} == CL_SUCCESS)", status));
            hooks.post.push(format!("\t{}", statement));
        }
        None => hooks.post.push(statement),
    }
}

fn map_tracking(func: &FunctionDescriptor, hooks: &mut Hooks) {
    if func.name == "clEnqueueUnmapMemObject" {
        if let Some(mem) = func.last_param_of("cl_mem") {
            push_on_success(func, hooks, format!("clint_release_map({});", mem.name));
        }
        return;
    }

    let mem = func.last_param_of("cl_mem");
    let flags = func.last_param_of("cl_map_flags");
    let (Some(mem), Some(flags)) = (mem, flags) else {
        return;
    };

    if let Some(blocking) = func.last_param_of("cl_bool") {
        hooks.push_pre(&["if (clint_get_config(CLINT_CHECK_MAPPING))"]);
        hooks.pre.push(format!("\t{} = CL_TRUE;", blocking.name));
    }

    if func.name == "clEnqueueMapImage" {
        let sizes: Vec<&str> = func
            .params
            .iter()
            .filter(|p| p.ty.contains("size_t"))
            .map(|p| p.name.as_str())
            .collect();
        if let [_, region, row_pitch, slice_pitch, ..] = sizes.as_slice() {
            let retain = format!(
                "retval = clint_retain_map_image({}, {}, retval, {}, {}, {});",
                mem.name, flags.name, region, row_pitch, slice_pitch
            );
            push_on_success(func, hooks, retain);
        }
    } else {
        let size = func
            .params
            .iter()
            .filter(|p| p.ty == "size_t")
            .nth(1);
        if let Some(size) = size {
            let retain = format!(
                "retval = clint_retain_map({}, {}, retval, {});",
                mem.name, flags.name, size.name
            );
            push_on_success(func, hooks, retain);
        }
    }
}

const EMBEDDED_PROFILE: &str = "EMBEDDED_PROFILE";

/// Device queries answered with zero when images are disabled
const IMAGE_CAPS: &[&str] = &[
    "CL_DEVICE_IMAGE_SUPPORT",
    "CL_DEVICE_MAX_READ_IMAGE_ARGS",
    "CL_DEVICE_MAX_WRITE_IMAGE_ARGS",
    "CL_DEVICE_IMAGE2D_MAX_WIDTH",
    "CL_DEVICE_IMAGE2D_MAX_HEIGHT",
    "CL_DEVICE_IMAGE3D_MAX_WIDTH",
    "CL_DEVICE_IMAGE3D_MAX_HEIGHT",
    "CL_DEVICE_IMAGE3D_MAX_DEPTH",
    "CL_DEVICE_IMAGE_MAX_BUFFER_SIZE",
    "CL_DEVICE_IMAGE_MAX_ARRAY_SIZE",
    "CL_DEVICE_MAX_SAMPLERS",
];

/// Device queries answered with zero under the embedded profile
const IMAGE3D_CAPS: &[&str] = &[
    "CL_DEVICE_IMAGE3D_MAX_WIDTH",
    "CL_DEVICE_IMAGE3D_MAX_HEIGHT",
    "CL_DEVICE_IMAGE3D_MAX_DEPTH",
];

fn info_rewrite(func: &FunctionDescriptor, hooks: &mut Hooks) {
    let names: Vec<&str> = (1..=4).filter_map(|i| param_name(func, i)).collect();
    let [param, size, value, size_ret] = names.as_slice() else {
        return;
    };
    let device = func.name == "clGetDeviceInfo";
    let (extensions, profile) = if device {
        ("CL_DEVICE_EXTENSIONS", "CL_DEVICE_PROFILE")
    } else {
        ("CL_PLATFORM_EXTENSIONS", "CL_PLATFORM_PROFILE")
    };
    let profile_len = EMBEDDED_PROFILE.len() + 1;

    hooks.post.push(format!(
        "if (clint_get_config(CLINT_ENABLED) && {} == {}) {{",
        param, extensions
    ));
    hooks.post.push(format!(
        "\tclint_extensions_modify({}, (char*){}, {});",
        size, value, size_ret
    ));
    hooks.post.push("}".into());

    // EMBEDDED_PROFILE is longer than FULL_PROFILE, so the real query
    // already sized the caller's buffer
    hooks.post.push(format!(
        "if (clint_get_config(CLINT_EMBEDDED) && {} == {}) {{",
        param, profile
    ));
    hooks.post.push(format!("\tif ({} != NULL)", size_ret));
    hooks.post.push(format!("\t\t*{} = {};", size_ret, profile_len));
    hooks
        .post
        .push(format!("\tif ({} >= {} && {} != NULL)", size, profile_len, value));
    hooks.post.push(format!(
        "\t\tmemcpy({}, \"{}\", {});",
        value, EMBEDDED_PROFILE, profile_len
    ));
    hooks.post.push("}".into());

    if !device {
        return;
    }
    hooks.post.push(format!(
        "if (clint_get_config(CLINT_DISABLE_IMAGE) && {} > 0 && {} != NULL) {{",
        size, value
    ));
    zero_caps(hooks, param, size, value, IMAGE_CAPS);
    hooks.post.push(format!(
        "}} else if (clint_get_config(CLINT_EMBEDDED) && {} > 0 && {} != NULL) {{",
        size, value
    ));
    zero_caps(hooks, param, size, value, IMAGE3D_CAPS);
    hooks.post.push("}".into());
}

fn zero_caps(hooks: &mut Hooks, param: &str, size: &str, value: &str, caps: &[&str]) {
    hooks.post.push(format!("\tswitch ({}) {{", param));
    for cap in caps {
        hooks.post.push(format!("\tcase {}:", cap));
    }
    hooks.post.push(format!("\t\tmemset({}, 0, {});", value, size));
    hooks.push_post(&["\t\tbreak;", "\t}"]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{Dispatch, Parameter};

    fn func(name: &str, ret: &str, params: &[(&str, &str)]) -> FunctionDescriptor {
        FunctionDescriptor {
            name: name.into(),
            return_type: ret.into(),
            params: params.iter().map(|(t, n)| Parameter::value(t, n)).collect(),
            dispatch: Dispatch::Static,
            declaration: format!("extern CL_API_ENTRY {} CL_API_CALL\n{}(void)", ret, name),
        }
    }

    fn enqueue_read_buffer() -> FunctionDescriptor {
        func(
            "clEnqueueReadBuffer",
            "cl_int",
            &[
                ("cl_command_queue", "command_queue"),
                ("cl_mem", "buffer"),
                ("cl_bool", "blocking_read"),
                ("size_t", "offset"),
                ("size_t", "size"),
                ("void *", "ptr"),
                ("cl_uint", "num_events_in_wait_list"),
                ("const cl_event *", "event_wait_list"),
                ("cl_event *", "event"),
            ],
        )
    }

    #[test]
    fn test_plain_function_has_no_hooks() {
        let f = func("clFinish", "cl_int", &[("cl_command_queue", "command_queue")]);
        assert_eq!(collect(&f), Hooks::default());
    }

    #[test]
    fn test_profile_events() {
        let hooks = collect(&enqueue_read_buffer());
        assert_eq!(hooks.locals, vec!["cl_event profile_event = NULL;"]);
        assert_eq!(hooks.pre[0], "if (clint_get_config(CLINT_PROFILE_ALL)) {");
        assert_eq!(hooks.pre[1], "\tif (event == NULL) event = &profile_event;");
        assert_eq!(
            hooks.post[0],
            "if (clint_get_config(CLINT_PROFILE_ALL) && retval == CL_SUCCESS)"
        );
        assert_eq!(hooks.post[1], "\tretval = clint_log_profile(\"clEnqueueReadBuffer\", *event);");
        assert!(hooks.post.contains(&"\tevent = NULL;".to_string()));
    }

    #[test]
    fn test_kernel_launch_uses_profile_toggle() {
        let f = func(
            "clEnqueueTask",
            "cl_int",
            &[
                ("cl_command_queue", "command_queue"),
                ("cl_kernel", "kernel"),
                ("cl_uint", "num_events_in_wait_list"),
                ("const cl_event *", "event_wait_list"),
                ("cl_event *", "event"),
            ],
        );
        assert_eq!(collect(&f).pre[0], "if (clint_get_config(CLINT_PROFILE)) {");
    }

    #[test]
    fn test_capability_emulation_for_handle_return() {
        let f = func(
            "clCreateImage3D",
            "cl_mem",
            &[
                ("cl_context", "context"),
                ("cl_mem_flags", "flags"),
                ("cl_int *", "errcode_ret"),
            ],
        );
        let guard = collect(&f).guard.unwrap();
        assert_eq!(
            guard.condition,
            "clint_get_config(CLINT_DISABLE_IMAGE) || clint_get_config(CLINT_EMBEDDED)"
        );
        assert_eq!(
            guard.forced,
            vec!["*errcode_ret = CL_INVALID_OPERATION;", "retval = NULL;"]
        );
    }

    #[test]
    fn test_create_image_checks_descriptor() {
        let f = func(
            "clCreateImage",
            "cl_mem",
            &[
                ("cl_context", "context"),
                ("cl_mem_flags", "flags"),
                ("const cl_image_format *", "image_format"),
                ("const cl_image_desc *", "image_desc"),
                ("void *", "host_ptr"),
                ("cl_int *", "errcode_ret"),
            ],
        );
        let guard = collect(&f).guard.unwrap();
        assert!(guard
            .condition
            .ends_with("(clint_get_config(CLINT_EMBEDDED) && image_desc != NULL && image_desc->image_type == CL_MEM_OBJECT_IMAGE3D)"));
    }

    #[test]
    fn test_supported_formats_not_emulated() {
        let f = func("clGetSupportedImageFormats", "cl_int", &[("cl_context", "context")]);
        assert!(collect(&f).guard.is_none());
    }

    #[test]
    fn test_map_buffer_forces_blocking_before_call() {
        let f = func(
            "clEnqueueMapBuffer",
            "void *",
            &[
                ("cl_command_queue", "command_queue"),
                ("cl_mem", "buffer"),
                ("cl_bool", "blocking_map"),
                ("cl_map_flags", "map_flags"),
                ("size_t", "offset"),
                ("size_t", "size"),
                ("cl_uint", "num_events_in_wait_list"),
                ("const cl_event *", "event_wait_list"),
                ("cl_event *", "event"),
                ("cl_int *", "errcode_ret"),
            ],
        );
        let hooks = collect(&f);
        assert_eq!(hooks.locals, vec!["cl_event profile_event = NULL;"]);
        assert!(hooks.pre.contains(&"\tblocking_map = CL_TRUE;".to_string()));
        let retain = hooks
            .post
            .iter()
            .position(|l| l == "\tretval = clint_retain_map(buffer, map_flags, retval, size);")
            .unwrap();
        assert_eq!(hooks.post[retain - 1], "if (*errcode_ret == CL_SUCCESS)");
        assert_eq!(hooks.post[1], "\t*errcode_ret = clint_log_profile(\"clEnqueueMapBuffer\", *event);");
    }

    #[test]
    fn test_map_image_uses_region_and_pitches() {
        let f = func(
            "clEnqueueMapImage",
            "void *",
            &[
                ("cl_command_queue", "command_queue"),
                ("cl_mem", "image"),
                ("cl_bool", "blocking_map"),
                ("cl_map_flags", "map_flags"),
                ("const size_t *", "origin"),
                ("const size_t *", "region"),
                ("size_t *", "image_row_pitch"),
                ("size_t *", "image_slice_pitch"),
                ("cl_int *", "errcode_ret"),
            ],
        );
        let hooks = collect(&f);
        assert_eq!(
            hooks.post,
            vec![
                "if (*errcode_ret == CL_SUCCESS)",
                "\tretval = clint_retain_map_image(image, map_flags, retval, region, image_row_pitch, image_slice_pitch);",
            ]
        );
    }

    #[test]
    fn test_unmap_releases_only_on_success() {
        let f = func(
            "clEnqueueUnmapMemObject",
            "cl_int",
            &[
                ("cl_command_queue", "command_queue"),
                ("cl_mem", "memobj"),
                ("void *", "mapped_ptr"),
            ],
        );
        assert_eq!(
            collect(&f).post,
            vec!["if (retval == CL_SUCCESS)", "\tclint_release_map(memobj);"]
        );
    }

    #[test]
    fn test_shared_acquire_sharing_kind() {
        let f = func(
            "clEnqueueAcquireGLObjects",
            "cl_int",
            &[
                ("cl_command_queue", "command_queue"),
                ("cl_uint", "num_objects"),
                ("const cl_mem *", "mem_objects"),
            ],
        );
        assert_eq!(
            collect(&f).pre,
            vec!["clint_acquire_shared_mems(num_objects, mem_objects, ClintObjectSharing_gl);"]
        );
    }

    #[test]
    fn test_context_devices() {
        let f = func(
            "clCreateContext",
            "cl_context",
            &[
                ("const cl_context_properties *", "properties"),
                ("cl_uint", "num_devices"),
                ("const cl_device_id *", "devices"),
                ("cl_int *", "errcode_ret"),
            ],
        );
        assert_eq!(
            collect(&f).pre,
            vec!["devices = clint_modify_context_devices(properties, &num_devices, devices);"]
        );
    }

    #[test]
    fn test_missing_params_contribute_nothing() {
        let f = func("clCreateProgramWithSource", "cl_program", &[("cl_context", "context")]);
        assert_eq!(collect(&f), Hooks::default());
    }

    #[test]
    fn test_device_info_zeroes_image_caps() {
        let f = func(
            "clGetDeviceInfo",
            "cl_int",
            &[
                ("cl_device_id", "device"),
                ("cl_device_info", "param_name"),
                ("size_t", "param_value_size"),
                ("void *", "param_value"),
                ("size_t *", "param_value_size_ret"),
            ],
        );
        let post = collect(&f).post;
        assert_eq!(
            post[0],
            "if (clint_get_config(CLINT_ENABLED) && param_name == CL_DEVICE_EXTENSIONS) {"
        );
        assert!(post.contains(&"\t\tmemcpy(param_value, \"EMBEDDED_PROFILE\", 17);".to_string()));
        assert!(post.contains(&"\tcase CL_DEVICE_MAX_SAMPLERS:".to_string()));
    }

    #[test]
    fn test_scopes() {
        let create = func("clCreateBuffer", "cl_mem", &[]);
        assert_eq!(Scope::of(&create), Some(Scope::Global));
        let arg = func("clSetKernelArg", "cl_int", &[("cl_kernel", "kernel")]);
        assert_eq!(Scope::of(&arg).unwrap().enter(), "clint_kernel_enter(kernel);");
        let finish = func("clFinish", "cl_int", &[]);
        assert_eq!(Scope::of(&finish), None);
    }

    #[test]
    fn test_type_override() {
        assert_eq!(
            type_override("clSetUserEventStatus", "cl_int"),
            Some("execution_status")
        );
        assert_eq!(type_override("clFinish", "cl_int"), None);
    }
}
