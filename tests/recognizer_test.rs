//! Fixture tables for the line lexer and the signature decomposer

use clint_codegen::scan::{lex_line, Constant, HeaderLine, HeaderSource, Literal};
use clint_codegen::{decompose, Dispatch, GeneratorConfig, ParamKind};
use rstest::rstest;

fn define(name: &str, text: &str, literal: Literal) -> HeaderLine {
    HeaderLine::Define(Constant {
        name: name.into(),
        text: text.into(),
        literal,
    })
}

#[rstest]
#[case("#define CL_DEVICE_TYPE                              0x1000", define("CL_DEVICE_TYPE", "0x1000", Literal::Hex(0x1000)))]
#[case("#define CL_INVALID_VALUE                            -30", define("CL_INVALID_VALUE", "-30", Literal::Decimal(-30)))]
#[case("#define CL_SUCCESS 0", define("CL_SUCCESS", "0", Literal::Decimal(0)))]
#[case(
    "#define CL_MAP_WRITE                                (1 << 1)",
    HeaderLine::BitField(Constant {
        name: "CL_MAP_WRITE".into(),
        text: "(1 << 1)".into(),
        literal: Literal::Shift { base: 1, shift: 1 },
    })
)]
#[case("/* cl_device_info */", HeaderLine::FamilyComment("cl_device_info".into()))]
#[case("/* Additional cl_device_info */", HeaderLine::FamilyComment("cl_device_info".into()))]
#[case("/* cl_device_type - bitfield */", HeaderLine::FamilyComment("cl_device_type".into()))]
#[case("// cl_mem_flags", HeaderLine::FamilyComment("cl_mem_flags".into()))]
#[case("/* cl_mem flag - bitfield */", HeaderLine::FamilyComment("cl_mem_flags".into()))]
#[case("/* cl_khr_gl_sharing extension  */", HeaderLine::Comment)]
#[case("/* Error Codes */", HeaderLine::Comment)]
#[case("/* command execution status */", HeaderLine::StatusSentinel)]
#[case("} cl_image_format;", HeaderLine::StructClose("cl_image_format".into()))]
#[case("#define cl_khr_icd 1", HeaderLine::Other)]
#[case("typedef cl_uint             cl_bool;", HeaderLine::Other)]
#[case("", HeaderLine::Other)]
fn test_lex_line(#[case] line: &str, #[case] expected: HeaderLine) {
    assert_eq!(lex_line(line), expected);
}

#[rstest]
#[case(
    "extern CL_API_ENTRY cl_int CL_API_CALL\nclFinish(cl_command_queue /* command_queue */) CL_API_SUFFIX__VERSION_1_0;",
    "clFinish",
    "cl_int",
    &[("cl_command_queue", "command_queue")]
)]
#[case(
    "extern CL_API_ENTRY cl_mem CL_API_CALL\nclCreateBuffer(cl_context   context,\n               cl_mem_flags flags,\n               size_t       size,\n               void *       host_ptr,\n               cl_int *     errcode_ret) CL_API_SUFFIX__VERSION_1_0;",
    "clCreateBuffer",
    "cl_mem",
    &[
        ("cl_context", "context"),
        ("cl_mem_flags", "flags"),
        ("size_t", "size"),
        ("void *", "host_ptr"),
        ("cl_int *", "errcode_ret"),
    ]
)]
#[case(
    "extern CL_API_ENTRY CL_EXT_PREFIX__VERSION_1_1_DEPRECATED cl_int CL_API_CALL\nclUnloadCompiler(void) CL_EXT_SUFFIX__VERSION_1_1_DEPRECATED;",
    "clUnloadCompiler",
    "cl_int",
    &[]
)]
#[case(
    "extern CL_API_ENTRY void * CL_API_CALL\nclGetExtensionFunctionAddress(const char * /* func_name */) CL_API_SUFFIX__VERSION_1_0;",
    "clGetExtensionFunctionAddress",
    "void *",
    &[("const char *", "func_name")]
)]
#[case(
    "extern CL_API_ENTRY cl_program CL_API_CALL\nclCreateProgramWithSource(cl_context        context,\n                          cl_uint           count,\n                          const char **     strings,\n                          const size_t *    lengths,\n                          cl_int *          errcode_ret) CL_API_SUFFIX__VERSION_1_0;",
    "clCreateProgramWithSource",
    "cl_program",
    &[
        ("cl_context", "context"),
        ("cl_uint", "count"),
        ("const char **", "strings"),
        ("const size_t *", "lengths"),
        ("cl_int *", "errcode_ret"),
    ]
)]
fn test_decompose_keeps_call_order(
    #[case] text: &str,
    #[case] name: &str,
    #[case] return_type: &str,
    #[case] params: &[(&str, &str)],
) {
    let source = HeaderSource::new("cl.h", text);
    let blocks = source.prototypes(&GeneratorConfig::default());
    assert_eq!(blocks.len(), 1, "prototype not recognized");

    let desc = decompose(&blocks[0]).unwrap();
    assert_eq!(desc.name, name);
    assert_eq!(desc.return_type, return_type);
    assert_eq!(desc.dispatch, Dispatch::Static);
    let got: Vec<_> = desc
        .params
        .iter()
        .map(|p| (p.ty.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(got, params);
}

#[test]
fn test_callback_reduced_to_identifier() {
    let text = "extern CL_API_ENTRY cl_int CL_API_CALL\nclSetEventCallback(cl_event    /* event */,\n                   cl_int      /* command_exec_callback_type */,\n                   void (CL_CALLBACK * /* pfn_notify */)(cl_event, cl_int, void *),\n                   void *      /* user_data */) CL_API_SUFFIX__VERSION_1_1;";
    let source = HeaderSource::new("cl.h", text);
    let desc = decompose(&source.prototypes(&GeneratorConfig::default())[0]).unwrap();

    let names: Vec<_> = desc.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["event", "command_exec_callback_type", "pfn_notify", "user_data"]);
    assert_eq!(desc.params[2].kind, ParamKind::Callback);
    assert_eq!(desc.params[2].ty, "void");
}

#[test]
fn test_prototypes_from_extension_header_are_dynamic() {
    let text = "extern CL_API_ENTRY cl_int CL_API_CALL\nclIcdGetPlatformIDsKHR(cl_uint num_entries, cl_platform_id * platforms, cl_uint * num_platforms) CL_EXT_SUFFIX__VERSION_1_0;";
    let source = HeaderSource::new("cl_ext.h", text);
    let desc = decompose(&source.prototypes(&GeneratorConfig::default())[0]).unwrap();
    assert_eq!(desc.dispatch, Dispatch::Extension);
    assert!(!desc.is_core_api());
}

#[test]
fn test_unnamed_parameter_is_rejected() {
    let text = "extern CL_API_ENTRY cl_int CL_API_CALL\nclBroken(cl_uint) CL_API_SUFFIX__VERSION_1_0;";
    let source = HeaderSource::new("cl.h", text);
    let err = decompose(&source.prototypes(&GeneratorConfig::default())[0]).unwrap_err();
    assert_eq!(err.name.as_deref(), Some("clBroken"));
}
