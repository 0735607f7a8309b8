//! Constant classifier and type knowledge base
//!
//! Header lines are fed in source order through a small state machine:
//!
//! ```text
//! Idle --family comment / status sentinel--> InFamily(name)
//! InFamily(name) --define | bitfield--> InFamily(name)   (member appended)
//! InFamily(name) --comment-->           InFamily(name)
//! InFamily(name) --anything else-->     Idle
//! ```
//!
//! Outside a family, constants fall back to name heuristics. Everything is
//! accumulated on a [`KnowledgeBuilder`] threaded through every scanned
//! header and frozen into a [`TypeKnowledge`] before synthesis.

use crate::config::GeneratorConfig;
use crate::diagnostic::{DiagnosticKind, Diagnostics};
use crate::format;
use crate::scan::{Constant, HeaderLine, Literal};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// CL_SUCCESS and every negative status code
pub const ERROR_FAMILY: &str = "error";
/// Every large hexadecimal constant, regardless of family
pub const TOKEN_FAMILY: &str = "token";
/// Opened by `/* command execution status */`
pub const EXECUTION_STATUS_FAMILY: &str = "execution_status";

/// Families never built: `cl_bool` members are plain truth values
const SKIPPED_FAMILIES: &[&str] = &["cl_bool"];

/// Substring heuristics for hexadecimal constants outside any family, in
/// priority order
const NAME_HEURISTICS: &[(&str, &str)] = &[
    ("CL_DEVICE", "cl_device_info"),
    ("CL_IMAGE", "cl_image_info"),
    ("CL_CGL", "cl_gl_platform_info"),
    ("CL_COMMAND", "cl_command_type"),
    ("CL_CONTEXT_PROPERTY", "cl_context_properties"),
    ("CL_PROGRAM", "cl_program_info"),
    ("CL_AFFINITY_DOMAIN", "cl_device_affinity_domain"),
];

/// Exact vendor names checked after the substring heuristics
const EXACT_NAMES: &[(&str, &str)] = &[
    ("CL_CONTEXT_MEMORY_INITIALIZE_KHR", "cl_context_properties"),
    ("CL_CONTEXT_TERMINATE_KHR", "cl_context_properties"),
    ("CL_1RGB_APPLE", "cl_channel_order"),
    ("CL_BGR1_APPLE", "cl_channel_order"),
    ("CL_ABGR_APPLE", "cl_channel_order"),
    ("CL_YCbYCr_APPLE", "cl_channel_type"),
    ("CL_CbYCrY_APPLE", "cl_channel_type"),
    ("CL_SFIXED14_APPLE", "cl_channel_type"),
    ("CL_BIASED_HALF_APPLE", "cl_channel_type"),
    ("CL_CONTEXT_OFFLINE_DEVICES_AMD", "cl_context_info"),
];

/// Members that belong to a second family as well as the one they are
/// declared in
const EXTRA_FAMILIES: &[(&str, &str)] = &[("CL_CONTEXT_PLATFORM", "cl_context_properties")];

/// Outside bit fields named with this prefix are memory flags
const MEM_USE_PREFIX: &str = "CL_MEM_USE";

/// Correct family names that the headers spell wrongly
pub fn correct_family_name(raw: &str) -> String {
    if raw == "cl_kernel_arg_type_qualifer" {
        return "cl_kernel_arg_type_qualifier".into();
    }
    if raw.starts_with("cl_d3d") && (raw.contains("device_source") || raw.contains("device_set")) {
        if let Some(stem) = raw.strip_suffix("_nv") {
            return format!("{}_khr", stem);
        }
        if !raw.ends_with("_khr") {
            return format!("{}_khr", raw);
        }
    }
    raw.to_string()
}

/// Family chosen by the name heuristics for a lone hexadecimal constant
fn heuristic_family(name: &str) -> Option<&'static str> {
    NAME_HEURISTICS
        .iter()
        .find(|(needle, _)| name.contains(needle))
        .or_else(|| EXACT_NAMES.iter().find(|(exact, _)| name == *exact))
        .map(|(_, family)| *family)
}

/// How a family is stringified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyKind {
    /// Decomposed into ` | `-joined member names
    Bitmask,
    /// Exact-match lookup
    Enumeration,
}

/// One classified constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub name: String,
    /// Literal exactly as written in the header
    pub text: String,
    #[serde(skip)]
    pub literal: Literal,
}

impl From<&Constant> for Member {
    fn from(c: &Constant) -> Self {
        Member {
            name: c.name.clone(),
            text: c.text.clone(),
            literal: c.literal,
        }
    }
}

impl Member {
    pub fn value(&self) -> u64 {
        self.literal.value()
    }
}

/// A named set of constants sharing one C type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeFamily {
    pub name: String,
    /// Declaration order
    pub members: Vec<Member>,
}

impl TypeFamily {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: Vec::new(),
        }
    }

    /// A family whose first member is a shift expression is a bit-mask
    pub fn kind(&self) -> FamilyKind {
        match self.members.first() {
            Some(m) if m.literal.is_shift() => FamilyKind::Bitmask,
            _ => FamilyKind::Enumeration,
        }
    }

    /// C type of the stringifier argument
    pub fn c_type(&self) -> &str {
        match self.name.as_str() {
            ERROR_FAMILY | EXECUTION_STATUS_FAMILY => "cl_int",
            TOKEN_FAMILY => "cl_uint",
            other => other,
        }
    }

    /// Name without the `cl_` prefix, used in `clint_string_<short>`
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    /// Members that produce an output branch.
    ///
    /// Enumerations keep the first member for each literal value so the
    /// generated `switch` has no duplicate labels. Bit-masks drop zero-valued
    /// members, which can never be matched.
    pub fn display_members(&self) -> Vec<&Member> {
        match self.kind() {
            FamilyKind::Bitmask => self.members.iter().filter(|m| m.value() != 0).collect(),
            FamilyKind::Enumeration => {
                let mut seen = BTreeSet::new();
                self.members
                    .iter()
                    .filter(|m| seen.insert(m.value()))
                    .collect()
            }
        }
    }

    /// Text the generated stringifier returns for `value`
    pub fn describe(&self, value: u64) -> String {
        match self.kind() {
            FamilyKind::Bitmask => {
                if value == 0 {
                    return "0".into();
                }
                let members = self.display_members();
                if let Some(exact) = members.iter().find(|m| m.value() == value) {
                    return exact.name.clone();
                }
                // members test against the full value; only the residual is cleared
                let mut rest = value;
                let mut parts: Vec<String> = Vec::new();
                for m in members {
                    let mask = m.value();
                    if value & mask == mask {
                        rest &= !mask;
                        parts.push(m.name.clone());
                    }
                }
                if rest != 0 {
                    parts.push(format!("0x{:X}", rest));
                }
                parts.join(" | ")
            }
            FamilyKind::Enumeration => self
                .display_members()
                .into_iter()
                .find(|m| m.value() == value)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| format!("Unknown {} 0x{:X}", self.name, value as u32)),
        }
    }
}

pub fn short_name(family: &str) -> &str {
    family.strip_prefix("cl_").unwrap_or(family)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    InFamily(String),
}

/// Mutable accumulator threaded through every scanned header
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBuilder {
    families: BTreeMap<String, TypeFamily>,
    composites: BTreeSet<String>,
    extension_includes: Vec<String>,
}

impl KnowledgeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the lexed lines of one header
    ///
    /// The state machine restarts in `Idle` for every header.
    pub fn classify_header(
        &mut self,
        header: &str,
        core: bool,
        lines: &[HeaderLine],
        config: &GeneratorConfig,
        diags: &mut Diagnostics,
    ) {
        let mut state = State::Idle;

        for line in lines {
            if let HeaderLine::StructClose(name) = line {
                if format::struct_format(name).is_some() {
                    self.composites.insert(name.clone());
                }
            }

            state = match state {
                State::InFamily(family) => match line {
                    HeaderLine::Define(c) | HeaderLine::BitField(c) => {
                        self.add_family_member(&family, c, config);
                        State::InFamily(family)
                    }
                    l if l.is_comment() => State::InFamily(family),
                    _ => State::Idle,
                },
                State::Idle => {
                    let opened = match line {
                        HeaderLine::FamilyComment(raw) => Some(correct_family_name(raw)),
                        HeaderLine::StatusSentinel => Some(EXECUTION_STATUS_FAMILY.to_string()),
                        HeaderLine::Define(c) => {
                            self.classify_lone_define(c, config, diags);
                            None
                        }
                        HeaderLine::BitField(c) => {
                            self.classify_lone_bitfield(c, config, diags);
                            None
                        }
                        _ => None,
                    };
                    match opened {
                        Some(family) => {
                            if !core && !self.extension_includes.iter().any(|h| h == header) {
                                self.extension_includes.push(header.to_string());
                            }
                            State::InFamily(family)
                        }
                        None => State::Idle,
                    }
                }
            };
        }
    }

    fn add_family_member(&mut self, family: &str, c: &Constant, config: &GeneratorConfig) {
        self.append(family, c, config);
        for (symbol, extra) in EXTRA_FAMILIES {
            if c.name == *symbol {
                self.append(extra, c, config);
            }
        }
        self.register_token(c, config);
    }

    fn classify_lone_define(&mut self, c: &Constant, config: &GeneratorConfig, diags: &mut Diagnostics) {
        match c.literal {
            Literal::Decimal(v) if v < 0 || c.name == "CL_SUCCESS" => {
                self.append(ERROR_FAMILY, c, config);
            }
            Literal::Hex(_) => {
                match heuristic_family(&c.name) {
                    Some(family) => self.append(family, c, config),
                    None => diags.report(DiagnosticKind::UngroupedDefine, &c.name, &c.text),
                }
                self.register_token(c, config);
            }
            _ => {}
        }
    }

    fn classify_lone_bitfield(&mut self, c: &Constant, config: &GeneratorConfig, diags: &mut Diagnostics) {
        if c.name.starts_with(MEM_USE_PREFIX) {
            self.append("cl_mem_flags", c, config);
        } else {
            diags.report(DiagnosticKind::UngroupedBitfield, &c.name, &c.text);
        }
    }

    fn register_token(&mut self, c: &Constant, config: &GeneratorConfig) {
        if let Literal::Hex(v) = c.literal {
            if v >= config.token_threshold {
                self.append(TOKEN_FAMILY, c, config);
            }
        }
    }

    /// Append `c` to `family`, creating the family on first use.
    ///
    /// A member whose name is already present is ignored. In the token
    /// family a same-valued vendor alias is dropped, while any other
    /// same-valued name supersedes the earlier members.
    pub fn append(&mut self, family: &str, c: &Constant, config: &GeneratorConfig) {
        if SKIPPED_FAMILIES.contains(&family) {
            return;
        }
        let entry = self
            .families
            .entry(family.to_string())
            .or_insert_with(|| TypeFamily::new(family));
        if entry.contains(&c.name) {
            return;
        }
        if family == TOKEN_FAMILY {
            let value = c.literal.value();
            if entry.members.iter().any(|m| m.value() == value) {
                if config.has_alias_vendor_tag(&c.name) {
                    return;
                }
                entry.members.retain(|m| m.value() != value);
            }
        }
        entry.members.push(Member::from(c));
    }

    pub fn freeze(self) -> TypeKnowledge {
        TypeKnowledge {
            families: self.families,
            composites: self.composites,
            extension_includes: self.extension_includes,
        }
    }
}

/// Immutable snapshot of everything classified in a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeKnowledge {
    families: BTreeMap<String, TypeFamily>,
    composites: BTreeSet<String>,
    extension_includes: Vec<String>,
}

impl TypeKnowledge {
    pub fn family(&self, name: &str) -> Option<&TypeFamily> {
        self.families.get(name)
    }

    /// Families in name order
    pub fn families(&self) -> impl Iterator<Item = &TypeFamily> {
        self.families.values()
    }

    pub fn is_composite_active(&self, name: &str) -> bool {
        self.composites.contains(name)
    }

    /// Active composites in name order
    pub fn composites(&self) -> impl Iterator<Item = &str> {
        self.composites.iter().map(String::as_str)
    }

    /// Non-core headers that declared at least one family, first-seen order
    pub fn extension_includes(&self) -> &[String] {
        &self.extension_includes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::lex_line;

    fn classify(text: &str) -> (TypeKnowledge, Diagnostics) {
        classify_as("cl.h", true, text)
    }

    fn classify_as(header: &str, core: bool, text: &str) -> (TypeKnowledge, Diagnostics) {
        let lines: Vec<HeaderLine> = text.lines().map(lex_line).collect();
        let mut builder = KnowledgeBuilder::new();
        let mut diags = Diagnostics::new();
        builder.classify_header(header, core, &lines, &GeneratorConfig::default(), &mut diags);
        (builder.freeze(), diags)
    }

    fn names(family: &TypeFamily) -> Vec<&str> {
        family.members.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_family_collects_until_blank_line() {
        let (kb, diags) = classify(
            "\
/* cl_platform_info */
#define CL_PLATFORM_PROFILE                         0x0900
#define CL_PLATFORM_VERSION                         0x0901
/* 0x0902 reserved */
#define CL_PLATFORM_NAME                            0x0902

#define CL_STRAY                                    0x0903
",
        );
        let family = kb.family("cl_platform_info").unwrap();
        assert_eq!(
            names(family),
            vec!["CL_PLATFORM_PROFILE", "CL_PLATFORM_VERSION", "CL_PLATFORM_NAME"]
        );
        assert_eq!(family.kind(), FamilyKind::Enumeration);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.entries()[0].symbol, "CL_STRAY");
    }

    #[test]
    fn test_large_hex_joins_token() {
        let (kb, _) = classify(
            "\
/* cl_device_info */
#define CL_DEVICE_TYPE                              0x1000
#define CL_DEVICE_VENDOR_ID                         0x1001
",
        );
        assert!(kb.family("cl_device_info").unwrap().contains("CL_DEVICE_TYPE"));
        let token = kb.family(TOKEN_FAMILY).unwrap();
        assert_eq!(names(token), vec!["CL_DEVICE_TYPE", "CL_DEVICE_VENDOR_ID"]);
        assert_eq!(token.c_type(), "cl_uint");
    }

    #[test]
    fn test_bitmask_kind_from_first_member() {
        let (kb, _) = classify(
            "\
/* cl_device_type - bitfield */
#define CL_DEVICE_TYPE_DEFAULT                      (1 << 0)
#define CL_DEVICE_TYPE_CPU                          (1 << 1)
#define CL_DEVICE_TYPE_ALL                          0xFFFFFFFF
",
        );
        let family = kb.family("cl_device_type").unwrap();
        assert_eq!(family.kind(), FamilyKind::Bitmask);
        assert_eq!(family.describe(0b11), "CL_DEVICE_TYPE_DEFAULT | CL_DEVICE_TYPE_CPU");
    }

    #[test]
    fn test_errors_outside_family() {
        let (kb, diags) = classify(
            "\
/* Error Codes */
#define CL_SUCCESS                                  0
#define CL_DEVICE_NOT_FOUND                         -1
#define CL_INVALID_VALUE                            -30
",
        );
        let error = kb.family(ERROR_FAMILY).unwrap();
        assert_eq!(
            names(error),
            vec!["CL_SUCCESS", "CL_DEVICE_NOT_FOUND", "CL_INVALID_VALUE"]
        );
        assert_eq!(error.c_type(), "cl_int");
        assert_eq!(error.short_name(), "error");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_status_sentinel_opens_execution_status() {
        let (kb, _) = classify(
            "\
/* command execution status */
#define CL_COMPLETE                                 0x0
#define CL_RUNNING                                  0x1
",
        );
        let family = kb.family(EXECUTION_STATUS_FAMILY).unwrap();
        assert_eq!(names(family), vec!["CL_COMPLETE", "CL_RUNNING"]);
        assert_eq!(family.c_type(), "cl_int");
    }

    #[test]
    fn test_heuristics_outside_family() {
        let (kb, diags) = classify(
            "\
#define CL_DEVICE_HALF_FP_CONFIG                    0x1033
#define CL_CGL_DEVICE_FOR_CURRENT_VIRTUAL_SCREEN_APPLE 0x10000002
#define CL_1RGB_APPLE                               0x10000006
#define CL_MEM_USE_PERSISTENT_MEM_AMD               (1 << 6)
#define CL_MEM_SOMETHING_ELSE                       (1 << 7)
",
        );
        assert!(kb.family("cl_device_info").unwrap().contains("CL_DEVICE_HALF_FP_CONFIG"));
        assert!(kb
            .family("cl_gl_platform_info")
            .unwrap()
            .contains("CL_CGL_DEVICE_FOR_CURRENT_VIRTUAL_SCREEN_APPLE"));
        assert!(kb.family("cl_channel_order").unwrap().contains("CL_1RGB_APPLE"));
        assert!(kb.family("cl_mem_flags").unwrap().contains("CL_MEM_USE_PERSISTENT_MEM_AMD"));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.entries()[0].kind, DiagnosticKind::UngroupedBitfield);
    }

    #[test]
    fn test_ungrouped_define_only_in_token() {
        let (kb, diags) = classify("#define CL_FOO 0x2000\n");
        assert_eq!(names(kb.family(TOKEN_FAMILY).unwrap()), vec!["CL_FOO"]);
        assert_eq!(kb.families().count(), 1);
        assert_eq!(diags.entries()[0].kind, DiagnosticKind::UngroupedDefine);
        assert_eq!(diags.entries()[0].to_string(), "Ungrouped #define CL_FOO 0x2000");
    }

    #[test]
    fn test_token_alias_rules() {
        let (kb, _) = classify(
            "\
/* cl_gl_context_info */
#define CL_CURRENT_DEVICE_FOR_GL_CONTEXT_KHR        0x2006
#define CL_CURRENT_DEVICE_FOR_GL_CONTEXT_NV         0x2006
#define CL_CURRENT_DEVICE_FOR_GL_CONTEXT            0x2006
",
        );
        // vendor alias dropped, then the untagged name supersedes
        assert_eq!(
            names(kb.family(TOKEN_FAMILY).unwrap()),
            vec!["CL_CURRENT_DEVICE_FOR_GL_CONTEXT"]
        );
        assert_eq!(kb.family("cl_gl_context_info").unwrap().members.len(), 3);
    }

    #[test]
    fn test_duplicate_name_ignored() {
        let (kb, _) = classify(
            "\
/* cl_context_info */
#define CL_CONTEXT_PLATFORM                         0x1084
#define CL_CONTEXT_PLATFORM                         0x1084
",
        );
        assert_eq!(kb.family("cl_context_info").unwrap().members.len(), 1);
        assert!(kb.family("cl_context_properties").unwrap().contains("CL_CONTEXT_PLATFORM"));
    }

    #[test]
    fn test_bool_family_never_built() {
        let (kb, _) = classify(
            "\
/* cl_bool */
#define CL_FALSE                                    0
#define CL_TRUE                                     1
",
        );
        assert!(kb.family("cl_bool").is_none());
    }

    #[test]
    fn test_family_name_corrections() {
        assert_eq!(
            correct_family_name("cl_kernel_arg_type_qualifer"),
            "cl_kernel_arg_type_qualifier"
        );
        assert_eq!(
            correct_family_name("cl_d3d10_device_source_nv"),
            "cl_d3d10_device_source_khr"
        );
        assert_eq!(correct_family_name("cl_d3d10_device_set"), "cl_d3d10_device_set_khr");
        assert_eq!(
            correct_family_name("cl_d3d11_device_set_khr"),
            "cl_d3d11_device_set_khr"
        );
        assert_eq!(correct_family_name("cl_mem_info"), "cl_mem_info");
    }

    #[test]
    fn test_extension_header_recorded_once() {
        let (kb, _) = classify_as(
            "cl_ext.h",
            false,
            "\
/* cl_device_partition_property_ext */
#define CL_DEVICE_PARTITION_EQUALLY_EXT             0x4050

/* cl_mem_migration_flags_ext */
#define CL_MIGRATE_MEM_OBJECT_HOST_EXT              (1 << 0)
",
        );
        assert_eq!(kb.extension_includes(), &["cl_ext.h".to_string()]);
    }

    #[test]
    fn test_core_header_not_recorded() {
        let (kb, _) = classify("/* cl_mem_info */\n#define CL_MEM_TYPE 0x1100\n");
        assert!(kb.extension_includes().is_empty());
    }

    #[test]
    fn test_composite_activated_by_typedef_close() {
        let (kb, _) = classify(
            "\
typedef struct _cl_image_format {
    cl_channel_order        image_channel_order;
    cl_channel_type         image_channel_data_type;
} cl_image_format;

typedef struct _cl_other {
    int x;
} cl_other;
",
        );
        assert!(kb.is_composite_active("cl_image_format"));
        assert!(!kb.is_composite_active("cl_other"));
        assert!(!kb.is_composite_active("cl_buffer_region"));
    }

    #[test]
    fn test_enum_repeated_value_first_wins() {
        let (kb, _) = classify(
            "\
/* cl_channel_type */
#define CL_SNORM_INT8                               0x10D0
#define CL_SNORM_INT8_ALIAS                         0x10D0
",
        );
        let family = kb.family("cl_channel_type").unwrap();
        assert_eq!(family.display_members().len(), 1);
        assert_eq!(family.describe(0x10D0), "CL_SNORM_INT8");
        assert_eq!(family.describe(0x1), "Unknown cl_channel_type 0x1");
    }
}
