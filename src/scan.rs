//! Declaration scanner
//!
//! Purely textual recognition over the OpenCL header idiom. Two outputs per
//! header, both in source order:
//!
//! - prototype blocks: `extern CL_API_ENTRY ... CL_*_SUFFIX__VERSION_*;`
//! - lexed lines ([`HeaderLine`]) for the constant classifier
//!
//! Nothing is expanded or validated. Text that does not match one of the
//! patterns below is simply not recognized.

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `extern CL_API_ENTRY [CL_*_PREFIX__VERSION_*_DEPRECATED] ... CL_*_SUFFIX__VERSION_*[_DEPRECATED];`
///
/// Assumes every exported entry point carries both the entry macro and a
/// version suffix macro, and that no `;` appears inside the declaration.
static PROTOTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"extern\s+CL_API_ENTRY\s+(?:CL_[A-Z]*_PREFIX__VERSION[_0-9]*_DEPRECATED\s*)?[^;]*\s+CL_[A-Z]*_SUFFIX__VERSION[_0-9]*(?:_DEPRECATED)?\s*;",
    )
    .unwrap()
});

/// `#define CL_NAME 0x1234` or `#define CL_NAME -30`
static DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#define\s+(CL_[A-Za-z0-9_]+)\s+((0x[0-9A-Fa-f]+)|(-?[0-9]+))").unwrap()
});

/// `#define CL_NAME (1 << 4)`
static BITFIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#define\s+(CL_[A-Za-z0-9_]+)\s+(\(([0-9]+)\s*<<\s*([0-9]+)\))").unwrap()
});

/// A documentation comment that opens a line and names a type:
/// `/* cl_device_info */`, `/* Additional cl_device_info */`, `// cl_mem_flags`
static FAMILY_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:/\*\s*(?:Additional\s+)?(cl_[a-z0-9_]+)\s*.*\*/|//\s*(?:Additional\s+)?(cl_[a-z0-9_]+))")
        .unwrap()
});

/// Any complete block comment or line comment
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/\*.*\*/|//").unwrap());

/// `} cl_image_format;`
static STRUCT_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}\s*(cl_[a-z0-9_]+)\s*;").unwrap());

const MEM_FLAGS_COMMENT: &str = "cl_mem flag - bitfield";
const STATUS_SENTINEL: &str = "/* command execution status */";

/// Literal value of a constant definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Hex(u64),
    Decimal(i64),
    /// `(base << shift)`
    Shift { base: u64, shift: u32 },
}

impl Literal {
    /// Bit pattern of the literal as a 64-bit value (negative decimals wrap)
    pub fn value(&self) -> u64 {
        match *self {
            Literal::Hex(v) => v,
            Literal::Decimal(v) => v as u64,
            Literal::Shift { base, shift } => base.checked_shl(shift).unwrap_or(0),
        }
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, Literal::Shift { .. })
    }
}

/// One `#define` with its literal text preserved for emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub text: String,
    pub literal: Literal,
}

/// A header line as seen by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine {
    /// `#define CL_X <hex|decimal>`
    Define(Constant),
    /// `#define CL_X (a << b)`
    BitField(Constant),
    /// Documentation comment naming a type family (raw, uncorrected name)
    FamilyComment(String),
    /// `/* command execution status */`
    StatusSentinel,
    /// Any other comment line
    Comment,
    /// `} cl_xxx;`
    StructClose(String),
    /// Anything else, including blank lines
    Other,
}

impl HeaderLine {
    pub fn is_comment(&self) -> bool {
        matches!(
            self,
            HeaderLine::FamilyComment(_) | HeaderLine::StatusSentinel | HeaderLine::Comment
        )
    }
}

/// Lex one header line
pub fn lex_line(line: &str) -> HeaderLine {
    if let Some(c) = BITFIELD.captures(line) {
        let base = c[3].parse::<u64>();
        let shift = c[4].parse::<u32>();
        if let (Ok(base), Ok(shift)) = (base, shift) {
            return HeaderLine::BitField(Constant {
                name: c[1].to_string(),
                text: c[2].to_string(),
                literal: Literal::Shift { base, shift },
            });
        }
    }

    if let Some(c) = DEFINE.captures(line) {
        let literal = if let Some(hex) = c.get(3) {
            u64::from_str_radix(&hex.as_str()[2..], 16).ok().map(Literal::Hex)
        } else {
            c[2].parse::<i64>().ok().map(Literal::Decimal)
        };
        if let Some(literal) = literal {
            return HeaderLine::Define(Constant {
                name: c[1].to_string(),
                text: c[2].to_string(),
                literal,
            });
        }
    }

    if line.contains(STATUS_SENTINEL) {
        return HeaderLine::StatusSentinel;
    }

    if let Some(c) = FAMILY_COMMENT.captures(line) {
        if line.contains(MEM_FLAGS_COMMENT) {
            return HeaderLine::FamilyComment("cl_mem_flags".into());
        }
        if !line.contains("extension") {
            if let Some(name) = c.get(1).or_else(|| c.get(2)) {
                return HeaderLine::FamilyComment(name.as_str().to_string());
            }
        }
        return HeaderLine::Comment;
    }

    if COMMENT.is_match(line) {
        return HeaderLine::Comment;
    }

    if let Some(c) = STRUCT_CLOSE.captures(line) {
        return HeaderLine::StructClose(c[1].to_string());
    }

    HeaderLine::Other
}

/// One raw prototype as it appears in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrototypeBlock {
    pub text: String,
    /// Header the block came from
    pub header: String,
    /// Declared in a core header
    pub core: bool,
}

/// A loaded header file
#[derive(Debug, Clone)]
pub struct HeaderSource {
    pub path: PathBuf,
    /// File name without directories, e.g. `cl_ext.h`
    pub name: String,
    pub text: String,
}

impl HeaderSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            text: text.into(),
        }
    }

    /// Read `path`, or return `None` if it is a missing optional header
    pub fn load(path: &Path, config: &GeneratorConfig) -> Result<Option<Self>> {
        let name = basename(path);
        if !path.exists() && config.is_optional_header(&name) {
            tracing::debug!(header = %path.display(), "optional header absent, skipping");
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(Self {
            path: path.to_path_buf(),
            name,
            text,
        }))
    }

    pub fn is_core(&self, config: &GeneratorConfig) -> bool {
        config.is_core_header(&self.name)
    }

    /// Every prototype block, in order
    pub fn prototypes(&self, config: &GeneratorConfig) -> Vec<PrototypeBlock> {
        let core = self.is_core(config);
        PROTOTYPE
            .find_iter(&self.text)
            .map(|m| PrototypeBlock {
                text: m.as_str().to_string(),
                header: self.name.clone(),
                core,
            })
            .collect()
    }

    /// Every line, lexed, in order
    pub fn lines(&self) -> Vec<HeaderLine> {
        self.text.lines().map(lex_line).collect()
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Resolve the `--include-dir` argument to the directory holding the headers.
///
/// A `*.framework` bundle keeps its headers in `Headers/`; anything else is
/// assumed to be an include root with a `CL/` subfolder unless it already
/// names that folder.
pub fn resolve_include_dir(dir: &Path) -> PathBuf {
    let name = basename(dir);
    if name.ends_with(".framework") {
        dir.join("Headers")
    } else if name != "CL" {
        dir.join("CL")
    } else {
        dir.to_path_buf()
    }
}

/// Resolve a header argument against the (already resolved) include dir
pub fn resolve_header(header: &Path, include_dir: Option<&Path>) -> PathBuf {
    match include_dir {
        Some(dir) if !header.is_absolute() => dir.join(header),
        _ => header.to_path_buf(),
    }
}
