//! Signature decomposer
//!
//! Turns one [`PrototypeBlock`] into a [`FunctionDescriptor`]. The parameter
//! list is split on top-level commas only; a callback parameter such as
//! `void (CL_CALLBACK *pfn_notify)(const char *, void *)` keeps its inner list
//! intact and is reduced to its element type and identifier.

use crate::error::{Error, Result};
use crate::scan::PrototypeBlock;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"CL_API_CALL(\s+)(\w+)").unwrap());

static RETURN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"CL_API_ENTRY\s+(?:CL_[A-Z]*_PREFIX__VERSION[_0-9]*_DEPRECATED\s*)?(\w+(?:\s*\*)?)\s+CL_API_CALL",
    )
    .unwrap()
});

static SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+CL_[A-Z]*_SUFFIX__VERSION[_0-9A-Z]*").unwrap());

/// `/* name */` reduces to `name`
static COMMENT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\s*(\w*).*?\*/").unwrap());

static EXTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"extern\s+").unwrap());

/// `type (CL_CALLBACK * name)(...)`
static CALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(\w+(?:\s*\*)?)\s*\(\s*(?:CL_CALLBACK)?\s*\*\s*(\w+)\s*\)\s*\(.*\)$").unwrap()
});

/// `type name`, where the type ends in whitespace or `*`
static VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^([A-Za-z0-9_* ]*[\s*])(\w+)$").unwrap());

/// How an entry point is reached at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// Guaranteed by every implementation: resolved once, cached
    Static,
    /// Optional extension: resolved through the extension lookup on every call
    Extension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Value,
    /// Function pointer; `ty` holds the pointed-to function's return type
    Callback,
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Normalized spelling, e.g. `const cl_device_id *`
    pub ty: String,
    pub name: String,
    pub kind: ParamKind,
}

impl Parameter {
    pub fn value(ty: &str, name: &str) -> Self {
        Self {
            ty: normalize_type(ty),
            name: name.to_string(),
            kind: ParamKind::Value,
        }
    }

    pub fn callback(ty: &str, name: &str) -> Self {
        Self {
            ty: normalize_type(ty),
            name: name.to_string(),
            kind: ParamKind::Callback,
        }
    }

    pub fn is_callback(&self) -> bool {
        self.kind == ParamKind::Callback
    }

    pub fn is_pointer(&self) -> bool {
        self.is_callback() || self.ty.contains('*')
    }

    pub fn is_const(&self) -> bool {
        is_const_type(&self.ty)
    }

    /// Type with one level of pointer and a leading `const` removed
    pub fn base_type(&self) -> &str {
        base_type(&self.ty)
    }
}

/// `const char **` -> `char *`, `const cl_event *` -> `cl_event`
pub fn base_type(ty: &str) -> &str {
    let ty = ty.trim();
    let ty = ty.strip_suffix('*').unwrap_or(ty).trim();
    ty.strip_prefix("const ").unwrap_or(ty).trim()
}

/// `cl_uint *` -> `cl_uint`, keeping any `const`
pub fn pointee_type(ty: &str) -> &str {
    let ty = ty.trim();
    ty.strip_suffix('*').unwrap_or(ty).trim()
}

pub fn is_const_type(ty: &str) -> bool {
    ty.trim_start().starts_with("const ")
}

/// Collapse whitespace and spell pointers as `T *`, `T **`
pub fn normalize_type(ty: &str) -> String {
    let mut out = String::with_capacity(ty.len());
    for word in ty.split_whitespace() {
        for (i, part) in word.split('*').enumerate() {
            if i > 0 {
                if !out.ends_with('*') && !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                out.push('*');
            }
            if !part.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(part);
            }
        }
    }
    out
}

/// A decomposed entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub return_type: String,
    /// Call-site order
    pub params: Vec<Parameter>,
    pub dispatch: Dispatch,
    /// Cleaned declaration: comments reduced, suffix and `;` removed
    pub declaration: String,
}

impl FunctionDescriptor {
    pub fn is_core_api(&self) -> bool {
        self.dispatch == Dispatch::Static
    }

    pub fn returns_void(&self) -> bool {
        self.return_type == "void"
    }

    /// Fails when the descriptor cannot produce a wrapper at all
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::structural("<unnamed>", "missing entry point name"));
        }
        if self.return_type.trim().is_empty() {
            return Err(Error::structural(&self.name, "missing return type"));
        }
        if self.declaration.trim().is_empty() {
            return Err(Error::structural(&self.name, "missing declaration text"));
        }
        Ok(())
    }

    /// Last parameter spelled exactly `ty`
    pub fn last_param_of(&self, ty: &str) -> Option<&Parameter> {
        self.params.iter().rev().find(|p| p.ty == ty)
    }

    /// First parameter spelled exactly `ty`
    pub fn first_param_of(&self, ty: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.ty == ty)
    }

    /// Trailing error-code output, e.g. `cl_int * errcode_ret`
    pub fn errcode_param(&self) -> Option<&Parameter> {
        self.params
            .last()
            .filter(|p| p.ty == "cl_int *" || p.ty == "int *")
    }

    /// Whether the call reports a status (return value or errcode output)
    pub fn has_status(&self) -> bool {
        self.return_type == "cl_int" || self.errcode_param().is_some()
    }

    /// C expression holding the call's status after dispatch
    pub fn status_expr(&self) -> Option<String> {
        if self.return_type == "cl_int" {
            Some("retval".into())
        } else {
            self.errcode_param().map(|p| format!("*{}", p.name))
        }
    }

    pub fn typedef_name(&self) -> String {
        format!("CLINT_{}_FN", self.name.to_uppercase())
    }

    pub fn pointer_name(&self) -> String {
        format!("clint_{}_ptr", self.name)
    }

    /// `typedef cl_int (CL_API_CALL *CLINT_CLFOO_FN)(...);`
    pub fn typedef(&self) -> String {
        let decl = EXTERN.replace(&self.declaration, "");
        let decl = NAME.replace(&decl, format!("(CL_API_CALL *{})", self.typedef_name()).as_str());
        format!("typedef {};", decl)
    }

    /// Definition header with the name wrapped in the `F()` export macro
    pub fn definition_header(&self) -> String {
        NAME.replace(&self.declaration, "CL_API_CALL${1}F(${2})")
            .into_owned()
    }

    pub fn call_args(&self) -> String {
        self.params
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Why a prototype block could not be decomposed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposeError {
    pub name: Option<String>,
    pub reason: String,
}

impl std::fmt::Display for DecomposeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}: {}", name, self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

fn fail(name: Option<&str>, reason: impl Into<String>) -> DecomposeError {
    DecomposeError {
        name: name.map(str::to_string),
        reason: reason.into(),
    }
}

/// Decompose one prototype block
pub fn decompose(block: &PrototypeBlock) -> std::result::Result<FunctionDescriptor, DecomposeError> {
    let name = NAME
        .captures(&block.text)
        .map(|c| c[2].to_string())
        .ok_or_else(|| fail(None, "no `CL_API_CALL <name>` found"))?;

    let return_type = RETURN
        .captures(&block.text)
        .map(|c| normalize_type(&c[1]))
        .ok_or_else(|| fail(Some(&name), "no return type before `CL_API_CALL`"))?;

    let cleaned = COMMENT_WORD.replace_all(&block.text, "$1");
    let cleaned = SUFFIX.replace_all(&cleaned, "");
    let declaration = cleaned.trim_end().trim_end_matches(';').trim_end().to_string();

    let list = parameter_list(&declaration, &name)?;
    let params = split_top_level(list)
        .into_iter()
        .map(|piece| parse_parameter(piece, &name))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let params = match params.as_slice() {
        [only] if only.is_none() => Vec::new(),
        _ => params
            .into_iter()
            .map(|p| p.ok_or_else(|| fail(Some(&name), "`void` mixed with named parameters")))
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    Ok(FunctionDescriptor {
        name,
        return_type,
        params,
        dispatch: if block.core {
            Dispatch::Static
        } else {
            Dispatch::Extension
        },
        declaration,
    })
}

/// Text between the parentheses that follow the entry point name
fn parameter_list<'a>(declaration: &'a str, name: &str) -> std::result::Result<&'a str, DecomposeError> {
    let name_at = NAME
        .captures(declaration)
        .and_then(|c| c.get(2))
        .map(|m| m.end())
        .ok_or_else(|| fail(Some(name), "name lost while cleaning"))?;
    let rest = &declaration[name_at..];
    let open = rest
        .find('(')
        .ok_or_else(|| fail(Some(name), "no parameter list"))?;

    let mut depth = 0usize;
    for (i, ch) in rest[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&rest[open + 1..open + i]);
                }
            }
            _ => {}
        }
    }
    Err(fail(Some(name), "unbalanced parameter list"))
}

/// Split on commas outside any parentheses
fn split_top_level(list: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in list.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(list[start..].trim());
    pieces
}

/// `None` for a lone `void`
fn parse_parameter(piece: &str, func: &str) -> std::result::Result<Option<Parameter>, DecomposeError> {
    let piece = piece.split_whitespace().collect::<Vec<_>>().join(" ");
    let piece = piece.as_str();
    if piece == "void" || piece.is_empty() {
        return Ok(None);
    }
    if piece.contains('(') {
        let c = CALLBACK
            .captures(piece)
            .ok_or_else(|| fail(Some(func), format!("unrecognized callback parameter `{}`", piece)))?;
        return Ok(Some(Parameter::callback(&c[1], &c[2])));
    }
    let c = VALUE
        .captures(piece)
        .ok_or_else(|| fail(Some(func), format!("unnamed parameter `{}`", piece)))?;
    if c[1].trim().is_empty() {
        return Err(fail(Some(func), format!("parameter `{}` has no type", piece)));
    }
    Ok(Some(Parameter::value(&c[1], &c[2])))
}
