//! printf-format selection shared by the wrapper and stringifier synthesizers
//!
//! [`render`] maps a C type spelling plus an expression to the
//! `(format, argument)` pair written into a `clint_log`/`clint_string_sprintf`
//! call. The rules are tried in order:
//!
//! 1. callbacks print as an address
//! 2. active composites print through their field-expansion stringifier
//!    (const pointer on entry, non-const pointer on exit, never for fields)
//! 3. family types print through the family stringifier
//! 4. `const char *` prints a shortened copy of the text
//! 5. on exit, a data pointer is dereferenced, guarded against NULL
//! 6. any other pointer prints as an address
//! 7. scalars use [`scalar_format`], unknown ones print as an address

use crate::classify::{short_name, TypeKnowledge};
use crate::signature::{base_type, is_const_type, pointee_type, Parameter};

/// Fixed printf conversions for plain scalar and handle types
const SCALAR_FORMATS: &[(&str, &str)] = &[
    ("int", "%d"),
    ("long", "%ld"),
    ("cl_int", "%d"),
    ("cl_long", "%ld"),
    ("cl_uint", "%u"),
    ("cl_ulong", "%lu"),
    ("size_t", "%u"),
    ("cl_platform_id", "%p"),
    ("cl_device_id", "%p"),
    ("cl_context", "%p"),
    ("cl_command_queue", "%p"),
    ("cl_mem", "%p"),
    ("cl_program", "%p"),
    ("cl_kernel", "%p"),
    ("cl_event", "%p"),
    ("cl_sampler", "%p"),
    ("cl_float", "%f"),
    ("cl_bool", "%u"),
    ("cl_bitfield", "%lu"),
    ("cl_GLuint", "%u"),
    ("cl_GLint", "%d"),
    ("cl_GLenum", "%u"),
    ("cl_gl_object_type", "%u"),
    ("cl_GLsync", "%p"),
    ("va_list", "%p"),
];

const OPAQUE: &str = "%p";

pub fn scalar_format(ty: &str) -> Option<&'static str> {
    SCALAR_FORMATS
        .iter()
        .find(|(name, _)| *name == ty)
        .map(|(_, fmt)| *fmt)
}

/// A composite type printed field by field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructFormat {
    pub name: &'static str,
    /// (field type, field name), declaration order
    pub fields: &'static [(&'static str, &'static str)],
}

pub const STRUCT_FORMATS: &[StructFormat] = &[
    StructFormat {
        name: "cl_buffer_region",
        fields: &[("size_t", "origin"), ("size_t", "size")],
    },
    StructFormat {
        name: "cl_image_desc",
        fields: &[
            ("cl_mem_object_type", "image_type"),
            ("size_t", "image_width"),
            ("size_t", "image_height"),
            ("size_t", "image_depth"),
            ("size_t", "image_array_size"),
            ("size_t", "image_row_pitch"),
            ("size_t", "image_slice_pitch"),
            ("cl_uint", "num_mip_levels"),
            ("cl_uint", "num_samples"),
            ("cl_mem", "buffer"),
        ],
    },
    StructFormat {
        name: "cl_image_format",
        fields: &[
            ("cl_channel_order", "image_channel_order"),
            ("cl_channel_type", "image_channel_data_type"),
        ],
    },
];

pub fn struct_format(name: &str) -> Option<&'static StructFormat> {
    STRUCT_FORMATS.iter().find(|s| s.name == name)
}

/// Where a value is being printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Entry trace: arguments as passed in
    Entry,
    /// Exit trace: results written through output pointers
    Exit,
    /// Member of a composite being expanded
    Field,
}

/// One `(format, argument)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub conversion: String,
    pub arg: String,
}

impl Rendered {
    fn new(conversion: &str, arg: impl Into<String>) -> Self {
        Self {
            conversion: conversion.to_string(),
            arg: arg.into(),
        }
    }

    fn is_string(&self) -> bool {
        self.conversion == "%s"
    }
}

/// Render a parameter; callbacks always print as an address
pub fn render_param(param: &Parameter, expr: &str, dir: Direction, kb: &TypeKnowledge) -> Rendered {
    if param.is_callback() {
        return Rendered::new(OPAQUE, expr);
    }
    render(&param.ty, expr, dir, kb)
}

/// Render `expr` of type `ty`
pub fn render(ty: &str, expr: &str, dir: Direction, kb: &TypeKnowledge) -> Rendered {
    let ty = ty.trim();
    let pointer = ty.ends_with('*');

    if pointer {
        let base = base_type(ty);
        let composite_allowed = match dir {
            Direction::Entry => is_const_type(ty),
            Direction::Exit => !is_const_type(ty),
            Direction::Field => false,
        };
        if composite_allowed && kb.is_composite_active(base) && struct_format(base).is_some() {
            return Rendered::new("%s", format!("clint_string_{}({})", short_name(base), expr));
        }
    }

    if let Some(family) = kb.family(ty) {
        return Rendered::new("%s", format!("clint_string_{}({})", family.short_name(), expr));
    }

    if ty == "const char *" {
        return Rendered::new("%s", format!("clint_string_shorten({})", expr));
    }

    if pointer {
        if dir == Direction::Exit && base_type(ty) != "void" {
            let inner = render(pointee_type(ty), &format!("*{}", expr), Direction::Field, kb);
            let absent = if inner.is_string() { "\"NULL\"" } else { "0" };
            return Rendered {
                arg: format!("({} ? {} : {})", expr, inner.arg, absent),
                conversion: inner.conversion,
            };
        }
        return Rendered::new(OPAQUE, expr);
    }

    Rendered::new(scalar_format(ty).unwrap_or(OPAQUE), expr)
}

/// Join rendered pieces into `"fmt", args...` for a C variadic call
pub fn printf_args(format: &str, pieces: &[Rendered]) -> String {
    let mut out = format!("\"{}\"", format);
    for piece in pieces {
        out.push_str(", ");
        out.push_str(&piece.arg);
    }
    out
}
