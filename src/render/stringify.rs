//! Value-to-text functions for families and composites

use super::writer::CodeWriter;
use crate::classify::{short_name, FamilyKind, TypeFamily, TypeKnowledge};
use crate::format::{self, render, Direction, StructFormat};
use std::collections::BTreeSet;

/// Prototype lines for the types header: families, then composites
pub fn declarations(kb: &TypeKnowledge) -> Vec<String> {
    let families = kb.families().map(|f| format!("{};", family_signature(f)));
    let composites = active_composites(kb).map(|s| format!("{};", composite_signature(s)));
    families.chain(composites).collect()
}

/// Every stringifier body: families, then composites
pub fn definitions(kb: &TypeKnowledge) -> Vec<String> {
    let families = kb.families().map(family_stringifier);
    let composites = active_composites(kb).map(|s| composite_stringifier(s, kb));
    families.chain(composites).collect()
}

fn active_composites(kb: &TypeKnowledge) -> impl Iterator<Item = &'static StructFormat> + '_ {
    kb.composites().filter_map(format::struct_format)
}

fn family_signature(family: &TypeFamily) -> String {
    format!(
        "const char *clint_string_{}({} v)",
        family.short_name(),
        family.c_type()
    )
}

fn composite_signature(composite: &StructFormat) -> String {
    format!(
        "const char *clint_string_{}(const {} *v)",
        short_name(composite.name),
        composite.name
    )
}

pub fn family_stringifier(family: &TypeFamily) -> String {
    let mut w = CodeWriter::new();
    w.line(family_signature(family));
    w.line("{");
    w.indent();
    match family.kind() {
        FamilyKind::Bitmask => {
            let members = family.display_members();
            w.line("const char *s = \"\";");
            w.line(format!("{} rest = v;", family.c_type()));
            w.line("if (v == 0)");
            w.line("\treturn \"0\";");
            let mut seen = BTreeSet::new();
            for m in members.iter().filter(|m| seen.insert(m.value())) {
                w.line(format!("if (v == {})", m.name));
                w.line(format!("\treturn \"{}\";", m.name));
            }
            for m in &members {
                w.line(format!("if ((v & {0}) == {0}) {{ /* {1} */", m.name, m.text));
                w.indent();
                w.line(format!("rest &= ~({});", m.name));
                w.line(format!("s = clint_string_join(s, \"{}\", \" | \");", m.name));
                w.close();
            }
            w.line("if (rest != 0)");
            w.line("\ts = clint_string_join(s, clint_string_sprintf(\"0x%llX\", (unsigned long long)rest), \" | \");");
            w.line("return s;");
        }
        FamilyKind::Enumeration => {
            w.open("switch (v)");
            w.dedent();
            for m in family.display_members() {
                w.line(format!("case {}: /* {} */", m.name, m.text));
                w.line(format!("\treturn \"{}\";", m.name));
            }
            w.line("default:");
            w.line(format!(
                "\treturn clint_string_sprintf(\"Unknown {} 0x%X\", (unsigned int)v);",
                family.name
            ));
            w.indent();
            w.close();
        }
    }
    w.dedent();
    w.line("}");
    w.finish()
}

pub fn composite_stringifier(composite: &StructFormat, kb: &TypeKnowledge) -> String {
    let fields: Vec<_> = composite
        .fields
        .iter()
        .map(|(ty, name)| render(ty, &format!("v->{}", name), Direction::Field, kb))
        .collect();
    let conversion = fields.iter().map(|f| f.conversion.as_str()).collect::<Vec<_>>().join(",");

    let mut w = CodeWriter::new();
    w.line(composite_signature(composite));
    w.line("{");
    w.indent();
    w.line("if (v == NULL)");
    w.line("\treturn \"NULL\";");
    w.line(format!(
        "return clint_string_sprintf({});",
        format::printf_args(&conversion, &fields)
    ));
    w.dedent();
    w.line("}");
    w.finish()
}
