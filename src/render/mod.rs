//! Artifact rendering
//!
//! Synthesizes the wrapper and stringifier bodies and places them into the
//! three artifact shells.

pub mod stringify;
pub mod tracking;
pub mod wrapper;
mod writer;

use crate::classify::TypeKnowledge;
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::signature::FunctionDescriptor;
use crate::templates::{self, FuncsSourceContext, FunctionView, TypesHeaderContext, TypesSourceContext};
use std::path::{Path, PathBuf};

pub use stringify::{composite_stringifier, family_stringifier};
pub use wrapper::render_wrapper;

/// File names of the artifacts, in emission order
pub const ARTIFACT_NAMES: [&str; 3] = [
    "clint_opencl_types.h",
    "clint_opencl_types.c",
    "clint_opencl_funcs.c",
];

/// The three generated files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub types_header: String,
    pub types_source: String,
    pub funcs_source: String,
}

impl Artifacts {
    /// (file name, contents) pairs in emission order
    pub fn files(&self) -> [(&'static str, &str); 3] {
        [
            (ARTIFACT_NAMES[0], self.types_header.as_str()),
            (ARTIFACT_NAMES[1], self.types_source.as_str()),
            (ARTIFACT_NAMES[2], self.funcs_source.as_str()),
        ]
    }

    /// All three files back to back, for stdout
    pub fn concatenated(&self) -> String {
        self.files().iter().map(|(_, text)| *text).collect()
    }

    /// Write every artifact into `dir`, returning the written paths
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|source| Error::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut written = Vec::with_capacity(ARTIFACT_NAMES.len());
        for (name, text) in self.files() {
            let path = dir.join(name);
            std::fs::write(&path, text).map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), bytes = text.len(), "wrote artifact");
            written.push(path);
        }
        Ok(written)
    }
}

/// Render all artifacts for `funcs` in scanned order.
///
/// Fails with [`Error::Structural`] before producing any output if a
/// descriptor lacks a name or return type.
pub fn render_artifacts(
    funcs: &[FunctionDescriptor],
    kb: &TypeKnowledge,
    config: &GeneratorConfig,
    digest: &str,
) -> Result<Artifacts> {
    for func in funcs {
        func.validate()?;
    }

    let custom;
    let env = match &config.template_dir {
        Some(dir) => {
            custom = templates::engine_with_override(dir);
            &custom
        }
        None => templates::engine(),
    };

    let header = TypesHeaderContext {
        digest: digest.to_string(),
        extension_includes: kb.extension_includes().to_vec(),
        declarations: stringify::declarations(kb),
    };
    let source = TypesSourceContext {
        digest: digest.to_string(),
        stringifiers: stringify::definitions(kb),
    };
    let funcs_ctx = FuncsSourceContext {
        digest: digest.to_string(),
        functions: funcs.iter().map(FunctionView::from).collect(),
        wrappers: funcs.iter().map(|f| render_wrapper(f, kb, config)).collect(),
    };

    Ok(Artifacts {
        types_header: templates::render(env, templates::TYPES_HEADER_TEMPLATE, &header)?,
        types_source: templates::render(env, templates::TYPES_SOURCE_TEMPLATE, &source)?,
        funcs_source: templates::render(env, templates::FUNCS_SOURCE_TEMPLATE, &funcs_ctx)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{Dispatch, Parameter};

    #[test]
    fn test_nameless_descriptor_is_fatal() {
        let func = FunctionDescriptor {
            name: String::new(),
            return_type: "cl_int".into(),
            params: vec![Parameter::value("cl_uint", "n")],
            dispatch: Dispatch::Static,
            declaration: String::new(),
        };
        let kb = TypeKnowledge::default();
        let err = render_artifacts(&[func], &kb, &GeneratorConfig::default(), "00").unwrap_err();
        assert!(matches!(err, Error::Structural { .. }));
    }

    #[test]
    fn test_write_to_dir_in_emission_order() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts {
            types_header: "h".into(),
            types_source: "c".into(),
            funcs_source: "f".into(),
        };
        let written = artifacts.write_to_dir(&dir.path().join("out")).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ARTIFACT_NAMES);
        assert_eq!(std::fs::read_to_string(&written[2]).unwrap(), "f");
        assert_eq!(artifacts.concatenated(), "hcf");
    }
}
