//! Generator configuration
//!
//! Every field has a default matching the stock OpenCL header layout, so a
//! config file is only needed for non-standard SDKs. Loaded from YAML with
//! `--config`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Header basenames whose entry points are guaranteed present in every
    /// implementation and therefore dispatch through a cached pointer
    pub core_headers: Vec<String>,

    /// Header basenames silently skipped when absent
    pub optional_headers: Vec<String>,

    /// Hexadecimal constants at or above this value join the token family
    pub token_threshold: u64,

    /// Vendor tags whose later token aliases are dropped in favor of the
    /// first-declared name
    pub alias_vendor_tags: Vec<String>,

    /// Entry point used to resolve extension functions on every call
    pub extension_resolver: String,

    /// Directory whose templates override the embedded artifact shells
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            core_headers: vec!["cl.h".into()],
            optional_headers: vec![
                "cl_dx9_media_sharing.h".into(),
                "cl_d3d10.h".into(),
                "cl_d3d11.h".into(),
            ],
            token_threshold: 0x1000,
            alias_vendor_tags: vec!["AMD".into(), "KHR".into(), "NV".into()],
            extension_resolver: "clGetExtensionFunctionAddress".into(),
            template_dir: None,
        }
    }
}

impl GeneratorConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_norway::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.core_headers.is_empty() {
            return Err(Error::Config("core_headers must name at least one header".into()));
        }
        if self.extension_resolver.trim().is_empty() {
            return Err(Error::Config("extension_resolver must not be empty".into()));
        }
        if let Some(dir) = &self.template_dir {
            if !dir.is_dir() {
                return Err(Error::Config(format!(
                    "template_dir {} is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    pub fn is_core_header(&self, basename: &str) -> bool {
        self.core_headers.iter().any(|h| h == basename)
    }

    pub fn is_optional_header(&self, basename: &str) -> bool {
        self.optional_headers.iter().any(|h| h == basename)
    }

    /// Whether `symbol` ends in one of the alias vendor tags (`CL_FOO_KHR`)
    pub fn has_alias_vendor_tag(&self, symbol: &str) -> bool {
        symbol
            .rsplit('_')
            .next()
            .is_some_and(|tag| self.alias_vendor_tags.iter().any(|v| v == tag))
    }
}
