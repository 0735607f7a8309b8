//! Run orchestration
//!
//! Headers are scanned in the order given. Each scan feeds both the
//! descriptor list and the knowledge builder; [`Generator::finish`] freezes
//! the knowledge and renders the artifacts.

use crate::classify::{KnowledgeBuilder, TypeKnowledge};
use crate::config::GeneratorConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::Result;
use crate::render::{render_artifacts, Artifacts};
use crate::scan::{resolve_header, resolve_include_dir, HeaderSource};
use crate::signature::{decompose, FunctionDescriptor};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct Generation {
    pub artifacts: Artifacts,
    pub diagnostics: Vec<Diagnostic>,
    pub knowledge: TypeKnowledge,
    /// Entry points in scanned order
    pub functions: Vec<FunctionDescriptor>,
    /// Hex SHA-256 over the scanned header names and contents
    pub digest: String,
}

/// Accumulates scanned headers for one run
pub struct Generator {
    config: GeneratorConfig,
    functions: Vec<FunctionDescriptor>,
    seen: HashSet<String>,
    builder: KnowledgeBuilder,
    diagnostics: Diagnostics,
    hasher: Sha256,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            functions: Vec::new(),
            seen: HashSet::new(),
            builder: KnowledgeBuilder::new(),
            diagnostics: Diagnostics::new(),
            hasher: Sha256::new(),
        }
    }

    /// Scan one loaded header
    pub fn scan(&mut self, source: &HeaderSource) {
        let core = source.is_core(&self.config);
        tracing::debug!(header = %source.name, core, "scanning header");

        self.hasher.update(source.name.as_bytes());
        self.hasher.update([0u8]);
        self.hasher.update(source.text.as_bytes());

        let lines = source.lines();
        self.builder
            .classify_header(&source.name, core, &lines, &self.config, &mut self.diagnostics);

        for block in source.prototypes(&self.config) {
            match decompose(&block) {
                Ok(func) => {
                    if !self.seen.insert(func.name.clone()) {
                        tracing::debug!(function = %func.name, header = %source.name, "duplicate prototype, keeping first");
                        continue;
                    }
                    self.functions.push(func);
                }
                Err(e) => {
                    let symbol = e.name.clone().unwrap_or_else(|| "<unknown>".to_string());
                    self.diagnostics
                        .report(DiagnosticKind::MalformedPrototype, symbol, e.reason);
                }
            }
        }
    }

    /// Load and scan `path`; a missing optional header contributes nothing
    pub fn scan_path(&mut self, path: &Path) -> Result<()> {
        if let Some(source) = HeaderSource::load(path, &self.config)? {
            self.scan(&source);
        }
        Ok(())
    }

    /// Freeze the knowledge base and render the artifacts
    pub fn finish(self) -> Result<Generation> {
        let digest = hex::encode(self.hasher.finalize());
        let knowledge = self.builder.freeze();
        let artifacts = render_artifacts(&self.functions, &knowledge, &self.config, &digest)?;
        tracing::debug!(
            functions = self.functions.len(),
            families = knowledge.families().count(),
            diagnostics = self.diagnostics.len(),
            "generation complete"
        );
        Ok(Generation {
            artifacts,
            diagnostics: self.diagnostics.into_vec(),
            knowledge,
            functions: self.functions,
            digest,
        })
    }
}

/// Scan `headers` (resolved against `include_dir`) and render the artifacts
pub fn generate<P: AsRef<Path>>(
    headers: &[P],
    include_dir: Option<&Path>,
    config: GeneratorConfig,
) -> Result<Generation> {
    config.validate()?;
    let include_dir = include_dir.map(resolve_include_dir);
    let mut generator = Generator::new(config);
    for header in headers {
        let path = resolve_header(header.as_ref(), include_dir.as_deref());
        generator.scan_path(&path)?;
    }
    generator.finish()
}
