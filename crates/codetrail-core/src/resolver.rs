//! Document resolver seam.
//!
//! Resolving an opaque editor handle into document metadata is an injected
//! capability: the dispatcher consults it only when opening a typing or
//! reading interval for a source it is not already tracking. A handle with
//! no resolvable document degrades to "no interval opened" — never an
//! error.

use std::collections::HashMap;

use crate::types::{DocumentRef, SourceId};

pub trait DocumentResolver {
    fn resolve(&mut self, source: &SourceId) -> Option<DocumentRef>;
}

/// Derives document metadata from the handle itself, for host adapters
/// that encode a workspace-relative path in the handle.
#[derive(Debug, Default)]
pub struct PathResolver {
    project: Option<String>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
        }
    }
}

impl DocumentResolver for PathResolver {
    fn resolve(&mut self, source: &SourceId) -> Option<DocumentRef> {
        let path = source.as_str();
        if path.is_empty() {
            return None;
        }
        let file_name = path.rsplit('/').next().unwrap_or(path).to_string();
        Some(DocumentRef {
            file_name,
            project: self.project.clone(),
            sloc: None,
        })
    }
}

/// Explicit handle-to-document map. Unknown handles resolve to `None`,
/// which exercises the dispatcher's degrade-to-no-op path; embedding hosts
/// pre-register documents as editors open.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    documents: HashMap<SourceId, DocumentRef>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: SourceId, document: DocumentRef) {
        self.documents.insert(source, document);
    }

    pub fn with_document(mut self, source: SourceId, document: DocumentRef) -> Self {
        self.insert(source, document);
        self
    }
}

impl DocumentResolver for MemoryResolver {
    fn resolve(&mut self, source: &SourceId) -> Option<DocumentRef> {
        self.documents.get(source).cloned()
    }
}

// ─── Tests ────────────────────────────────────────────────────────
