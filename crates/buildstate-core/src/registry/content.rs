//! Default content per kind and field-level patch merging.
//!
//! The content types live in `buildstate-types`; this module provides the
//! per-kind defaults and an extension trait (`ContentExt`) that applies a
//! streamed `ContentPatch` to existing content. Merging is shallow: a field
//! present in the patch replaces the old field, absent fields are kept.

use buildstate_types::build::BuildKind;
use buildstate_types::content::{
    BuildContent, ContentPatch, DiagramContent, FlashcardsContent, GenericContent,
    MindMapContent, QuizContent,
};

/// Initial content for a freshly created build of `kind`.
pub fn default_content(kind: &BuildKind) -> BuildContent {
    match kind {
        BuildKind::MindMap => BuildContent::MindMap(MindMapContent::default()),
        BuildKind::Quiz => BuildContent::Quiz(QuizContent::default()),
        BuildKind::Flashcards => BuildContent::Flashcards(FlashcardsContent::default()),
        BuildKind::Diagram => BuildContent::Diagram(DiagramContent::default()),
        _ => BuildContent::Generic(GenericContent::default()),
    }
}

/// Extension trait for merging streamed patches into `BuildContent`.
pub trait ContentExt {
    /// Apply `patch` field by field.
    ///
    /// Returns `false` (leaving content untouched) when the patch variant
    /// does not match the content variant.
    fn apply_patch(&mut self, patch: ContentPatch) -> bool;
}

impl ContentExt for BuildContent {
    fn apply_patch(&mut self, patch: ContentPatch) -> bool {
        match (self, patch) {
            (BuildContent::MindMap(content), ContentPatch::MindMap(patch)) => {
                if let Some(central_topic) = patch.central_topic {
                    content.central_topic = central_topic;
                }
                if let Some(nodes) = patch.nodes {
                    content.nodes = nodes;
                }
                true
            }
            (BuildContent::Quiz(content), ContentPatch::Quiz(patch)) => {
                if let Some(questions) = patch.questions {
                    content.questions = questions;
                }
                true
            }
            (BuildContent::Flashcards(content), ContentPatch::Flashcards(patch)) => {
                if let Some(cards) = patch.cards {
                    content.cards = cards;
                }
                true
            }
            (BuildContent::Diagram(content), ContentPatch::Diagram(patch)) => {
                if let Some(diagram_type) = patch.diagram_type {
                    content.diagram_type = diagram_type;
                }
                if let Some(mermaid_code) = patch.mermaid_code {
                    content.mermaid_code = mermaid_code;
                }
                true
            }
            (BuildContent::Generic(content), ContentPatch::Generic(patch)) => {
                content.fields.extend(patch.fields);
                true
            }
            _ => false,
        }
    }
}
