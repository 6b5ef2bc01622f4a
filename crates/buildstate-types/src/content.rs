//! Kind-specific build content and the partial patches streamed into it.
//!
//! Content is a closed sum type: the four documented artifact kinds each
//! have a dedicated shape, and every other kind carries a generic JSON
//! object. Individual items (nodes, questions, cards) stay opaque JSON
//! values -- their schema belongs to the content-generation pipeline.
//!
//! Each content shape has a matching patch type whose `Option` fields
//! describe which top-level fields a stream update replaces.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default Mermaid diagram type for new diagram builds.
pub const DEFAULT_DIAGRAM_TYPE: &str = "flowchart";

/// Content of a build, one variant per content shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum BuildContent {
    MindMap(MindMapContent),
    Quiz(QuizContent),
    Flashcards(FlashcardsContent),
    Diagram(DiagramContent),
    Generic(GenericContent),
}

impl BuildContent {
    /// Short name of the content shape, used in logs.
    pub fn format_name(&self) -> &'static str {
        match self {
            BuildContent::MindMap(_) => "mind_map",
            BuildContent::Quiz(_) => "quiz",
            BuildContent::Flashcards(_) => "flashcards",
            BuildContent::Diagram(_) => "diagram",
            BuildContent::Generic(_) => "generic",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapContent {
    pub central_topic: String,
    pub nodes: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizContent {
    pub questions: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardsContent {
    pub cards: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramContent {
    #[serde(rename = "type")]
    pub diagram_type: String,
    pub mermaid_code: String,
}

impl Default for DiagramContent {
    fn default() -> Self {
        Self {
            diagram_type: DEFAULT_DIAGRAM_TYPE.to_string(),
            mermaid_code: String::new(),
        }
    }
}

/// Content for kinds without a dedicated shape (timeline, summary, chart, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericContent {
    pub fields: Map<String, Value>,
}

/// A partial update to build content.
///
/// The variant must match the entry's content variant; fields left as
/// `None` keep their current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ContentPatch {
    MindMap(MindMapPatch),
    Quiz(QuizPatch),
    Flashcards(FlashcardsPatch),
    Diagram(DiagramPatch),
    Generic(GenericPatch),
}

impl ContentPatch {
    pub fn format_name(&self) -> &'static str {
        match self {
            ContentPatch::MindMap(_) => "mind_map",
            ContentPatch::Quiz(_) => "quiz",
            ContentPatch::Flashcards(_) => "flashcards",
            ContentPatch::Diagram(_) => "diagram",
            ContentPatch::Generic(_) => "generic",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapPatch {
    pub central_topic: Option<String>,
    pub nodes: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPatch {
    pub questions: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardsPatch {
    pub cards: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramPatch {
    #[serde(rename = "type")]
    pub diagram_type: Option<String>,
    pub mermaid_code: Option<String>,
}

/// Top-level keys to overwrite in generic content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericPatch {
    pub fields: Map<String, Value>,
}
