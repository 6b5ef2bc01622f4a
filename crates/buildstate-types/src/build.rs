//! Build entry, kind, and lifecycle status types.
//!
//! A `BuildEntry` tracks one artifact being generated live during a tutoring
//! session: its lifecycle status, streamed chunks, progress, and the
//! partially-built content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::content::{BuildContent, ContentPatch};

/// Artifact type tag.
///
/// The four documented kinds have dedicated content shapes; every other
/// tag maps to generic content. Unknown tags round-trip through `Other`,
/// which can only be built by parsing (see [`BuildKind::from_tag`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildKind {
    MindMap,
    Quiz,
    Flashcards,
    Diagram,
    Summary,
    Timeline,
    Chart,
    Formula,
    Demo,
    Webcam,
    Pdf,
    Homework,
    Search,
    Other(CustomKind),
}

/// A kind tag outside the named set, stored trimmed and lowercase.
///
/// Has no public constructor: a tag that names a known kind always parses
/// to that variant instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomKind(String);

impl CustomKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl BuildKind {
    /// Parse a kind tag, normalizing case and surrounding whitespace.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "mindmap" | "mind-map" | "mind_map" => BuildKind::MindMap,
            "quiz" => BuildKind::Quiz,
            "flashcards" | "flashcard" | "flashcard-deck" => BuildKind::Flashcards,
            "diagram" => BuildKind::Diagram,
            "summary" => BuildKind::Summary,
            "timeline" => BuildKind::Timeline,
            "chart" => BuildKind::Chart,
            "formula" => BuildKind::Formula,
            "demo" => BuildKind::Demo,
            "webcam" => BuildKind::Webcam,
            "pdf" => BuildKind::Pdf,
            "homework" => BuildKind::Homework,
            "search" => BuildKind::Search,
            _ => BuildKind::Other(CustomKind(tag)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BuildKind::MindMap => "mindmap",
            BuildKind::Quiz => "quiz",
            BuildKind::Flashcards => "flashcards",
            BuildKind::Diagram => "diagram",
            BuildKind::Summary => "summary",
            BuildKind::Timeline => "timeline",
            BuildKind::Chart => "chart",
            BuildKind::Formula => "formula",
            BuildKind::Demo => "demo",
            BuildKind::Webcam => "webcam",
            BuildKind::Pdf => "pdf",
            BuildKind::Homework => "homework",
            BuildKind::Search => "search",
            BuildKind::Other(tag) => tag.as_str(),
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BuildKind::from_tag(s))
    }
}

impl From<String> for BuildKind {
    fn from(s: String) -> Self {
        BuildKind::from_tag(&s)
    }
}

impl From<BuildKind> for String {
    fn from(kind: BuildKind) -> Self {
        kind.to_string()
    }
}

/// Lifecycle status of a build entry.
///
/// Transitions only move forward:
/// `Initializing -> Building -> {Completed | Error | Cancelled}`,
/// with the `Building` hop optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Initializing,
    Building,
    Completed,
    Error,
    Cancelled,
}

impl BuildStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [BuildStatus; 5] = [
        BuildStatus::Initializing,
        BuildStatus::Building,
        BuildStatus::Completed,
        BuildStatus::Error,
        BuildStatus::Cancelled,
    ];

    /// Whether generation has ended (successfully or not).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BuildStatus::Completed | BuildStatus::Error | BuildStatus::Cancelled
        )
    }

    /// Whether the entry is still receiving stream updates.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStatus::Initializing => write!(f, "initializing"),
            BuildStatus::Building => write!(f, "building"),
            BuildStatus::Completed => write!(f, "completed"),
            BuildStatus::Error => write!(f, "error"),
            BuildStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for BuildStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initializing" => Ok(BuildStatus::Initializing),
            "building" => Ok(BuildStatus::Building),
            "completed" => Ok(BuildStatus::Completed),
            "error" => Ok(BuildStatus::Error),
            "cancelled" => Ok(BuildStatus::Cancelled),
            other => Err(format!("invalid build status: '{other}'")),
        }
    }
}

/// One tracked artifact-construction job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildEntry {
    pub id: String,
    pub kind: BuildKind,
    pub session_id: String,
    pub persona_id: String,
    pub title: String,
    pub subject: Option<String>,
    pub status: BuildStatus,
    /// Always within `0..=100`.
    pub progress: u8,
    /// Always equal to `raw_chunks.len()`.
    pub chunks_received: usize,
    pub raw_chunks: Vec<String>,
    pub content: BuildContent,
    /// Set only when `status` is `Error`.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for registering a new build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBuild {
    pub id: String,
    pub kind: BuildKind,
    pub session_id: String,
    pub persona_id: String,
    pub title: String,
    pub subject: Option<String>,
}

impl NewBuild {
    pub fn new(
        id: impl Into<String>,
        kind: BuildKind,
        session_id: impl Into<String>,
        persona_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            session_id: session_id.into(),
            persona_id: persona_id.into(),
            title: title.into(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// A streamed mutation to an in-flight build.
///
/// Every field is optional; absent fields leave the entry untouched.
/// `progress` is accepted out of range and clamped by the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildUpdate {
    pub progress: Option<i64>,
    pub chunk: Option<String>,
    pub content: Option<ContentPatch>,
}

impl BuildUpdate {
    pub fn progress(progress: i64) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn chunk(chunk: impl Into<String>) -> Self {
        Self {
            chunk: Some(chunk.into()),
            ..Self::default()
        }
    }

    pub fn content(patch: ContentPatch) -> Self {
        Self {
            content: Some(patch),
            ..Self::default()
        }
    }

    pub fn with_chunk(mut self, chunk: impl Into<String>) -> Self {
        self.chunk = Some(chunk.into());
        self
    }

    pub fn with_content(mut self, patch: ContentPatch) -> Self {
        self.content = Some(patch);
        self
    }
}
