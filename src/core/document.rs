use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user-supplied technical document, read into memory before drafting.
/// Discarded once the drafting prompt has been composed.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
    pub mime_type: String,
}

/// Instruction for producing one illustrative diagram, as returned by the
/// text-generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    pub prompt: String,
    pub labels: Vec<String>,
    pub desc: String,
}

/// One rendered diagram. `image_data` holds the base64 payload returned by
/// the image model; an empty string means generation failed for this entry,
/// which is a valid terminal state rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub prompt: String,
    pub image_data: String,
    pub description: String,
}

impl Diagram {
    pub fn has_image(&self) -> bool {
        !self.image_data.is_empty()
    }

    pub fn failed(spec: &DiagramSpec) -> Self {
        Self {
            prompt: spec.prompt.clone(),
            image_data: String::new(),
            description: spec.desc.clone(),
        }
    }
}

/// The five narrative sections of a patent specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub field: String,
    pub background: String,
    pub summary: String,
    pub description: String,
    pub examples: String,
}

/// The structured payload the text model is asked to return: every scalar
/// section of the application plus the diagram requests to fan out on.
/// Field presence is enforced by deserialization; a response missing any
/// required field is a schema violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPayload {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub claims: Vec<String>,
    pub specification: Specification,
    #[serde(rename = "diagramPrompts")]
    pub diagram_requests: Vec<DiagramSpec>,
}

/// A completed patent application package. Assembled atomically once the
/// text result and every diagram attempt have settled; never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentDocument {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub claims: Vec<String>,
    pub specification: Specification,
    pub diagrams: Vec<Diagram>,
    pub created_at: DateTime<Utc>,
}

impl PatentDocument {
    /// How many diagrams actually carry image data, for history summaries.
    pub fn rendered_diagrams(&self) -> usize {
        self.diagrams.iter().filter(|d| d.has_image()).count()
    }
}
