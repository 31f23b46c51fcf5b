#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::document::{Diagram, DiagramSpec, DraftPayload, PatentDocument, SourceFile};
use crate::core::llm::LlmManager;
use crate::core::prompt;

const DIAGRAM_ASPECT_RATIO: &str = "4:3";

/// Fatal drafting failures. Per-diagram image failures are not here: they
/// are absorbed during the fan-out and surface as empty diagram entries.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Text generation failed: {0}")]
    Generation(anyhow::Error),
    #[error("Generated text did not match the expected document structure: {0}")]
    Schema(serde_json::Error),
}

/// Turns ingested source files into a complete patent document: one
/// structured text-generation call, a bounded concurrent fan-out over the
/// requested diagrams, then assembly. Either returns one internally
/// consistent document or fails without side effects.
pub struct PatentGenerator {
    llm: Arc<LlmManager>,
    max_parallel_diagrams: usize,
    max_diagrams: usize,
}

impl PatentGenerator {
    pub fn new(llm: Arc<LlmManager>, max_parallel_diagrams: usize, max_diagrams: usize) -> Self {
        Self {
            llm,
            max_parallel_diagrams: max_parallel_diagrams.max(1),
            max_diagrams: max_diagrams.max(1),
        }
    }

    pub async fn draft(&self, files: &[SourceFile]) -> Result<PatentDocument, DraftError> {
        let combined = prompt::combine_sources(files);
        let drafting = prompt::drafting_prompt(&combined);
        let schema = prompt::response_schema();

        info!("Requesting structured draft from the text model");
        let raw = self
            .llm
            .generate_structured(&drafting, &schema)
            .await
            .map_err(DraftError::Generation)?;
        let payload: DraftPayload = serde_json::from_str(&raw).map_err(DraftError::Schema)?;

        info!(
            "Draft received: {} claims, {} diagram requests",
            payload.claims.len(),
            payload.diagram_requests.len()
        );
        let diagrams = self.generate_diagrams(&payload.diagram_requests).await;

        Ok(PatentDocument {
            id: Uuid::new_v4().to_string(),
            title: payload.title,
            abstract_text: payload.abstract_text,
            claims: payload.claims,
            specification: payload.specification,
            diagrams,
            created_at: Utc::now(),
        })
    }

    /// Render every requested diagram concurrently and join on all of them.
    /// Output order matches input order regardless of completion order, and
    /// a failed entry comes back with empty image data rather than an error.
    /// The request list is untrusted model output, so both the in-flight
    /// count and the total count are bounded.
    async fn generate_diagrams(&self, requests: &[DiagramSpec]) -> Vec<Diagram> {
        let capped = if requests.len() > self.max_diagrams {
            warn!(
                "Model requested {} diagrams, rendering the first {}",
                requests.len(),
                self.max_diagrams
            );
            &requests[..self.max_diagrams]
        } else {
            requests
        };

        let semaphore = Arc::new(Semaphore::new(self.max_parallel_diagrams));
        let mut set = JoinSet::new();
        for (index, spec) in capped.iter().cloned().enumerate() {
            let llm = self.llm.clone();
            let semaphore = semaphore.clone();
            set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, Diagram::failed(&spec)),
                };
                let diagram = render_diagram(&llm, &spec).await;
                (index, diagram)
            });
        }

        let mut slots: Vec<Option<Diagram>> = vec![None; capped.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, diagram)) => slots[index] = Some(diagram),
                Err(e) => warn!("Diagram task aborted: {}", e),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.unwrap_or_else(|| Diagram::failed(&capped[i])))
            .collect()
    }
}

async fn render_diagram(llm: &LlmManager, spec: &DiagramSpec) -> Diagram {
    let prompt = prompt::diagram_prompt(spec);
    match llm.generate_image(&prompt, DIAGRAM_ASPECT_RATIO).await {
        Ok(Some(data)) => Diagram {
            prompt: spec.prompt.clone(),
            image_data: data,
            description: spec.desc.clone(),
        },
        Ok(None) => {
            warn!("Image model returned no payload for diagram '{}'", spec.desc);
            Diagram::failed(spec)
        }
        Err(e) => {
            warn!("Failed to generate diagram '{}': {}", spec.desc, e);
            Diagram::failed(spec)
        }
    }
}
