//! Tests for the drafting pipeline: fan-out ordering, failure isolation,
//! and the fatal text-generation paths.

mod failures;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::document::SourceFile;
use crate::core::llm::{GenerativeProvider, LlmManager, ModelInfo, ProviderType};

/// Scripted provider for driving the generator without a network. Image
/// calls identify their diagram by the `diagram-N` marker embedded in the
/// prompt, sleep so that later requests complete first, and track how many
/// are in flight at once. Counters are shared so tests keep a handle after
/// the provider moves into the manager.
pub(super) struct ScriptedProvider {
    /// None simulates a transport failure on the text call.
    pub text_response: Option<String>,
    pub diagram_count: usize,
    pub failing_diagrams: HashSet<usize>,
    pub empty_diagrams: HashSet<usize>,
    pub image_calls: Arc<AtomicUsize>,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn with_diagrams(count: usize) -> Self {
        Self {
            text_response: Some(draft_json(count)),
            diagram_count: count,
            failing_diagrams: HashSet::new(),
            empty_diagrams: HashSet::new(),
            image_calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_text(text: &str) -> Self {
        let mut provider = Self::with_diagrams(0);
        provider.text_response = Some(text.to_string());
        provider
    }

    pub fn with_failing_text() -> Self {
        let mut provider = Self::with_diagrams(0);
        provider.text_response = None;
        provider
    }

    fn diagram_index(&self, prompt: &str) -> usize {
        (0..self.diagram_count)
            .find(|i| prompt.contains(&format!("diagram-{}.", i)))
            .expect("image prompt should carry a diagram marker")
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Google
    }

    async fn fetch_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(Vec::new())
    }

    async fn generate_structured(
        &self,
        _model_id: &str,
        _prompt: &str,
        _schema: &Value,
    ) -> Result<String> {
        match &self.text_response {
            Some(text) => Ok(text.clone()),
            None => Err(anyhow!("simulated transport failure")),
        }
    }

    async fn generate_image(
        &self,
        _model_id: &str,
        prompt: &str,
        _aspect_ratio: &str,
    ) -> Result<Option<String>> {
        let index = self.diagram_index(prompt);
        self.image_calls.fetch_add(1, Ordering::SeqCst);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        // Invert completion order: earlier indexes finish last.
        let delay = (self.diagram_count - index) as u64 * 10;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_diagrams.contains(&index) {
            return Err(anyhow!("simulated image failure"));
        }
        if self.empty_diagrams.contains(&index) {
            return Ok(None);
        }
        Ok(Some(format!("img-{}", index)))
    }
}

/// A well-formed drafting response with `count` diagram requests, each
/// carrying its index marker in the prompt.
pub(super) fn draft_json(count: usize) -> String {
    let requests: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "prompt": format!("diagram-{}.", i),
                "labels": ["处理器", "传感器"],
                "desc": format!("图{}", i + 1),
            })
        })
        .collect();

    json!({
        "title": "一种自适应阀门",
        "abstract": "一种能够自适应调节的阀门。",
        "claims": ["1. 一种阀门。", "2. 根据权利要求1所述的阀门。"],
        "specification": {
            "field": "流体控制领域",
            "background": "现有阀门存在不足。",
            "summary": "本发明提供一种改进的阀门。",
            "description": "所述阀门包括...",
            "examples": "实施例一。"
        },
        "diagramPrompts": requests,
    })
    .to_string()
}

pub(super) fn manager(provider: ScriptedProvider) -> Arc<LlmManager> {
    Arc::new(LlmManager::new(
        Box::new(provider),
        "text-model".to_string(),
        "image-model".to_string(),
    ))
}

pub(super) fn sources() -> Vec<SourceFile> {
    vec![SourceFile {
        name: "design.md".to_string(),
        content: "A valve that adapts.".to_string(),
        mime_type: "text/markdown".to_string(),
    }]
}
