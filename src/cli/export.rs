use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use base64::Engine;

use crate::core::document::PatentDocument;
use crate::core::terminal;

/// Write one application as `patent.md` plus a numbered PNG per rendered
/// diagram. Diagrams whose generation failed get a placeholder note in the
/// markdown and no file.
pub(super) async fn run_export(id: &str, out_dir: Option<PathBuf>) -> Result<()> {
    let store = super::open_store()?;
    let doc = store
        .find(id)
        .await
        .ok_or_else(|| anyhow!("No application with id {}", id))?;

    let short: String = doc.id.chars().take(8).collect();
    let dir = out_dir.unwrap_or_else(|| PathBuf::from(format!("patent-{}", short)));
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut figures: Vec<Option<String>> = Vec::with_capacity(doc.diagrams.len());
    for (i, diagram) in doc.diagrams.iter().enumerate() {
        if !diagram.has_image() {
            figures.push(None);
            continue;
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&diagram.image_data)
            .with_context(|| format!("Diagram {} carries invalid image data", i + 1))?;
        let name = format!("figure-{}.png", i + 1);
        tokio::fs::write(dir.join(&name), bytes).await?;
        figures.push(Some(name));
    }

    tokio::fs::write(dir.join("patent.md"), render_markdown(&doc, &figures)).await?;
    terminal::print_success(&format!("Exported to {}", dir.display()));
    Ok(())
}

fn render_markdown(doc: &PatentDocument, figures: &[Option<String>]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", doc.title));

    out.push_str("## 摘要\n\n");
    out.push_str(&doc.abstract_text);
    out.push_str("\n\n## 权利要求书\n\n");
    for claim in &doc.claims {
        out.push_str(claim);
        out.push_str("\n\n");
    }

    out.push_str("## 说明书\n\n");
    for (label, text) in [
        ("技术领域", &doc.specification.field),
        ("背景技术", &doc.specification.background),
        ("发明内容", &doc.specification.summary),
        ("具体实施方式", &doc.specification.description),
        ("实施例", &doc.specification.examples),
    ] {
        out.push_str(&format!("### {}\n\n{}\n\n", label, text));
    }

    out.push_str("## 附图\n\n");
    for (i, diagram) in doc.diagrams.iter().enumerate() {
        out.push_str(&format!("**图{} {}**\n\n", i + 1, diagram.description));
        match &figures[i] {
            Some(name) => out.push_str(&format!("![图{}]({})\n\n", i + 1, name)),
            None => out.push_str("*(image generation failed)*\n\n"),
        }
    }
    out
}
