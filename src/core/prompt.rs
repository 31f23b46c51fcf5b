use serde_json::{json, Value};

use crate::core::document::{DiagramSpec, SourceFile};

/// Separator between source files in the combined blob. Chosen so it cannot
/// plausibly occur inside technical document text.
const FILE_DELIMITER: &str = "\n\n---\n\n";

/// Concatenate the ingested files into one labeled blob. Purely a string
/// operation: content is never inspected, and an empty file contributes an
/// empty section under its header.
pub fn combine_sources(files: &[SourceFile]) -> String {
    files
        .iter()
        .map(|f| format!("文件 [{}]:\n{}", f.name, f.content))
        .collect::<Vec<_>>()
        .join(FILE_DELIMITER)
}

/// The fixed drafting instruction, with the combined source material
/// embedded. Asks for a complete CNIPA-style application as structured JSON
/// plus the diagram generation requests.
pub fn drafting_prompt(combined: &str) -> String {
    format!(
        r#"你是一个顶级的中国专利代理师。请根据以下技术资料，撰写一套完整的、逻辑极其严密的符合中国国家知识产权局(CNIPA)规范的专利申请文件。

资料如下：
{combined}

请输出 JSON 格式，包含以下字段：
- title: 专利名称
- abstract: 说明书摘要（300字以内）
- claims: 权利要求书（数组）
- specification: 说明书（field, background, summary, description, examples）
- diagramPrompts: 必须生成4个关键附图的生成提示词（数组）。
  - 每个提示词对象包含:
    - prompt: 极其详尽的英文提示词，描述组件结构、流程或逻辑。
    - labels: 图像中需要标注的中文关键词列表（如：["处理器", "传感器", "云端服务器"]）。
    - desc: 该图的中文简短标题。

要求：
1. 图像提示词必须明确要求"专利线稿图风格"。
2. 为解决乱码问题，提示词需包含对中文字体清晰度的具体要求。"#
    )
}

/// The declared output schema for the drafting call, in the generative
/// API's schema dialect. Mirrors the required fields of `DraftPayload`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "abstract": { "type": "STRING" },
            "claims": { "type": "ARRAY", "items": { "type": "STRING" } },
            "specification": {
                "type": "OBJECT",
                "properties": {
                    "field": { "type": "STRING" },
                    "background": { "type": "STRING" },
                    "summary": { "type": "STRING" },
                    "description": { "type": "STRING" },
                    "examples": { "type": "STRING" }
                },
                "required": ["field", "background", "summary", "description", "examples"]
            },
            "diagramPrompts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "prompt": { "type": "STRING" },
                        "labels": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "desc": { "type": "STRING" }
                    },
                    "required": ["prompt", "labels", "desc"]
                }
            }
        },
        "required": ["title", "abstract", "claims", "specification", "diagramPrompts"]
    })
}

/// Build the image-generation prompt for one diagram request. Embeds the
/// content description, the fixed patent line-art style directive, the label
/// rendering rules (large bold Simplified Chinese glyphs with leader lines,
/// no other script), and the completeness directive.
pub fn diagram_prompt(spec: &DiagramSpec) -> String {
    let labels = spec.labels.join(", ");
    format!(
        r#"Professional High-Resolution Patent Application Line Art.

CONTENT: {content}.
STYLE: Pure white background, high-contrast black ink lines only. No shading, no 3D effects.

TEXT REQUIREMENTS (TO PREVENT GARBLED CHARACTERS):
- Use clear, standard, large Simplified Chinese characters (简体中文) for labels.
- Font style: Bold Sans-serif (SimHei/黑体 style).
- Labels to include: {labels}.
- Ensure each Chinese character is distinct, well-formed, and separated from lines.
- Place labels next to components with straight leader lines.
- DO NOT use English text in the labels.

COMPLETENESS: Draw the entire technical system, including all sub-components and their connections."#,
        content = spec.prompt,
    )
}
