mod export;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use console::style;
use tracing::error;

use crate::core::config::{self, Settings};
use crate::core::files;
use crate::core::generator::PatentGenerator;
use crate::core::history::HistoryStore;
use crate::core::llm::providers::GoogleProvider;
use crate::core::llm::LlmManager;
use crate::core::terminal::{self, GuideSection};

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Drafting")
        .command("draft <file>...", "Generate a patent application from documents")
        .print();

    GuideSection::new("Library")
        .command("history", "List previously generated applications")
        .command("show <id>", "Print one application's sections")
        .command("export <id> [--out DIR]", "Write markdown and diagram images to disk")
        .print();

    GuideSection::new("Diagnostics")
        .command("models", "List models known to the provider")
        .print();

    println!(
        "\n {} {} <command> [args]\n",
        style("Usage:").bold(),
        style("patentpen").green()
    );
}

fn open_store() -> Result<HistoryStore> {
    HistoryStore::open(&config::data_dir().join("patentpen.db"))
}

fn build_generator(settings: &Settings) -> Result<PatentGenerator> {
    let provider = GoogleProvider::new(settings.api_key.clone(), settings.request_timeout)?;
    let manager = LlmManager::new(
        Box::new(provider),
        settings.text_model.clone(),
        settings.image_model.clone(),
    );
    Ok(PatentGenerator::new(
        std::sync::Arc::new(manager),
        settings.max_parallel_diagrams,
        settings.max_diagrams,
    ))
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "draft" => run_draft(&args[2..]).await,
        "history" => run_history().await,
        "show" => {
            let Some(id) = args.get(2) else {
                terminal::print_error("Usage: patentpen show <id>");
                return Ok(());
            };
            run_show(id).await
        }
        "export" => {
            let Some(id) = args.get(2) else {
                terminal::print_error("Usage: patentpen export <id> [--out DIR]");
                return Ok(());
            };
            let out_dir = parse_out_flag(&args, 3);
            export::run_export(id, out_dir).await
        }
        "models" => run_models().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        other => {
            terminal::print_error(&format!("Unknown command: {}", other));
            print_help();
            Ok(())
        }
    }
}

fn parse_out_flag(args: &[String], start: usize) -> Option<PathBuf> {
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--out" | "-o" => {
                if i + 1 < args.len() {
                    return Some(PathBuf::from(&args[i + 1]));
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

async fn run_draft(file_args: &[String]) -> Result<()> {
    let paths: Vec<&String> = file_args.iter().filter(|a| !a.starts_with('-')).collect();
    if paths.is_empty() {
        terminal::print_error("Usage: patentpen draft <file>...");
        return Ok(());
    }

    let settings = Settings::load()?;
    let store = open_store()?;
    let generator = build_generator(&settings)?;

    let sources = files::read_source_files(&paths).await?;
    terminal::print_step(&format!(
        "Drafting a patent application from {} source file(s). This usually takes 20-40 seconds.",
        sources.len()
    ));

    let doc = match generator.draft(&sources).await {
        Ok(doc) => doc,
        Err(e) => {
            // One coarse-grained notice for the user; detail goes to the log.
            error!("Drafting failed: {:#}", anyhow::Error::from(e));
            return Err(anyhow!(
                "Drafting failed. Check your API key and source files, then try again."
            ));
        }
    };

    store.record(doc.clone()).await?;

    terminal::print_success(&format!("Draft complete: {}", doc.title));
    terminal::print_info(&format!(
        "{} claims, {}/{} diagrams rendered",
        doc.claims.len(),
        doc.rendered_diagrams(),
        doc.diagrams.len()
    ));
    if doc.rendered_diagrams() < doc.diagrams.len() {
        terminal::print_warn("Some diagrams failed to render; they are marked in the document.");
    }
    println!(
        "\n View it with {}\n",
        style(format!("patentpen show {}", doc.id)).green()
    );
    Ok(())
}

async fn run_history() -> Result<()> {
    let store = open_store()?;
    let docs = store.list().await;
    if docs.is_empty() {
        terminal::print_info("No applications drafted yet. Run: patentpen draft <file>...");
        return Ok(());
    }

    println!();
    for doc in docs {
        println!(
            " {}  {}  {} ({}/{} diagrams)",
            style(&doc.id).dim(),
            doc.created_at.format("%Y-%m-%d %H:%M"),
            style(&doc.title).bold(),
            doc.rendered_diagrams(),
            doc.diagrams.len()
        );
    }
    println!();
    Ok(())
}

async fn run_show(id: &str) -> Result<()> {
    let store = open_store()?;
    let doc = store
        .find(id)
        .await
        .ok_or_else(|| anyhow!("No application with id {}", id))?;

    println!("\n{}\n", style(&doc.title).bold().cyan());
    println!("{}", style("摘要 Abstract").bold().underlined());
    println!("{}\n", doc.abstract_text);

    println!("{}", style("权利要求书 Claims").bold().underlined());
    for claim in &doc.claims {
        println!("{}", claim);
    }

    println!("\n{}", style("说明书 Specification").bold().underlined());
    for (label, text) in [
        ("技术领域", &doc.specification.field),
        ("背景技术", &doc.specification.background),
        ("发明内容", &doc.specification.summary),
        ("具体实施方式", &doc.specification.description),
        ("实施例", &doc.specification.examples),
    ] {
        println!("\n{}", style(label).bold());
        println!("{}", text);
    }

    println!("\n{}", style("附图 Diagrams").bold().underlined());
    if doc.diagrams.is_empty() {
        println!("(none)");
    }
    for (i, diagram) in doc.diagrams.iter().enumerate() {
        if diagram.has_image() {
            println!("图{} {}", i + 1, diagram.description);
        } else {
            println!(
                "图{} {} {}",
                i + 1,
                diagram.description,
                style("[image generation failed]").red()
            );
        }
    }
    println!(
        "\n Export files with {}\n",
        style(format!("patentpen export {}", doc.id)).green()
    );
    Ok(())
}

async fn run_models() -> Result<()> {
    let settings = Settings::load()?;
    let provider = GoogleProvider::new(settings.api_key.clone(), settings.request_timeout)?;
    let manager = LlmManager::new(
        Box::new(provider),
        settings.text_model.clone(),
        settings.image_model.clone(),
    );

    for model in manager.fetch_models().await? {
        println!(" {:<28} {}", style(model.id).green(), model.name);
    }
    Ok(())
}
