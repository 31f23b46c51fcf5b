use rusqlite::Connection;

use super::{manager, sources, ScriptedProvider};
use crate::core::generator::{DraftError, PatentGenerator};
use crate::core::history::HistoryStore;

#[tokio::test]
async fn failed_diagram_becomes_an_empty_entry_without_failing_the_draft() {
    let mut provider = ScriptedProvider::with_diagrams(4);
    provider.failing_diagrams.insert(2);

    let generator = PatentGenerator::new(manager(provider), 4, 8);
    let doc = generator.draft(&sources()).await.unwrap();

    assert_eq!(doc.diagrams.len(), 4);
    for (i, diagram) in doc.diagrams.iter().enumerate() {
        if i == 2 {
            assert!(!diagram.has_image());
            // Caption and prompt survive even when the image does not.
            assert_eq!(diagram.description, "图3");
            assert_eq!(diagram.prompt, "diagram-2.");
        } else {
            assert!(diagram.has_image());
        }
    }
}

#[tokio::test]
async fn payloadless_image_response_is_treated_as_a_failed_diagram() {
    let mut provider = ScriptedProvider::with_diagrams(3);
    provider.empty_diagrams.insert(0);

    let generator = PatentGenerator::new(manager(provider), 4, 8);
    let doc = generator.draft(&sources()).await.unwrap();

    assert!(!doc.diagrams[0].has_image());
    assert!(doc.diagrams[1].has_image());
    assert!(doc.diagrams[2].has_image());
}

#[tokio::test]
async fn every_diagram_failing_still_completes_the_document() {
    let mut provider = ScriptedProvider::with_diagrams(3);
    provider.failing_diagrams.extend([0, 1, 2]);

    let generator = PatentGenerator::new(manager(provider), 4, 8);
    let doc = generator.draft(&sources()).await.unwrap();

    assert_eq!(doc.diagrams.len(), 3);
    assert!(doc.diagrams.iter().all(|d| !d.has_image()));
}

#[tokio::test]
async fn text_transport_failure_aborts_without_touching_history() {
    let store = HistoryStore::with_connection(Connection::open_in_memory().unwrap()).unwrap();
    let generator = PatentGenerator::new(manager(ScriptedProvider::with_diagrams(2)), 4, 8);

    // Seed one successful draft so "unchanged" is observable.
    let seeded = generator.draft(&sources()).await.unwrap();
    store.record(seeded.clone()).await.unwrap();

    let failing = PatentGenerator::new(manager(ScriptedProvider::with_failing_text()), 4, 8);
    let result = failing.draft(&sources()).await;
    match result {
        Err(DraftError::Generation(_)) => {}
        other => panic!("expected a generation failure, got {:?}", other.map(|d| d.id)),
    }

    let listed = store.list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], seeded);
}

#[tokio::test]
async fn unparseable_response_is_a_schema_violation() {
    let generator =
        PatentGenerator::new(manager(ScriptedProvider::with_text("not json at all")), 4, 8);
    match generator.draft(&sources()).await {
        Err(DraftError::Schema(_)) => {}
        other => panic!("expected a schema violation, got {:?}", other.map(|d| d.id)),
    }
}

#[tokio::test]
async fn response_missing_required_fields_is_a_schema_violation() {
    // Valid JSON, but no specification object.
    let text = r#"{"title": "t", "abstract": "a", "claims": [], "diagramPrompts": []}"#;
    let generator = PatentGenerator::new(manager(ScriptedProvider::with_text(text)), 4, 8);
    match generator.draft(&sources()).await {
        Err(DraftError::Schema(_)) => {}
        other => panic!("expected a schema violation, got {:?}", other.map(|d| d.id)),
    }
}
