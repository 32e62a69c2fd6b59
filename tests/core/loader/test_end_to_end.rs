// Complete loads against the in-memory cluster

use crate::common::{bulk_sizes, load_into, test_config, MailCorpus};
use mailbulk::core::client::{ClusterEvent, InMemoryCluster};
use mailbulk::core::indexer::CancellationFlag;
use mailbulk::core::loader::{run_load, LoadOptions};

fn settings(refresh_interval: &str) -> ClusterEvent {
    ClusterEvent::PutSettings {
        index: "emails".to_string(),
        refresh_interval: Some(refresh_interval.to_string()),
    }
}

#[tokio::test]
async fn test_large_corpus_loads_in_fixed_batches() {
    let corpus = MailCorpus::new()
        .with_valid(
            2500,
            &["allen-p", "arnold-j", "beck-s", "lay-k", "skilling-j"],
            &["inbox", "sent_items"],
        )
        .with_malformed(10);
    let cluster = InMemoryCluster::new();

    let report = load_into(&cluster, corpus.path(), &test_config(1000))
        .await
        .unwrap();

    assert_eq!(report.documents_discovered, 2510);
    assert_eq!(report.documents_skipped, 10);
    assert_eq!(report.documents_uploaded, 2500);
    assert_eq!(report.batches, 3);
    assert!(report.is_clean());
    assert_eq!(cluster.document_count("emails"), 2500);

    let events = cluster.events();
    assert_eq!(bulk_sizes(&events), vec![1000, 1000, 500]);
    assert_eq!(
        events,
        vec![
            ClusterEvent::CreateIndex {
                index: "emails".to_string()
            },
            settings("-1"),
            ClusterEvent::Bulk {
                items: 1000,
                failed: 0
            },
            ClusterEvent::Bulk {
                items: 1000,
                failed: 0
            },
            ClusterEvent::Bulk {
                items: 500,
                failed: 0
            },
            settings("1s"),
            ClusterEvent::ForceMerge {
                index: "emails".to_string(),
                max_segments: 5
            },
        ]
    );
}

#[tokio::test]
async fn test_progress_reports_every_batch() {
    let corpus = MailCorpus::new().with_valid(45, &["allen-p"], &["inbox"]);
    let cluster = InMemoryCluster::new();
    let mut progress = Vec::new();

    run_load(
        &cluster,
        &test_config(20),
        corpus.path(),
        LoadOptions::default(),
        &CancellationFlag::new(),
        |p| progress.push((p.batch, p.size, p.uploaded_total)),
    )
    .await
    .unwrap();

    assert_eq!(progress, vec![(1, 20, 20), (2, 20, 40), (3, 5, 45)]);
}

#[tokio::test]
async fn test_empty_corpus_still_runs_lifecycle() {
    let corpus = MailCorpus::new();
    let cluster = InMemoryCluster::new();

    let report = load_into(&cluster, corpus.path(), &test_config(100))
        .await
        .unwrap();

    assert_eq!(report.batches, 0);
    assert!(report.compacted);
    assert!(bulk_sizes(&cluster.events()).is_empty());
    assert_eq!(cluster.refresh_interval("emails").as_deref(), Some("1s"));
}

#[tokio::test]
async fn test_custom_index_settings_flow_through() {
    let corpus = MailCorpus::new().with_valid(3, &["allen-p"], &["inbox"]);
    let cluster = InMemoryCluster::new();
    let mut config = test_config(2);
    config.index.name = "enron".to_string();
    config.index.merge_segments = 1;
    config.index.refresh_steady = "30s".to_string();

    load_into(&cluster, corpus.path(), &config).await.unwrap();

    assert_eq!(cluster.document_count("enron"), 3);
    assert_eq!(cluster.refresh_interval("enron").as_deref(), Some("30s"));
    assert!(cluster.events().contains(&ClusterEvent::ForceMerge {
        index: "enron".to_string(),
        max_segments: 1
    }));
}

#[tokio::test]
async fn test_uploaded_documents_have_wire_field_names() {
    let corpus = MailCorpus::new().with_valid(1, &["allen-p"], &["inbox"]);
    let cluster = InMemoryCluster::new();

    load_into(&cluster, corpus.path(), &test_config(10))
        .await
        .unwrap();

    let stored = cluster.documents("emails");
    assert_eq!(stored.len(), 1);
    let fields: Vec<&str> = stored[0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    for field in ["mailbox_owner", "mail_folder", "filename", "headers", "body"] {
        assert!(fields.contains(&field), "missing {field}");
    }
}
