// Maildir walking over realistic directory trees

use crate::common::{message, MailCorpus, VALID_DATE};
use mailbulk::core::config::DatasetConfig;
use mailbulk::core::indexer::DocumentSource;
use std::collections::BTreeSet;

fn source(corpus: &MailCorpus) -> DocumentSource {
    DocumentSource::from_config(corpus.path(), &DatasetConfig::default()).unwrap()
}

#[test]
fn test_walk_yields_every_valid_message_once() {
    let corpus = MailCorpus::new().with_valid(
        60,
        &["allen-p", "arnold-j", "lay-k"],
        &["inbox", "sent_items", "deleted_items", "notes_inbox"],
    );

    let mut documents = source(&corpus).walk();
    let names: BTreeSet<String> = documents
        .by_ref()
        .map(|d| format!("{}/{}/{}", d.owner(), d.folder(), d.filename()))
        .collect();

    assert_eq!(names.len(), 60);
    assert_eq!(documents.stats().documents, 60);
    assert_eq!(documents.stats().skipped, 0);
    assert!(names.contains("allen-p/inbox/0."));
}

#[test]
fn test_walk_membership_is_stable_across_walks() {
    let corpus = MailCorpus::new().with_valid(25, &["allen-p", "lay-k"], &["inbox"]);
    let source = source(&corpus);

    let first: BTreeSet<String> = source.walk().map(|d| d.filename().to_string()).collect();
    let second: BTreeSet<String> = source.walk().map(|d| d.filename().to_string()).collect();

    assert_eq!(first, second);
}

#[test]
fn test_nested_folders_keep_full_folder_path() {
    let mut corpus = MailCorpus::new();
    corpus.add("allen-p/straw/subdir/1.", message(1, VALID_DATE));

    let documents: Vec<_> = source(&corpus).walk().collect();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].owner(), "allen-p");
    let expected = std::path::Path::new("straw").join("subdir");
    assert_eq!(documents[0].folder(), expected.to_string_lossy());
}

#[test]
fn test_malformed_dates_are_counted_by_reason() {
    let corpus = MailCorpus::new()
        .with_valid(5, &["allen-p"], &["inbox"])
        .with_malformed(8);

    let mut documents = source(&corpus).walk();
    let count = documents.by_ref().count();
    let stats = documents.into_stats();

    assert_eq!(count, 5);
    assert_eq!(stats.files_seen, 13);
    assert_eq!(stats.skipped, 8);
    assert_eq!(stats.missing_date, 2);
    assert_eq!(stats.invalid_date, 6);
}

#[test]
fn test_date_header_is_rewritten_in_place() {
    let mut corpus = MailCorpus::new();
    corpus.add("allen-p/inbox/1.", message(1, VALID_DATE));

    let document = source(&corpus).walk().next().unwrap();
    let names: Vec<&str> = document.headers().iter().map(|(n, _)| n).collect();

    assert_eq!(names[..3], ["Message-ID", "Date", "From"]);
    assert_eq!(
        document.headers().get("Date"),
        Some("2000/11/02 08:12:00 -0800")
    );
    assert_eq!(document.body(), "Body of message 1.\n");
}

#[test]
fn test_lowercase_date_header_is_accepted() {
    let mut corpus = MailCorpus::new();
    corpus.add(
        "allen-p/inbox/1.",
        "date: Tue, 5 Dec 2000 09:30:00 -0800 (PST)\nSubject: lower\n\nbody\n",
    );

    let document = source(&corpus).walk().next().unwrap();
    assert_eq!(
        document.headers().get("date"),
        Some("2000/12/05 09:30:00 -0800")
    );
}

#[test]
fn test_owner_level_files_are_skipped() {
    let mut corpus = MailCorpus::new();
    corpus
        .add("allen-p/stray.", message(1, VALID_DATE))
        .add("allen-p/inbox/1.", message(2, VALID_DATE));

    let mut documents = source(&corpus).walk();
    assert_eq!(documents.by_ref().count(), 1);
    assert_eq!(documents.stats().outside_layout, 1);
}
