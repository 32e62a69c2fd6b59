// Batching documents produced by a real walk

use crate::common::MailCorpus;
use mailbulk::core::config::DatasetConfig;
use mailbulk::core::indexer::{accumulate, DocumentSource, RoutingDescriptor};
use serde_json::Value;

#[test]
fn test_walk_batches_cover_corpus_exactly() {
    let corpus = MailCorpus::new().with_valid(23, &["allen-p", "lay-k"], &["inbox", "sent"]);
    let source = DocumentSource::from_config(corpus.path(), &DatasetConfig::default()).unwrap();

    let sizes: Vec<usize> = accumulate(source.walk(), 10, RoutingDescriptor::for_index("emails"))
        .unwrap()
        .map(|b| b.len())
        .collect();

    assert_eq!(sizes, vec![10, 10, 3]);
}

#[test]
fn test_payload_is_valid_ndjson() {
    let corpus = MailCorpus::new().with_valid(4, &["allen-p"], &["inbox"]);
    let source = DocumentSource::from_config(corpus.path(), &DatasetConfig::default()).unwrap();

    let batch = accumulate(source.walk(), 4, RoutingDescriptor::for_index("enron"))
        .unwrap()
        .next()
        .unwrap();
    let text = std::str::from_utf8(batch.payload()).unwrap();

    for (i, line) in text.lines().enumerate() {
        let value: Value = serde_json::from_str(line).unwrap();
        if i % 2 == 0 {
            assert_eq!(value["index"]["_index"], "enron");
        } else {
            assert_eq!(value["mailbox_owner"], "allen-p");
            assert_eq!(value["mail_folder"], "inbox");
            assert_eq!(value["headers"]["Date"], "2000/11/02 08:12:00 -0800");
        }
    }
    assert_eq!(text.lines().count(), 8);
}
