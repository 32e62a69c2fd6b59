// Decoding of legacy single-byte corpora

use crate::common::MailCorpus;
use mailbulk::core::indexer::DocumentSource;

fn cp1252_message() -> Vec<u8> {
    let mut bytes = b"Date: Wed, 6 Dec 2000 11:00:00 -0800 (PST)\nSubject: Caf".to_vec();
    bytes.push(0xE9); // e acute
    bytes.extend_from_slice(b"\n\nHe said ");
    bytes.push(0x93); // left double quotation mark
    bytes.extend_from_slice(b"fine");
    bytes.push(0x94); // right double quotation mark
    bytes.extend_from_slice(b" for ");
    bytes.push(0x80); // euro sign
    bytes.extend_from_slice(b"5.\n");
    bytes
}

#[test]
fn test_windows_1252_bytes_are_decoded() {
    let mut corpus = MailCorpus::new();
    corpus.add("allen-p/inbox/1.", cp1252_message());

    let source = DocumentSource::new(corpus.path(), "windows-1252", vec![], true).unwrap();
    let document = source.walk().next().unwrap();

    assert_eq!(document.headers().get("Subject"), Some("Caf\u{e9}"));
    assert_eq!(document.body(), "He said \u{201c}fine\u{201d} for \u{20ac}5.\n");
}

#[test]
fn test_invalid_utf8_is_skipped_when_corpus_is_utf8() {
    let mut corpus = MailCorpus::new();
    corpus
        .add("allen-p/inbox/1.", cp1252_message())
        .add(
            "allen-p/inbox/2.",
            "Date: Wed, 6 Dec 2000 11:00:00 -0800\n\nplain ascii\n",
        );

    let source = DocumentSource::new(corpus.path(), "utf-8", vec![], true).unwrap();
    let mut documents = source.walk();

    assert_eq!(documents.by_ref().count(), 1);
    assert_eq!(documents.stats().undecodable, 1);
    assert_eq!(source.encoding_name(), "UTF-8");
}

#[test]
fn test_latin1_label_maps_to_windows_1252() {
    let corpus = MailCorpus::new();
    let source = DocumentSource::new(corpus.path(), "latin1", vec![], true).unwrap();
    assert_eq!(source.encoding_name(), "windows-1252");
}
