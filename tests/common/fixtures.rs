// Test fixtures: synthetic maildir corpora

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A well-formed corpus date
#[allow(dead_code)] // Used in integration tests
pub const VALID_DATE: &str = "Thu, 2 Nov 2000 08:12:00 -0800 (PST)";

/// Date headers the loader must reject
#[allow(dead_code)] // Used in integration tests
pub const BAD_DATES: &[&str] = &[
    "sometime last week",
    "Thu, 2 Nov 2000 08:12:00 PST",
    "2000-11-02T08:12:00Z",
    "Thu, 31 Nov 2000 08:12:00 -0800",
    "",
];

/// Build a raw message with the given Date header value
#[allow(dead_code)] // Used in integration tests
pub fn message(id: usize, date: &str) -> String {
    format!(
        "Message-ID: <{id}.1075855378110.JavaMail.evans@thyme>\n\
         Date: {date}\n\
         From: phillip.allen@enron.com\n\
         To: tim.belden@enron.com\n\
         Subject: Message {id}\n\
         X-Folder: \\Phillip_Allen_Dec2000\\Notes Folders\\Inbox\n\
         \n\
         Body of message {id}.\n"
    )
}

/// Maildir laid out as `<root>/<owner>/<folder>/<file>` in a temp dir
#[allow(dead_code)] // Used in integration tests
pub struct MailCorpus {
    pub dir: TempDir,
    pub files: Vec<PathBuf>,
}

#[allow(dead_code)] // Used in integration tests
impl MailCorpus {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            files: Vec::new(),
        }
    }

    /// Write `content` at `relative` below the root
    pub fn add(&mut self, relative: &str, content: impl AsRef<[u8]>) -> &mut Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        self.files.push(path);
        self
    }

    /// Add `count` valid messages spread over `owners` x `folders`
    pub fn with_valid(mut self, count: usize, owners: &[&str], folders: &[&str]) -> Self {
        let slots = owners.len() * folders.len();
        for i in 0..count {
            let slot = i % slots;
            let owner = owners[slot / folders.len()];
            let folder = folders[slot % folders.len()];
            self.add(&format!("{owner}/{folder}/{i}."), message(i, VALID_DATE));
        }
        self
    }

    /// Add `count` messages with unusable Date headers
    pub fn with_malformed(mut self, count: usize) -> Self {
        for i in 0..count {
            let content = if i % 4 == 3 {
                // No Date header at all
                format!("Subject: undated {i}\n\nbody\n")
            } else {
                message(100_000 + i, BAD_DATES[i % BAD_DATES.len()])
            };
            self.add(&format!("kaminski-v/discussion_threads/bad{i}."), content);
        }
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
