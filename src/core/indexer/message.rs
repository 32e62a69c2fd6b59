//! Permissive single-pass header/body splitter.
//!
//! No MIME decoding happens here: everything after the header block is
//! the body, verbatim, even for multipart messages. The splitter never
//! fails. A line that is neither a header nor a continuation ends the
//! header block and becomes the first line of the body.

use crate::core::types::Headers;

/// A message split into its header block and raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub headers: Headers,
    pub body: String,
}

/// Split message text into headers and body
///
/// - An mbox `From ` envelope on the first line is ignored
/// - `Name: value` starts a header; leading blanks of the value are dropped
/// - Lines starting with a space or tab continue the previous header
/// - The first empty line ends the header block and is not part of the body
pub fn parse_message(text: &str) -> RawMessage {
    let mut headers = Headers::new();
    let mut current: Option<(String, String)> = None;
    let mut body_start: Option<usize> = None;
    let mut offset = 0;

    for (line_no, line) in text.split_inclusive('\n').enumerate() {
        let content = line.trim_end_matches(['\r', '\n']);

        if line_no == 0 && content.starts_with("From ") {
            offset += line.len();
            continue;
        }

        if content.is_empty() {
            body_start = Some(offset + line.len());
            break;
        }

        if content.starts_with([' ', '\t']) {
            match current.as_mut() {
                Some((_, value)) => {
                    value.push('\n');
                    value.push_str(content);
                    offset += line.len();
                    continue;
                }
                None => {
                    body_start = Some(offset);
                    break;
                }
            }
        }

        match split_header_line(content) {
            Some((name, value)) => {
                if let Some((name, value)) = current.take() {
                    headers.insert(name, value);
                }
                current = Some((name.to_string(), value.to_string()));
            }
            None => {
                body_start = Some(offset);
                break;
            }
        }

        offset += line.len();
    }

    if let Some((name, value)) = current {
        headers.insert(name, value);
    }

    let body = body_start
        .and_then(|start| text.get(start..))
        .unwrap_or_default()
        .to_string();

    RawMessage { headers, body }
}

/// Split `Name: value`, requiring a non-empty printable field name
fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let valid_name = !name.is_empty() && name.bytes().all(|b| (33..=126).contains(&b));
    if !valid_name {
        return None;
    }
    Some((name, value.trim_start_matches([' ', '\t'])))
}
