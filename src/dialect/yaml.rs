//! Structural scan of YAML configuration files.
//!
//! Only block mappings are followed, by indentation. Both nested
//! (`camel:` / `component:` / `timer:` / `delay: 1000`) and dotted
//! (`camel.component.timer.delay: 1000`) spellings map onto the same entries
//! the properties dialect produces.

use crate::model::{utf16_len, EntryDraft, InstanceModel, LineRange, Ranged, SegmentKind};

use super::DialectParser;

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

/// One dot-separated part of a key, with its position.
#[derive(Debug, Clone)]
struct KeyPart {
    text: String,
    range: LineRange,
}

/// A scanned `key: value` line.
#[derive(Debug)]
struct KeyLine {
    indent: usize,
    parts: Vec<KeyPart>,
    value: Option<(String, LineRange)>,
    /// `key:` with nothing after the colon.
    opens_mapping: bool,
    range: LineRange,
}

/// An enclosing mapping key.
#[derive(Debug)]
struct Frame {
    indent: usize,
    parts: Vec<KeyPart>,
}

impl DialectParser for YamlParser {
    fn parse(&self, text: &str) -> InstanceModel {
        let mut model = InstanceModel::new();
        let mut stack: Vec<Frame> = Vec::new();

        for (line_no, raw) in text.split('\n').enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let Some(key_line) = scan_line(line_no as u32, line) else {
                continue;
            };

            while stack
                .last()
                .is_some_and(|frame| frame.indent >= key_line.indent)
            {
                stack.pop();
            }

            let inherited: Vec<&KeyPart> = stack.iter().flat_map(|f| f.parts.iter()).collect();
            if let Some(draft) = entry_for(&inherited, &key_line) {
                model.push(draft);
            }

            if key_line.opens_mapping {
                stack.push(Frame {
                    indent: key_line.indent,
                    parts: key_line.parts,
                });
            }
        }

        model
    }
}

fn scan_line(line_no: u32, line: &str) -> Option<KeyLine> {
    let col = |byte: usize| utf16_len(&line[..byte]);

    let content = line.trim_start();
    if content.is_empty()
        || content.starts_with('#')
        || content.starts_with("---")
        || content.starts_with("...")
        || content.starts_with('-')
    {
        return None;
    }
    let indent = line.len() - content.len();

    // A key ends at a colon followed by a blank or the end of the line.
    let colon = content
        .char_indices()
        .find(|&(i, c)| c == ':' && content[i + 1..].chars().next().map_or(true, char::is_whitespace))
        .map(|(i, _)| i);

    let (key, after) = match colon {
        Some(i) => (content[..i].trim_end(), Some(&content[i + 1..])),
        None => (content.trim_end(), None),
    };
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let mut parts = Vec::new();
    let mut offset = indent;
    for part in key.split('.') {
        parts.push(KeyPart {
            text: part.to_string(),
            range: LineRange::spanning(line_no, col(offset), part),
        });
        offset += part.len() + 1;
    }
    let key_end = col(indent + key.len());

    let value = after.and_then(|after| {
        let without_comment = strip_comment(after);
        let trimmed = without_comment.trim();
        if trimmed.is_empty() {
            return None;
        }
        let start = line.len() - after.len() + (without_comment.len() - without_comment.trim_start().len());
        Some(unquote(line_no, col(start), trimmed))
    });

    let range = LineRange::new(
        line_no,
        col(indent),
        value.as_ref().map_or(key_end, |(_, r)| r.end_column().max(key_end)),
    );

    Some(KeyLine {
        indent,
        parts,
        opens_mapping: after.is_some() && value.is_none(),
        value,
        range,
    })
}

/// `after` up to a `#` comment. A leading quoted scalar hides any `#` inside it.
fn strip_comment(after: &str) -> &str {
    let value = after.trim_start();
    let scan_from = after.len() - value.len() + quoted_len(value);
    let bytes = after.as_bytes();
    (scan_from..bytes.len())
        .find(|&i| bytes[i] == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()))
        .map_or(after, |i| &after[..i])
}

/// Byte length of a leading quoted scalar including both quotes, 0 when the
/// value is unquoted or the quote is never closed.
fn quoted_len(value: &str) -> usize {
    let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return 0;
    };
    let mut chars = value.char_indices().skip(1).peekable();
    let mut escaped = false;
    while let Some((i, c)) = chars.next() {
        if escaped {
            escaped = false;
        } else if quote == '"' && c == '\\' {
            escaped = true;
        } else if c == quote {
            // `''` inside single quotes is a literal quote.
            if quote == '\'' && chars.peek().is_some_and(|&(_, next)| next == '\'') {
                chars.next();
                continue;
            }
            return i + 1;
        }
    }
    0
}

/// Strip matching quotes, keeping the range on the inner text.
fn unquote(line_no: u32, start: u32, text: &str) -> (String, LineRange) {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            let inner = &text[1..text.len() - 1];
            return (inner.to_string(), LineRange::spanning(line_no, start + 1, inner));
        }
    }
    (text.to_string(), LineRange::spanning(line_no, start, text))
}

fn entry_for(inherited: &[&KeyPart], key_line: &KeyLine) -> Option<EntryDraft> {
    let own = key_line.parts.len();
    let path: Vec<(&KeyPart, bool)> = inherited
        .iter()
        .map(|part| (*part, true))
        .chain(key_line.parts.iter().map(|part| (part, false)))
        .collect();

    if !(3..=4).contains(&path.len()) || path[0].0.text != "camel" || path[1].0.text != "component" {
        return None;
    }

    let mut draft = EntryDraft::new(key_line.range);

    // The namespace literal is addressable only when written on this line.
    if own == path.len() {
        let (camel, component) = (path[0].0, path[1].0);
        draft = draft.segment(
            SegmentKind::Namespace,
            "camel.component",
            LineRange::new(
                camel.range.line(),
                camel.range.start_column(),
                component.range.end_column(),
            ),
        );
    }

    for (kind, (part, is_inherited)) in [SegmentKind::ComponentId, SegmentKind::ParameterName]
        .into_iter()
        .zip(path[2..].iter())
    {
        draft = if *is_inherited {
            draft.inherited_segment(kind, part.text.as_str(), part.range)
        } else {
            draft.segment(kind, part.text.as_str(), part.range)
        };
    }

    if let Some((text, range)) = &key_line.value {
        draft = draft.value(text.as_str(), *range);
    }

    Some(draft)
}
