//! Parser for `.properties` files.
//!
//! Recognizes `camel.component.<componentId>.<parameterName>=<value>` lines.
//! Any other line is left out of the model.

use crate::model::{utf16_len, EntryDraft, InstanceModel, LineRange, Ranged, SegmentKind};

use super::DialectParser;

pub(crate) const NAMESPACE: &str = "camel.component";

#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesParser;

impl DialectParser for PropertiesParser {
    fn parse(&self, text: &str) -> InstanceModel {
        let mut model = InstanceModel::new();
        let lines: Vec<&str> = text
            .split('\n')
            .map(|raw| raw.strip_suffix('\r').unwrap_or(raw))
            .collect();

        let mut next = 0;
        while next < lines.len() {
            let line_no = next;
            let line = lines[line_no];
            next += 1;

            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            // Lines joined to this one by trailing backslashes.
            let mut continuation = Vec::new();
            let mut continued = ends_with_continuation(line);
            while continued && next < lines.len() {
                continuation.push(lines[next]);
                continued = ends_with_continuation(lines[next]);
                next += 1;
            }

            if let Some(draft) = parse_line(line_no as u32, line, &continuation) {
                model.push(draft);
            }
        }

        model
    }
}

/// An odd number of trailing backslashes joins the next line to this one.
fn ends_with_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
}

/// `line` without the backslash that joins it to the next one.
fn strip_continuation(line: &str) -> &str {
    if ends_with_continuation(line) {
        &line[..line.len() - 1]
    } else {
        line
    }
}

fn parse_line(line_no: u32, line: &str, continuation: &[&str]) -> Option<EntryDraft> {
    let col = |byte: usize| utf16_len(&line[..byte]);

    let key_start = line.len() - line.trim_start().len();
    let rest = &line[key_start..];
    let key_len = rest
        .find(|c: char| c.is_whitespace() || c == '=' || c == ':')
        .unwrap_or(rest.len());
    let key = &rest[..key_len];
    let key_end = key_start + key_len;

    let tail = key.strip_prefix(NAMESPACE)?.strip_prefix('.')?;
    let (component, parameter) = match tail.split_once('.') {
        Some((component, parameter)) => (component, Some(parameter)),
        None => (tail, None),
    };

    let component_start = key_start + NAMESPACE.len() + 1;
    let mut draft = EntryDraft::new(LineRange::new(line_no, col(key_start), col(key_end)))
        .segment(
            SegmentKind::Namespace,
            NAMESPACE,
            LineRange::spanning(line_no, col(key_start), NAMESPACE),
        )
        .segment(
            SegmentKind::ComponentId,
            component,
            LineRange::spanning(line_no, col(component_start), component),
        );

    if let Some(parameter) = parameter {
        let parameter_start = component_start + component.len() + 1;
        draft = draft.segment(
            SegmentKind::ParameterName,
            parameter,
            LineRange::spanning(line_no, col(parameter_start), parameter),
        );
    }

    let after = &line[key_end..];
    let trimmed = after.trim_start();
    let value_part = if let Some(stripped) = trimmed.strip_prefix(['=', ':']) {
        Some(stripped.trim_start())
    } else if !trimmed.is_empty() {
        // Blanks alone separate key and value.
        Some(trimmed)
    } else {
        None
    };

    let Some(value_part) = value_part else {
        return Some(draft);
    };

    let value_start = line.len() - value_part.len();
    let (shown, value) = if continuation.is_empty() {
        let value = value_part.trim_end();
        (value, value.to_string())
    } else {
        // The range covers the first line; the text is the joined logical value.
        let shown = strip_continuation(value_part);
        let mut value = shown.to_string();
        for next in continuation {
            value.push_str(strip_continuation(next.trim_start()));
        }
        (shown, value.trim_end().to_string())
    };
    let value_range = LineRange::spanning(line_no, col(value_start), shown);
    Some(
        draft
            .value(value, value_range)
            .extend_to(value_range.end_column()),
    )
}
