//! Catalog-driven completion.
//!
//! The entity under the cursor decides what is proposed: component ids,
//! parameter names of the sibling component, or values of the parameter.
//! Proposals keep catalog order and are filtered by the text typed between
//! the start of the entity and the cursor.

use std::collections::HashSet;

use tower_lsp::lsp_types::*;

use crate::catalog::{kebab_to_camel, CatalogSnapshot, ParameterModel, ParameterType};
use crate::dialect::Dialect;
use crate::model::{utf16_prefix, Entity, Entry, InstanceModel, Ranged, SegmentKind};

/// Text of the entity between its start and the cursor.
fn typed_prefix<'a>(text: &'a str, entity: &impl Ranged, position: Position) -> &'a str {
    utf16_prefix(text, position.character.saturating_sub(entity.start_column()))
}

fn markdown(value: String) -> Documentation {
    Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value,
    })
}

/// Sort key keeping the catalog order in clients that sort by label.
fn sort_key(index: usize) -> Option<String> {
    Some(format!("{index:04}"))
}

fn component_completions(snapshot: &CatalogSnapshot, prefix: &str) -> Vec<CompletionItem> {
    snapshot
        .components()
        .filter(|component| component.name.starts_with(prefix))
        .enumerate()
        .map(|(i, component)| CompletionItem {
            label: component.name.clone(),
            kind: Some(CompletionItemKind::MODULE),
            detail: (!component.title.is_empty()).then(|| component.title.clone()),
            documentation: (!component.description.is_empty())
                .then(|| markdown(component.description.clone())),
            insert_text: Some(component.name.clone()),
            sort_text: sort_key(i),
            ..Default::default()
        })
        .collect()
}

fn parameter_detail(parameter: &ParameterModel) -> String {
    if parameter.required {
        format!("{} (required)", parameter.kind.name())
    } else {
        parameter.kind.name().to_string()
    }
}

/// Parameter names other entries already set for `component_id`.
fn used_parameters(model: &InstanceModel, current: &Entry, component_id: &str) -> HashSet<String> {
    model
        .entries_for_component(component_id)
        .filter(|entry| entry.id() != current.id())
        .filter_map(Entry::parameter)
        .map(kebab_to_camel)
        .collect()
}

fn parameter_completions(
    model: &InstanceModel,
    entry: &Entry,
    prefix: &str,
    snapshot: &CatalogSnapshot,
    dialect: Dialect,
) -> Vec<CompletionItem> {
    let Some(component_id) = entry.component_id() else {
        return Vec::new();
    };
    let Some(component) = snapshot.component(component_id) else {
        return Vec::new();
    };

    let used = used_parameters(model, entry, component_id);
    // A parameter name typed in full is not proposed again.
    let typed_in_full = entry
        .parameter()
        .filter(|name| *name == prefix)
        .and_then(|name| component.parameter(name))
        .map(|parameter| parameter.name.as_str());
    let prefix = kebab_to_camel(prefix);

    component
        .parameters
        .values()
        .filter(|parameter| parameter.name.starts_with(&prefix))
        .filter(|parameter| !used.contains(&parameter.name))
        .filter(|parameter| typed_in_full != Some(parameter.name.as_str()))
        .enumerate()
        .map(|(i, parameter)| {
            // Without a value yet, complete the whole assignment.
            let insert_text = match entry.value() {
                Some(_) => parameter.name.clone(),
                None => format!(
                    "{}{}{}",
                    parameter.name,
                    dialect.separator(),
                    parameter.default_text().unwrap_or_default()
                ),
            };
            CompletionItem {
                label: parameter.name.clone(),
                kind: Some(CompletionItemKind::PROPERTY),
                detail: Some(parameter_detail(parameter)),
                documentation: (!parameter.description.is_empty())
                    .then(|| markdown(parameter.description.clone())),
                insert_text: Some(insert_text),
                sort_text: sort_key(i),
                ..Default::default()
            }
        })
        .collect()
}

fn value_completions(entry: &Entry, prefix: &str, snapshot: &CatalogSnapshot) -> Vec<CompletionItem> {
    let parameter = entry
        .component_id()
        .and_then(|id| snapshot.component(id))
        .zip(entry.parameter())
        .and_then(|(component, name)| component.parameter(name));
    let Some(parameter) = parameter else {
        return Vec::new();
    };

    let candidates: Vec<String> = if !parameter.enum_values.is_empty() {
        parameter.enum_values.clone()
    } else if parameter.kind == ParameterType::Boolean {
        vec!["true".to_string(), "false".to_string()]
    } else {
        Vec::new()
    };
    let default = parameter.default_text();

    candidates
        .into_iter()
        .filter(|candidate| candidate.starts_with(prefix))
        .enumerate()
        .map(|(i, candidate)| CompletionItem {
            detail: (default.as_deref() == Some(candidate.as_str())).then(|| "default".to_string()),
            insert_text: Some(candidate.clone()),
            label: candidate,
            kind: Some(CompletionItemKind::VALUE),
            sort_text: sort_key(i),
            ..Default::default()
        })
        .collect()
}

/// Completion proposals for `entity` at `position`.
///
/// Pure: reads the model and the snapshot, never changes them.
pub fn completions_for_entity(
    model: &InstanceModel,
    entity: Entity<'_>,
    position: Position,
    snapshot: &CatalogSnapshot,
    dialect: Dialect,
) -> Vec<CompletionItem> {
    match entity {
        Entity::Segment(segment) => {
            let prefix = typed_prefix(segment.text(), segment, position);
            match segment.kind() {
                SegmentKind::Namespace => Vec::new(),
                SegmentKind::ComponentId => component_completions(snapshot, prefix),
                SegmentKind::ParameterName => match model.parent(&entity) {
                    Some(entry) => parameter_completions(model, entry, prefix, snapshot, dialect),
                    None => Vec::new(),
                },
            }
        }
        Entity::Value(value) => match model.parent(&entity) {
            Some(entry) => {
                value_completions(entry, typed_prefix(value.text(), value, position), snapshot)
            }
            None => Vec::new(),
        },
        Entity::Entry(_) => Vec::new(),
    }
}

/// Completion proposals at `position`, or none outside any entity.
pub fn completion_at_position(
    model: &InstanceModel,
    position: Position,
    snapshot: &CatalogSnapshot,
    dialect: Dialect,
) -> Vec<CompletionItem> {
    match model.entity_at(position) {
        Some(entity) => completions_for_entity(model, entity, position, snapshot, dialect),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "components": {
            "timer": {
                "title": "Timer",
                "description": "Generate messages in specified intervals.",
                "parameters": {
                    "delay": { "type": "integer", "default": 1000 },
                    "period": { "type": "integer", "default": 1000 },
                    "includeMetadata": { "type": "boolean", "default": false },
                    "repeatCount": { "type": "integer", "required": true }
                }
            },
            "log": {
                "title": "Log",
                "parameters": {
                    "level": { "type": "string", "enum": ["ERROR", "WARN", "INFO"] }
                }
            },
            "language": { "title": "Language" }
        }
    }"#;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::from_json("test", CATALOG).unwrap()
    }

    fn get_completions(dialect: Dialect, text: &str, position: Position) -> Vec<CompletionItem> {
        let model = dialect.parse(text);
        completion_at_position(&model, position, &snapshot(), dialect)
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn component_ids_filtered_by_prefix() {
        let items = get_completions(Dialect::Properties, "camel.component.l", Position::new(0, 17));
        assert_eq!(labels(&items), ["log", "language"]);
        assert_eq!(items[0].kind, Some(CompletionItemKind::MODULE));
        assert_eq!(items[0].detail.as_deref(), Some("Log"));
    }

    #[test]
    fn all_components_after_namespace_dot() {
        let items = get_completions(Dialect::Properties, "camel.component.", Position::new(0, 16));
        assert_eq!(labels(&items), ["timer", "log", "language"]);
    }

    #[test]
    fn component_prefix_stops_at_cursor() {
        // Cursor after `lo` inside `log`.
        let items = get_completions(Dialect::Properties, "camel.component.log.level=INFO", Position::new(0, 18));
        assert_eq!(labels(&items), ["log"]);
    }

    #[test]
    fn parameter_names_mid_token() {
        let items = get_completions(
            Dialect::Properties,
            "camel.component.timer.delay=1000",
            Position::new(0, 25),
        );
        assert_eq!(labels(&items), ["delay"]);
        assert_eq!(items[0].insert_text.as_deref(), Some("delay"));
    }

    #[test]
    fn parameter_names_with_short_prefix() {
        let items = get_completions(Dialect::Properties, "camel.component.timer.de", Position::new(0, 24));
        assert_eq!(labels(&items), ["delay"]);
        // No value yet: the whole assignment is inserted.
        assert_eq!(items[0].insert_text.as_deref(), Some("delay=1000"));
    }

    #[test]
    fn parameters_used_elsewhere_are_suppressed() {
        let text = "camel.component.timer.delay=1\ncamel.component.log.level=INFO\ncamel.component.timer.";
        let items = get_completions(Dialect::Properties, text, Position::new(2, 22));
        assert_eq!(labels(&items), ["period", "includeMetadata", "repeatCount"]);
    }

    #[test]
    fn kebab_case_usage_counts_as_used() {
        let text = "camel.component.timer.include-metadata=true\ncamel.component.timer.";
        let items = get_completions(Dialect::Properties, text, Position::new(1, 22));
        assert!(!labels(&items).contains(&"includeMetadata"));
    }

    #[test]
    fn fully_typed_parameter_is_not_proposed_again() {
        let text = "camel.component.timer.delay=1";
        let items = get_completions(Dialect::Properties, text, Position::new(0, 27));
        assert!(!labels(&items).contains(&"delay"));

        // A strict prefix of the entry's own parameter still proposes it.
        let items = get_completions(Dialect::Properties, text, Position::new(0, 25));
        assert_eq!(labels(&items), ["delay"]);
    }

    #[test]
    fn fully_typed_kebab_parameter_is_not_proposed_again() {
        let text = "camel.component.timer.include-metadata=true";
        let items = get_completions(Dialect::Properties, text, Position::new(0, 38));
        assert!(items.is_empty());
    }

    #[test]
    fn parameter_detail_marks_required() {
        let items = get_completions(Dialect::Properties, "camel.component.timer.r", Position::new(0, 23));
        assert_eq!(items[0].detail.as_deref(), Some("integer (required)"));
        assert_eq!(items[0].kind, Some(CompletionItemKind::PROPERTY));
    }

    #[test]
    fn unknown_component_has_no_parameters() {
        let items = get_completions(Dialect::Properties, "camel.component.nothing.", Position::new(0, 24));
        assert!(items.is_empty());
    }

    #[test]
    fn boolean_values() {
        let items = get_completions(
            Dialect::Properties,
            "camel.component.timer.includeMetadata=",
            Position::new(0, 38),
        );
        assert_eq!(labels(&items), ["true", "false"]);
        assert_eq!(items[1].detail.as_deref(), Some("default"));
    }

    #[test]
    fn enum_values_filtered() {
        let items = get_completions(Dialect::Properties, "camel.component.log.level=W", Position::new(0, 27));
        assert_eq!(labels(&items), ["WARN"]);
    }

    #[test]
    fn free_text_values_have_no_proposals() {
        let items = get_completions(Dialect::Properties, "camel.component.timer.delay=1", Position::new(0, 29));
        assert!(items.is_empty());
    }

    #[test]
    fn nothing_on_namespace_or_outside() {
        assert!(get_completions(Dialect::Properties, "camel.component.timer.delay=1", Position::new(0, 4)).is_empty());
        assert!(get_completions(Dialect::Properties, "\ncamel.component.timer.delay=1", Position::new(0, 0)).is_empty());
    }

    #[test]
    fn yaml_parameter_insert_text() {
        let text = "camel:\n  component:\n    timer:\n      delay: 5\n      pe";
        let items = get_completions(Dialect::Yaml, text, Position::new(4, 8));
        assert_eq!(labels(&items), ["period"]);
        assert_eq!(items[0].insert_text.as_deref(), Some("period: 1000"));
    }

    #[test]
    fn yaml_suppresses_siblings() {
        let text = "camel:\n  component:\n    timer:\n      delay: 5\n      ";
        let model = Dialect::Yaml.parse(text);
        // The empty line is not an entry; complete on a typed key instead.
        assert!(model.entity_at(Position::new(4, 6)).is_none());

        let text = "camel:\n  component:\n    timer:\n      delay: 5\n      de";
        let items = get_completions(Dialect::Yaml, text, Position::new(4, 8));
        assert!(items.is_empty(), "delay is already set: {:?}", labels(&items));
    }

    #[test]
    fn completion_is_deterministic() {
        let text = "camel.component.timer.";
        let first = get_completions(Dialect::Properties, text, Position::new(0, 22));
        let second = get_completions(Dialect::Properties, text, Position::new(0, 22));
        assert_eq!(first, second);
        assert_eq!(first[0].sort_text.as_deref(), Some("0000"));
    }
}
