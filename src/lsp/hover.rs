//! Hover documentation for component and parameter names.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::catalog::{CatalogSnapshot, ComponentModel, ParameterModel};
use crate::model::{Entity, InstanceModel, Ranged, SegmentKind};

fn format_component_docs(component: &ComponentModel) -> String {
    let mut doc = if component.title.is_empty() {
        format!("**{}**", component.name)
    } else {
        format!("**{}** (`{}`)", component.title, component.name)
    };
    if !component.description.is_empty() {
        doc.push_str(&format!("\n\n{}", component.description));
    }
    doc
}

fn format_parameter_docs(parameter: &ParameterModel) -> String {
    let mut doc = format!("**{}**: `{}`", parameter.name, parameter.kind.name());
    if parameter.required {
        doc.push_str(" *(required)*");
    }
    if let Some(default) = parameter.default_text() {
        doc.push_str(&format!("\n\nDefault: `{}`", default));
    }
    if !parameter.enum_values.is_empty() {
        doc.push_str(&format!("\n\nAllowed values: `{}`", parameter.enum_values.join("`, `")));
    }
    if !parameter.description.is_empty() {
        doc.push_str(&format!("\n\n{}", parameter.description));
    }
    doc
}

/// Hover for the component or parameter name under `position`.
pub fn hover_at_position(
    model: &InstanceModel,
    position: Position,
    snapshot: &CatalogSnapshot,
) -> Option<Hover> {
    let entity = model.entity_at(position)?;
    let Entity::Segment(segment) = entity else {
        return None;
    };
    let entry = model.parent(&entity)?;
    let component = snapshot.component(entry.component_id()?)?;

    let value = match segment.kind() {
        SegmentKind::ComponentId => format_component_docs(component),
        SegmentKind::ParameterName => format_parameter_docs(component.parameter(segment.text())?),
        SegmentKind::Namespace => return None,
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(segment.to_range()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    const CATALOG: &str = r#"{
        "components": {
            "timer": {
                "title": "Timer",
                "description": "Generate messages in specified intervals.",
                "parameters": {
                    "delay": { "type": "integer", "default": 1000, "description": "Initial delay." },
                    "mode": { "type": "string", "required": true, "enum": ["a", "b"] }
                }
            }
        }
    }"#;

    fn hover_text(text: &str, position: Position) -> Option<String> {
        let snapshot = CatalogSnapshot::from_json("test", CATALOG).unwrap();
        let model = Dialect::Properties.parse(text);
        hover_at_position(&model, position, &snapshot).map(|hover| match hover.contents {
            HoverContents::Markup(markup) => markup.value,
            other => panic!("unexpected hover contents: {:?}", other),
        })
    }

    #[test]
    fn component_hover() {
        let text = hover_text("camel.component.timer.delay=1", Position::new(0, 18)).unwrap();
        assert_eq!(text, "**Timer** (`timer`)\n\nGenerate messages in specified intervals.");
    }

    #[test]
    fn parameter_hover() {
        let text = hover_text("camel.component.timer.delay=1", Position::new(0, 24)).unwrap();
        assert_eq!(text, "**delay**: `integer`\n\nDefault: `1000`\n\nInitial delay.");
    }

    #[test]
    fn parameter_hover_lists_allowed_values() {
        let text = hover_text("camel.component.timer.mode=a", Position::new(0, 24)).unwrap();
        assert_eq!(text, "**mode**: `string` *(required)*\n\nAllowed values: `a`, `b`");
    }

    #[test]
    fn no_hover_elsewhere() {
        assert!(hover_text("camel.component.timer.delay=1", Position::new(0, 3)).is_none());
        assert!(hover_text("camel.component.timer.delay=1", Position::new(0, 28)).is_none());
        assert!(hover_text("camel.component.nope.delay=1", Position::new(0, 18)).is_none());
        assert!(hover_text("camel.component.timer.nope=1", Position::new(0, 24)).is_none());
    }
}
