//! Validation of component references against the catalog.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Range};

use crate::catalog::{CatalogSnapshot, ParameterModel};
use crate::model::{Entry, InstanceModel, Ranged, SegmentKind};

fn diagnostic(range: Range, severity: DiagnosticSeverity, code: &str, message: String) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(severity),
        code: Some(NumberOrString::String(code.to_string())),
        code_description: None,
        source: Some("camel".to_string()),
        message,
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Values resolved at runtime are not checked.
fn is_placeholder(value: &str) -> bool {
    value.contains("{{") || value.contains("${")
}

fn expected(parameter: &ParameterModel) -> String {
    if parameter.enum_values.is_empty() {
        parameter.kind.name().to_string()
    } else {
        format!("one of {}", parameter.enum_values.join(", "))
    }
}

/// First failing rule for `entry`, if any.
///
/// Rules in order: unknown component, unknown parameter, invalid value.
/// Missing or still-empty parts end the check.
fn check_entry(entry: &Entry, snapshot: &CatalogSnapshot) -> Option<Diagnostic> {
    let component_segment = entry.segment(SegmentKind::ComponentId)?;
    if component_segment.text().is_empty() {
        return None;
    }
    let Some(component) = snapshot.component(component_segment.text()) else {
        // Inherited references are reported once, on their own line.
        if component_segment.is_inherited() {
            return None;
        }
        return Some(diagnostic(
            component_segment.to_range(),
            DiagnosticSeverity::ERROR,
            "unknown-component",
            format!("Unknown component '{}'", component_segment.text()),
        ));
    };

    let parameter_segment = entry.segment(SegmentKind::ParameterName)?;
    if parameter_segment.text().is_empty() {
        return None;
    }
    let Some(parameter) = component.parameter(parameter_segment.text()) else {
        return Some(diagnostic(
            parameter_segment.to_range(),
            DiagnosticSeverity::ERROR,
            "unknown-option",
            format!(
                "Unknown option '{}' for component '{}'",
                parameter_segment.text(),
                component.name
            ),
        ));
    };

    let value = entry.value()?;
    if value.text().is_empty() || is_placeholder(value.text()) || parameter.accepts(value.text()) {
        return None;
    }
    Some(diagnostic(
        value.to_range(),
        DiagnosticSeverity::WARNING,
        "invalid-value",
        format!(
            "Invalid value '{}' for option '{}': expected {}",
            value.text(),
            parameter.name,
            expected(parameter)
        ),
    ))
}

/// Check every entry of `model` against `snapshot`.
pub fn validate(model: &InstanceModel, snapshot: &CatalogSnapshot) -> Vec<Diagnostic> {
    model
        .entries()
        .iter()
        .filter_map(|entry| check_entry(entry, snapshot))
        .collect()
}
