//! The position-aware instance model of a parsed document.
//!
//! A model is a flat arena of [`Entry`] values. Segments and values point
//! back to their entry through an [`EntryId`] index instead of a reference,
//! so the tree stays strictly owned top-down.

use tower_lsp::lsp_types::Position;

use super::range::{LineRange, Ranged};

/// Index of an entry inside its [`InstanceModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// The fixed `camel.component` literal.
    Namespace,
    ComponentId,
    ParameterName,
}

/// One semantic token of an entry's key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    kind: SegmentKind,
    text: String,
    range: LineRange,
    entry: EntryId,
    inherited: bool,
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    /// The entry this segment belongs to.
    pub fn entry(&self) -> EntryId {
        self.entry
    }

    /// True when the token was written on an ancestor line (structured
    /// dialects) and only copied into this entry.
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }
}

impl Ranged for Segment {
    fn line(&self) -> u32 {
        self.range.line()
    }

    fn start_column(&self) -> u32 {
        self.range.start_column()
    }

    fn end_column(&self) -> u32 {
        self.range.end_column()
    }
}

/// The assigned value of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    text: String,
    range: LineRange,
    entry: EntryId,
}

impl Value {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    pub fn entry(&self) -> EntryId {
        self.entry
    }
}

impl Ranged for Value {
    fn line(&self) -> u32 {
        self.range.line()
    }

    fn start_column(&self) -> u32 {
        self.range.start_column()
    }

    fn end_column(&self) -> u32 {
        self.range.end_column()
    }
}

/// One logical configuration unit, e.g. a `key=value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: EntryId,
    range: LineRange,
    segments: Vec<Segment>,
    value: Option<Value>,
}

impl Entry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, kind: SegmentKind) -> Option<&Segment> {
        self.segments.iter().find(|s| s.kind == kind)
    }

    pub fn component_id(&self) -> Option<&str> {
        self.segment(SegmentKind::ComponentId).map(Segment::text)
    }

    pub fn parameter(&self) -> Option<&str> {
        self.segment(SegmentKind::ParameterName).map(Segment::text)
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Innermost entity of this entry containing `position`.
    fn entity_at(&self, position: Position) -> Option<Entity<'_>> {
        let child = self
            .segments
            .iter()
            .filter(|s| !s.inherited)
            .find(|s| s.contains(position))
            .map(Entity::Segment)
            .or_else(|| {
                self.value
                    .as_ref()
                    .filter(|v| v.contains(position))
                    .map(Entity::Value)
            });

        child.or_else(|| self.range.contains(position).then_some(Entity::Entry(self)))
    }
}

impl Ranged for Entry {
    fn line(&self) -> u32 {
        self.range.line()
    }

    fn start_column(&self) -> u32 {
        self.range.start_column()
    }

    fn end_column(&self) -> u32 {
        self.range.end_column()
    }
}

/// Borrowed view of any entity of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity<'m> {
    Entry(&'m Entry),
    Segment(&'m Segment),
    Value(&'m Value),
}

impl Entity<'_> {
    /// The entry owning this entity (itself for an entry).
    pub fn entry_id(&self) -> EntryId {
        match self {
            Entity::Entry(entry) => entry.id,
            Entity::Segment(segment) => segment.entry,
            Entity::Value(value) => value.entry,
        }
    }
}

impl Ranged for Entity<'_> {
    fn line(&self) -> u32 {
        match self {
            Entity::Entry(e) => e.line(),
            Entity::Segment(s) => s.line(),
            Entity::Value(v) => v.line(),
        }
    }

    fn start_column(&self) -> u32 {
        match self {
            Entity::Entry(e) => e.start_column(),
            Entity::Segment(s) => s.start_column(),
            Entity::Value(v) => v.start_column(),
        }
    }

    fn end_column(&self) -> u32 {
        match self {
            Entity::Entry(e) => e.end_column(),
            Entity::Segment(s) => s.end_column(),
            Entity::Value(v) => v.end_column(),
        }
    }
}

/// Entry under construction, handed by a dialect parser to the model.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    range: LineRange,
    segments: Vec<(SegmentKind, String, LineRange, bool)>,
    value: Option<(String, LineRange)>,
}

impl EntryDraft {
    pub fn new(range: LineRange) -> Self {
        Self {
            range,
            segments: Vec::new(),
            value: None,
        }
    }

    pub fn segment(mut self, kind: SegmentKind, text: impl Into<String>, range: LineRange) -> Self {
        self.segments.push((kind, text.into(), range, false));
        self
    }

    pub fn inherited_segment(
        mut self,
        kind: SegmentKind,
        text: impl Into<String>,
        range: LineRange,
    ) -> Self {
        self.segments.push((kind, text.into(), range, true));
        self
    }

    pub fn value(mut self, text: impl Into<String>, range: LineRange) -> Self {
        self.value = Some((text.into(), range));
        self
    }

    /// Widen the entry's own range to end at `end` on its line.
    pub fn extend_to(mut self, end: u32) -> Self {
        let range = self.range;
        self.range = LineRange::new(range.line(), range.start_column(), end.max(range.end_column()));
        self
    }
}

/// Parsed tree of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceModel {
    entries: Vec<Entry>,
}

impl InstanceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries must be pushed in line order.
    pub fn push(&mut self, draft: EntryDraft) -> EntryId {
        debug_assert!(
            self.entries
                .last()
                .map_or(true, |last| last.line() <= draft.range.line()),
            "entries must be pushed in line order"
        );

        let id = EntryId(self.entries.len());
        let segments = draft
            .segments
            .into_iter()
            .map(|(kind, text, range, inherited)| Segment {
                kind,
                text,
                range,
                entry: id,
                inherited,
            })
            .collect();
        let value = draft.value.map(|(text, range)| Value {
            text,
            range,
            entry: id,
        });

        self.entries.push(Entry {
            id,
            range: draft.range,
            segments,
            value,
        });
        id
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.0)
    }

    /// The entry owning `entity`.
    pub fn parent(&self, entity: &Entity<'_>) -> Option<&Entry> {
        self.entry(entity.entry_id())
    }

    /// Innermost entity whose range contains `position`.
    ///
    /// Entries on the line are tried in order; within an entry segments are
    /// tried left to right, then the value. The first match wins, so a
    /// position on the boundary of two entities belongs to the one ending
    /// there.
    pub fn entity_at(&self, position: Position) -> Option<Entity<'_>> {
        let first = self
            .entries
            .partition_point(|entry| entry.line() < position.line);
        self.entries[first..]
            .iter()
            .take_while(|entry| entry.line() == position.line)
            .find_map(|entry| entry.entity_at(position))
    }

    /// Entries referencing the given component id.
    pub fn entries_for_component<'a>(
        &'a self,
        component_id: &'a str,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.component_id() == Some(component_id))
    }
}
