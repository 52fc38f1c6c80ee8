use crate::parser::attribute::{parse_attribute, split_attribute, AttrValue};
use crate::parser::properties::{build_properties, KeyStyle, Properties, Property};
use serde::{Serialize, Serializer};

/// Open record of an entity: every `label : value` line found in its
/// report becomes a field.
///
/// `fields` is keyed by normalized name (`controller_status`), `facts` by
/// the report's own label (`Controller Status`). Both come from the same
/// lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    pub fields: Properties,
    pub facts:  Properties,
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Absorb one attribute line. Returns false if the line was skipped.
    pub fn absorb_line(&mut self, line: &str) -> bool {
        match parse_attribute(line) {
            Some(attr) => {
                self.facts.insert(attr.display, Property::Value(attr.value.clone()));
                self.fields.insert(attr.key, Property::Value(attr.value));
                true
            }
            None => false,
        }
    }

    /// Absorb every attribute line of a flat block; other lines are ignored.
    pub fn absorb_block(&mut self, block: &str) {
        for line in block.lines().filter(|l| split_attribute(l).is_some()) {
            self.absorb_line(line);
        }
    }

    /// Re-read only the attribute lines whose field name passes `wanted`.
    /// Returns how many fields were updated.
    pub fn refresh_from(&mut self, block: &str, wanted: impl Fn(&str) -> bool) -> usize {
        let mut updated = 0;
        for line in block.lines().filter(|l| split_attribute(l).is_some()) {
            let Some(attr) = parse_attribute(line) else { continue };
            if !wanted(&attr.key) {
                continue;
            }
            self.facts.insert(attr.display, Property::Value(attr.value.clone()));
            self.fields.insert(attr.key, Property::Value(attr.value));
            updated += 1;
        }
        updated
    }

    /// Parse `body` with the property builder and store it under `key`.
    /// Empty blocks are not stored.
    pub fn insert_block(&mut self, key: &str, display: &str, body: &str) -> bool {
        let props = build_properties(body, KeyStyle::Field);
        if props.is_empty() || key.is_empty() {
            return false;
        }
        self.fields.insert(key.to_string(), Property::Group(props));
        self.facts.insert(display.to_string(), Property::Group(build_properties(body, KeyStyle::Display)));
        true
    }

    /// Store already built nested maps.
    pub fn insert_group(&mut self, key: &str, display: &str, fields: Properties, facts: Properties) {
        if fields.is_empty() || key.is_empty() {
            return;
        }
        self.fields.insert(key.to_string(), Property::Group(fields));
        self.facts.insert(display.to_string(), Property::Group(facts));
    }

    pub fn get(&self, key: &str) -> Option<&Property> {
        self.fields.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&AttrValue> {
        self.get(key).and_then(Property::as_value)
    }

    /// Text of a field; empty when absent, boolean or nested.
    pub fn text(&self, key: &str) -> &str {
        self.value(key).and_then(AttrValue::as_str).unwrap_or("")
    }

    /// First non-empty text among `keys`.
    pub fn text_any(&self, keys: &[&str]) -> &str {
        keys.iter().map(|k| self.text(k)).find(|t| !t.is_empty()).unwrap_or("")
    }

    /// Rendered form of any scalar field, booleans as Yes/No.
    pub fn render(&self, key: &str) -> String {
        self.value(key).map(AttrValue::render).unwrap_or_default()
    }

    pub fn render_any(&self, keys: &[&str]) -> String {
        keys.iter().map(|k| self.render(k)).find(|t| !t.is_empty()).unwrap_or_default()
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.value(key).and_then(AttrValue::as_bool)
    }

    pub fn group(&self, key: &str) -> Option<&Properties> {
        self.get(key).and_then(Property::as_group)
    }

    pub fn fact(&self, label: &str) -> Option<&Property> {
        self.facts.get(label)
    }
}

/// A header section and the body section that follows it.
#[derive(Debug, Clone, Copy)]
pub struct NamedBlock<'a> {
    pub header: &'a str,
    pub body:   &'a str,
}

/// Pair up `sections[start..]` as header/body; a trailing header without a
/// body is dropped.
pub fn named_blocks(sections: &[String], start: usize) -> impl Iterator<Item = NamedBlock<'_>> {
    sections
        .get(start..)
        .unwrap_or(&[])
        .chunks_exact(2)
        .map(|pair| NamedBlock { header: &pair[0], body: &pair[1] })
}

/// Walk `sections[start..]` tracking the latest header.
///
/// A section without any attribute line is a header; every other section is
/// a body attached to the header seen last (`None` before the first one).
/// Blank sections are skipped. Unlike [`named_blocks`] this tolerates
/// several bodies under one header, as printed for member listings with a
/// column header row.
pub fn headed_bodies(sections: &[String], start: usize) -> Vec<(Option<&str>, &str)> {
    let mut out = Vec::new();
    let mut header: Option<&str> = None;
    for section in sections.get(start..).unwrap_or(&[]) {
        if section.trim().is_empty() {
            continue;
        }
        if section.lines().any(|l| split_attribute(l).is_some()) {
            out.push((header, section.as_str()));
        } else {
            header = Some(section.as_str());
        }
    }
    out
}
