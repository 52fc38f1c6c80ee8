use super::attribute::{display_key, normalize_key, parse_attribute, split_attribute, AttrValue};
use indexmap::IndexMap;
use serde::Serialize;

/// Insertion-ordered mapping built from a report block.
pub type Properties = IndexMap<String, Property>;

/// A value in a [`Properties`] map: a leaf attribute or a nested block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Property {
    Value(AttrValue),
    Group(Properties),
}

impl Property {
    pub fn as_value(&self) -> Option<&AttrValue> {
        match self {
            Property::Value(v) => Some(v),
            Property::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Properties> {
        match self {
            Property::Group(g) => Some(g),
            Property::Value(_) => None,
        }
    }
}

/// Which key normalization a builder applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// `controller_status`
    Field,
    /// `Controller Status`
    Display,
}

impl KeyStyle {
    pub fn key(self, label: &str) -> String {
        match self {
            KeyStyle::Field   => normalize_key(label),
            KeyStyle::Display => display_key(label),
        }
    }
}

/// Build a nested mapping from a block of lines.
///
/// A line without the attribute separator opens a sub-section; attribute
/// lines go into the current sub-section, or the top level if none is open.
/// Indentation is ignored. Sub-sections that never receive an attribute are
/// not emitted.
pub fn build_properties(block: &str, style: KeyStyle) -> Properties {
    let mut props = Properties::new();
    let mut sub_section: Option<String> = None;

    for line in block.lines() {
        if line.trim().is_empty() || line.bytes().all(|b| b == b'-' || b == b' ') {
            continue;
        }
        if split_attribute(line).is_none() {
            let name = style.key(line);
            sub_section = (!name.is_empty()).then_some(name);
            continue;
        }
        let Some(attr) = parse_attribute(line) else { continue };
        let key = match style {
            KeyStyle::Field   => attr.key,
            KeyStyle::Display => attr.display,
        };
        match &sub_section {
            Some(section) => {
                let entry = props
                    .entry(section.clone())
                    .or_insert_with(|| Property::Group(Properties::new()));
                if let Property::Value(_) = entry {
                    *entry = Property::Group(Properties::new());
                }
                if let Property::Group(group) = entry {
                    group.insert(key, Property::Value(attr.value));
                }
            }
            None => {
                props.insert(key, Property::Value(attr.value));
            }
        }
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(props: &Properties, key: &str) -> Option<String> {
        props.get(key)?.as_value()?.as_str().map(str::to_string)
    }

    #[test]
    fn flat_attributes_land_at_top_level() {
        let props = build_properties("Status : Optimal\n  Size : 512 MB\n", KeyStyle::Field);
        assert_eq!(props.len(), 2);
        assert_eq!(text(&props, "status").as_deref(), Some("Optimal"));
        assert_eq!(text(&props, "size").as_deref(), Some("512.00MB"));
    }

    #[test]
    fn sub_sections_do_not_leak() {
        let block = "\
   Phy #0
      Negotiated Link Rate : 6 Gbps
      Invalid DWord Count  : 0
   Phy #1
      Negotiated Link Rate : 3 Gbps
";
        let props = build_properties(block, KeyStyle::Field);
        assert_eq!(props.len(), 2);
        let phy0 = props["phy_0"].as_group().unwrap();
        let phy1 = props["phy_1"].as_group().unwrap();
        assert_eq!(phy0.len(), 2);
        assert_eq!(phy1.len(), 1);
        assert_eq!(text(phy1, "negotiated_link_rate").as_deref(), Some("3 Gbps"));
        assert!(phy1.get("invalid_dword_count").is_none());
    }

    #[test]
    fn empty_sub_sections_are_discarded() {
        let block = "Orphan Header\nReal Header\n  Value : 1\n";
        let props = build_properties(block, KeyStyle::Field);
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["real_header"]);
    }

    #[test]
    fn skips_dash_and_blank_lines() {
        let block = format!("{}\n   \n\nKey : v\n  ----  \n", "-".repeat(56));
        let props = build_properties(&block, KeyStyle::Field);
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn display_style_keeps_label_case() {
        let block = "Status of Enclosure Services Device\n   Speaker status : Not Available\n";
        let props = build_properties(block, KeyStyle::Display);
        let group = props["Status of Enclosure Services Device"].as_group().unwrap();
        assert_eq!(text(group, "Speaker status").as_deref(), Some("Not Available"));
    }

    #[test]
    fn repeated_header_merges() {
        let block = "A\n x : 1\nB\n y : 2\nA\n z : 3\n";
        let props = build_properties(block, KeyStyle::Field);
        assert_eq!(props["a"].as_group().unwrap().len(), 2);
    }
}
