//! Parsing of arcconf's human-oriented report text.

pub mod attribute;
pub mod properties;
pub mod segment;
pub mod text;

pub use attribute::{coerce_value, display_key, normalize_key, parse_attribute, AttrValue, Attribute, ByteSize};
pub use properties::{build_properties, KeyStyle, Properties, Property};
pub use segment::{decode_tuple, parse_listing_line, SegmentTuple};
pub use text::{cut_lines, paragraphs, sanitize_stdout, split_sections, SECTION_WIDTH};
