use serde::Serialize;
use tracing::warn;

/// Location fields of a segment tuple; arity decides which variant.
///
/// `(500.1 GB,SATA,HDD,Channel:0,Slot:3)` has no enclosure,
/// `(500.1 GB,SATA,HDD,Channel:0,Enclosure:1,Slot:3)` does.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum SegmentTuple {
    WithoutEnclosure { channel: String, slot: String },
    WithEnclosure { channel: String, enclosure: String, slot: String },
}

impl SegmentTuple {
    pub fn channel(&self) -> &str {
        match self {
            SegmentTuple::WithoutEnclosure { channel, .. }
            | SegmentTuple::WithEnclosure { channel, .. } => channel,
        }
    }

    pub fn slot(&self) -> &str {
        match self {
            SegmentTuple::WithoutEnclosure { slot, .. }
            | SegmentTuple::WithEnclosure { slot, .. } => slot,
        }
    }

    pub fn enclosure(&self) -> Option<&str> {
        match self {
            SegmentTuple::WithoutEnclosure { .. } => None,
            SegmentTuple::WithEnclosure { enclosure, .. } => Some(enclosure),
        }
    }
}

/// Decoded tuple contents.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTuple {
    pub size:       String,
    pub protocol:   String,
    pub media_type: String,
    pub location:   SegmentTuple,
}

/// One member listing line: `Segment 0 : Present (…) SERIAL`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingLine {
    /// Row label before the colon: `Segment 0`, `Device ID`.
    pub label:  String,
    pub state:  String,
    pub fields: Vec<String>,
    /// Text after the closing paren: serial for drives, name for logical drives.
    pub key:    String,
}

impl ListingLine {
    /// The `Device ID : Availability (SizeMB, …) Serial Number` row that
    /// newer firmware prints above the members.
    pub fn is_column_header(&self) -> bool {
        let label = self.label.to_ascii_lowercase();
        label.ends_with(" id")
            || (self.key.eq_ignore_ascii_case("serial number")
                && self.fields.first().is_some_and(|f| f.eq_ignore_ascii_case("sizemb")))
    }
}

/// Split a listing line into its state word, tuple fields and trailing key.
pub fn parse_listing_line(line: &str) -> Option<ListingLine> {
    let (label, rest) = line.split_once(':')?;
    let rest = rest.trim();
    let open = rest.find('(')?;
    let close = open + rest[open..].find(')')?;
    let state = rest[..open].split_whitespace().next().unwrap_or("").to_string();
    let fields = rest[open + 1..close].split(',').map(|f| f.trim().to_string()).collect();
    let key = rest[close + 1..].trim().to_string();
    Some(ListingLine { label: label.trim().to_string(), state, fields, key })
}

/// Decode the 5 or 6 tuple fields of a logical drive segment.
pub fn decode_tuple(fields: &[String]) -> Option<DecodedTuple> {
    let (size, protocol, media_type, location) = match fields {
        [size, protocol, media_type, channel, slot] => (
            size,
            protocol,
            media_type,
            SegmentTuple::WithoutEnclosure { channel: tagged(channel), slot: tagged(slot) },
        ),
        [size, protocol, media_type, channel, enclosure, slot] => (
            size,
            protocol,
            media_type,
            SegmentTuple::WithEnclosure {
                channel:   tagged(channel),
                enclosure: tagged(enclosure),
                slot:      tagged(slot),
            },
        ),
        _ => {
            warn!(arity = fields.len(), ?fields, "unexpected segment tuple arity");
            return None;
        }
    };
    Some(DecodedTuple {
        size:       size.clone(),
        protocol:   protocol.clone(),
        media_type: media_type.clone(),
        location,
    })
}

/// "Channel:0" -> "0"; untagged values pass through.
fn tagged(field: &str) -> String {
    field.split_once(':').map(|(_, v)| v).unwrap_or(field).trim().to_string()
}
