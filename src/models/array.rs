use crate::collectors::arcconf::Arcconf;
use crate::error::Result;
use crate::models::fields::{headed_bodies, FieldSet};
use crate::models::physical_drive::DeviceAddress;
use crate::parser::segment::parse_listing_line;
use crate::parser::text::{cut_lines, split_sections};
use serde::Serialize;

/// Resolved back-references of an array, by natural identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArrayMembers {
    pub drives:         Vec<DeviceAddress>,
    pub logical_drives: Vec<u32>,
}

/// A group of physical drives carrying one or more logical drives.
#[derive(Debug, Clone, Serialize)]
pub struct Array {
    pub controller: u32,
    pub id:         u32,
    pub fields:     FieldSet,
    /// Serials listed under the array's physical device section.
    pub member_serials: Vec<String>,
    /// Names listed under the array's logical device section.
    pub member_names: Vec<String>,
    pub members: ArrayMembers,
}

impl Array {
    pub fn new(controller: u32, id: u32) -> Self {
        Self {
            controller,
            id,
            fields: FieldSet::new(),
            member_serials: Vec::new(),
            member_names: Vec::new(),
            members: ArrayMembers::default(),
        }
    }

    /// Re-fetch `GETCONFIG <id> AR <n>`.
    pub fn update(&mut self, cli: &Arcconf) -> Result<()> {
        let text = cli.query("GETCONFIG", self.controller, &["AR".into(), self.id.to_string()])?;
        self.update_from(&cut_lines(&text, 4, 0), cli.section_width());
        Ok(())
    }

    pub fn update_from(&mut self, record: &str, width: usize) {
        let sections = split_sections(record, width);
        self.fields = FieldSet::new();
        if let Some(options) = sections.first() {
            self.fields.absorb_block(options);
        }
        let listing = classify_member_sections(&sections);
        self.member_serials = listing.drive_serials;
        self.member_names = listing.logical_names;
    }

    pub fn name(&self) -> &str { self.fields.text("name") }
    pub fn status(&self) -> &str { self.fields.text("status") }
    pub fn interface(&self) -> &str { self.fields.text("interface") }
    pub fn size(&self) -> &str { self.fields.text("total_size") }
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct MemberListing {
    pub drive_serials: Vec<String>,
    pub logical_names: Vec<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum MemberKind {
    Logical,
    Physical,
}

fn member_kind(header: &str) -> Option<MemberKind> {
    let lower = header.to_lowercase();
    if lower.contains("logical") {
        Some(MemberKind::Logical)
    } else if ["physical", "device", "segment"].iter().any(|w| lower.contains(w)) {
        Some(MemberKind::Physical)
    } else {
        None
    }
}

/// Sort the member listings of an array record by their section header.
///
/// Bodies under a header mentioning "logical" list logical drives by name;
/// "physical", "device" or "segment" list drives by serial. If no header
/// matched, the last section is taken as the drive listing.
pub(crate) fn classify_member_sections(sections: &[String]) -> MemberListing {
    let mut listing = MemberListing::default();
    let mut classified = false;

    for (header, body) in headed_bodies(sections, 1) {
        let Some(kind) = header.and_then(member_kind) else { continue };
        classified = true;
        let keys = listing_keys(body);
        match kind {
            MemberKind::Logical  => listing.logical_names.extend(keys),
            MemberKind::Physical => listing.drive_serials.extend(keys),
        }
    }
    if !classified && sections.len() > 1 {
        if let Some(last) = sections.last() {
            listing.drive_serials = listing_keys(last);
        }
    }
    listing
}

fn listing_keys(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(parse_listing_line)
        .filter(|l| !l.is_column_header() && !l.key.is_empty())
        .map(|l| l.key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::executor::testing::ScriptedExecutor;

    fn record() -> String {
        let d = "-".repeat(56);
        format!(
            "\
Array Number 0
   Name                                     : A
   Status                                   : Ok
   Interface                                : SATA SSD
   Total Size                               : 915715 MB
   {d}
   Array Logical Device Information
   {d}
   Logical ID                               : Status (RAID, Interface, Size MB) Name
   {d}
   Logical 0                                : Optimal (1, Data, 914583 MB) LogicalDrv 0
   {d}
   Array Physical Device Information
   {d}
   Device ID                                : Availability (SizeMB, Protocol, Type, Connector ID, Location) Serial Number
   {d}
   Device 0                                 : Present (457862MB, SATA, SSD, Connector:0, Device:0) S2UKNXAGA03141V
   Device 1                                 : Present (457862MB, SATA, SSD, Connector:0, Device:1) S2UKNXAGA03142W"
        )
    }

    #[test]
    fn reads_options_and_members() {
        let mut array = Array::new(1, 0);
        array.update_from(&record(), 56);
        assert_eq!(array.name(), "A");
        assert_eq!(array.status(), "Ok");
        assert_eq!(array.interface(), "SATA SSD");
        assert_eq!(array.size(), "894.25GB");
        assert_eq!(array.member_names, vec!["LogicalDrv 0"]);
        assert_eq!(array.member_serials, vec!["S2UKNXAGA03141V", "S2UKNXAGA03142W"]);
    }

    #[test]
    fn falls_back_to_last_section_for_drives() {
        let sections: Vec<String> = vec![
            "Name : A".into(),
            "Members".into(),
            "Segment 0 : Present (500.1 GB,SATA,HDD,Channel:0,Slot:3) Z3T5ABCD".into(),
        ];
        let listing = classify_member_sections(&sections);
        assert_eq!(listing.drive_serials, vec!["Z3T5ABCD"]);
        assert!(listing.logical_names.is_empty());
    }

    #[test]
    fn options_only_record_has_no_members() {
        let listing = classify_member_sections(&["Name : A".to_string()]);
        assert_eq!(listing, MemberListing::default());
    }

    #[test]
    fn update_queries_single_array() {
        let text = format!("x\ny\nz\nw\n{}", record());
        let cli = Arcconf::new(ScriptedExecutor::new().on(&["GETCONFIG", "1", "AR", "0"], &text, 0));
        let mut array = Array::new(1, 0);
        array.update(&cli).unwrap();
        assert_eq!(array.member_serials.len(), 2);
    }
}
