use crate::collectors::arcconf::Arcconf;
use crate::error::Result;
use crate::models::fields::{headed_bodies, FieldSet};
use crate::parser::attribute::{display_key, normalize_key};
use crate::parser::segment::{decode_tuple, parse_listing_line, SegmentTuple};
use crate::parser::text::{cut_lines, split_sections};
use serde::Serialize;
use tracing::warn;

/// A logical device (virtual drive) built on one array.
#[derive(Debug, Clone, Serialize)]
pub struct LogicalDrive {
    pub controller: u32,
    pub id:         u32,
    pub fields:     FieldSet,
    pub segments:   Vec<LogicalDriveSegment>,
}

/// One member of a logical drive as printed in its segment listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalDriveSegment {
    pub state:      String,
    pub serial:     String,
    pub protocol:   String,
    pub media_type: String,
    pub size:       String,
    pub tuple:      SegmentTuple,
}

impl LogicalDrive {
    pub fn new(controller: u32, id: u32) -> Self {
        Self { controller, id, fields: FieldSet::new(), segments: Vec::new() }
    }

    pub fn update(&mut self, cli: &Arcconf) -> Result<()> {
        let text = self.get_config(cli)?;
        self.update_from(&text, cli.section_width());
        Ok(())
    }

    /// Replace fields and segments from one `Logical Device number N` record.
    pub fn update_from(&mut self, record: &str, width: usize) {
        let sections = split_sections(record, width);
        self.fields = FieldSet::new();
        self.segments.clear();
        let Some(options) = sections.first() else { return };
        self.fields.absorb_block(options);

        for (header, body) in headed_bodies(&sections, 1) {
            let Some(header) = header else { continue };
            if is_segment_header(header) {
                self.segments.extend(body.lines().filter_map(parse_segment));
            } else {
                let display = display_key(header);
                self.fields.insert_block(&normalize_key(&display), &display, body);
            }
        }
    }

    fn get_config(&self, cli: &Arcconf) -> Result<String> {
        let text = cli.query("GETCONFIG", self.controller, &["LD".into(), self.id.to_string()])?;
        Ok(cut_lines(&text, 4, 0))
    }

    fn args(&self, extra: &[&str]) -> Vec<String> {
        let mut args = vec!["LOGICALDRIVE".to_string(), self.id.to_string()];
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    }

    pub fn name(&self) -> &str { self.fields.text("logical_device_name") }
    pub fn os_name(&self) -> &str { self.fields.text("disk_name") }
    pub fn status(&self) -> &str { self.fields.text("status_of_logical_device") }
    pub fn size(&self) -> &str { self.fields.text("size") }

    /// `raid1`, `raid50`… or empty when the level is unknown.
    pub fn raid(&self) -> String {
        match self.fields.text("raid_level") {
            "" => String::new(),
            level => format!("raid{}", level),
        }
    }

    pub fn read_cache(&self) -> String {
        self.fields.render_any(&["read_cache_setting", "read_cache_status", "read_cache_mode"])
    }

    pub fn write_cache(&self) -> String {
        self.fields.render_any(&["write_cache_setting", "write_cache_status", "write_cache_mode"])
    }

    pub fn bootable(&self) -> Option<bool> {
        self.fields.flag("bootable")
    }

    pub fn partitioned(&self) -> Option<bool> {
        self.fields.flag("partitioned")
    }

    /// Serials of every member segment, in listing order.
    pub fn segment_serials(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.serial.as_str())
    }

    pub fn set_name(&mut self, cli: &Arcconf, name: &str) -> Result<bool> {
        self.mutate_and_refresh(cli, "SETNAME", &[name], |k| k == "logical_device_name")
    }

    /// `SETSTATE … LOGICALDRIVE <id> OPTIMAL [ADVANCED <option>]`
    pub fn set_state(&mut self, cli: &Arcconf, state: &str, extra: &[&str]) -> Result<bool> {
        let mut args = vec![state];
        args.extend_from_slice(extra);
        self.mutate_and_refresh(cli, "SETSTATE", &args, |k| k.starts_with("status"))
    }

    pub fn set_cache(&mut self, cli: &Arcconf, mode: &str, extra: &[&str]) -> Result<bool> {
        let mut args = vec![mode];
        args.extend_from_slice(extra);
        self.mutate_and_refresh(cli, "SETCACHE", &args, |k| k.contains("cache"))
    }

    fn mutate_and_refresh(
        &mut self,
        cli: &Arcconf,
        verb: &str,
        extra: &[&str],
        wanted: impl Fn(&str) -> bool,
    ) -> Result<bool> {
        if !cli.mutate(verb, self.controller, &self.args(extra))? {
            return Ok(false);
        }
        let text = self.get_config(cli)?;
        let options = split_sections(&text, cli.section_width()).into_iter().next().unwrap_or_default();
        self.fields.refresh_from(&options, wanted);
        Ok(true)
    }
}

fn is_segment_header(header: &str) -> bool {
    let lower = header.to_lowercase();
    lower.contains("segment information") || lower.contains("physical device information")
}

fn parse_segment(line: &str) -> Option<LogicalDriveSegment> {
    if line.trim().is_empty() {
        return None;
    }
    let Some(listing) = parse_listing_line(line) else {
        warn!(line = line.trim(), "unparsable segment line");
        return None;
    };
    if listing.is_column_header() {
        return None;
    }
    let decoded = decode_tuple(&listing.fields)?;
    Some(LogicalDriveSegment {
        state:      listing.state,
        serial:     listing.key,
        protocol:   decoded.protocol,
        media_type: decoded.media_type,
        size:       decoded.size,
        tuple:      decoded.location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::executor::testing::ScriptedExecutor;

    fn record() -> String {
        let d = "-".repeat(56);
        format!(
            "\
Logical Device number 0
   Logical Device name                      : data
   Disk Name                                : /dev/sda
   RAID level                               : 1
   Status of Logical Device                 : Optimal
   Size                                     : 914583 MB
   Read-cache setting                       : Enabled
   Write-cache setting                      : Disabled
   Partitioned                              : Yes
   Bootable                                 : No
   {d}
   Logical Device segment information
   {d}
   Segment 0                                : Present (500.1 GB,SATA,HDD,Channel:0,Slot:3) Z3T5ABCD
   Segment 1                                : Present (500.1 GB,SATA,HDD,Channel:0,Enclosure:1,Slot:4) WD-WX11A"
        )
    }

    #[test]
    fn reads_options_and_segments() {
        let mut ld = LogicalDrive::new(1, 0);
        ld.update_from(&record(), 56);

        assert_eq!(ld.name(), "data");
        assert_eq!(ld.raid(), "raid1");
        assert_eq!(ld.os_name(), "/dev/sda");
        assert_eq!(ld.status(), "Optimal");
        assert_eq!(ld.size(), "893.15GB");
        assert_eq!(ld.read_cache(), "Yes");
        assert_eq!(ld.write_cache(), "No");
        assert_eq!(ld.partitioned(), Some(true));
        assert_eq!(ld.bootable(), Some(false));

        assert_eq!(ld.segments.len(), 2);
        assert_eq!(ld.segments[0].serial, "Z3T5ABCD");
        assert_eq!(ld.segments[0].tuple.enclosure(), None);
        assert_eq!(ld.segments[1].tuple.enclosure(), Some("1"));
        assert_eq!(ld.segments[1].tuple.slot(), "4");
        assert_eq!(ld.segment_serials().collect::<Vec<_>>(), vec!["Z3T5ABCD", "WD-WX11A"]);
    }

    #[test]
    fn skips_column_header_rows_in_member_listing() {
        let d = "-".repeat(56);
        let text = format!(
            "Logical Device number 2\n   Logical Device name : v\n   {d}\n   Array Physical Device Information\n   {d}\n   \
             Device ID : Availability (SizeMB, Protocol, Type, Connector ID, Location) Serial Number\n   {d}\n   \
             Device 0 : Present (457862MB, SATA, SSD, Connector:0, Device:0) S2UKNXAGA03141V"
        );
        let mut ld = LogicalDrive::new(1, 2);
        ld.update_from(&text, 56);
        assert_eq!(ld.segments.len(), 1);
        assert_eq!(ld.segments[0].media_type, "SSD");
    }

    #[test]
    fn missing_level_gives_empty_raid() {
        let ld = LogicalDrive::new(1, 0);
        assert_eq!(ld.raid(), "");
        assert_eq!(ld.name(), "");
        assert!(ld.segments.is_empty());
    }

    #[test]
    fn set_name_refreshes_name_only() {
        let refreshed = "a\nb\nc\nd\nLogical Device number 0\n   Logical Device name : renamed\n   Status of Logical Device : Degraded";
        let cli = Arcconf::new(
            ScriptedExecutor::new()
                .on(&["SETNAME", "1", "LOGICALDRIVE", "0", "renamed"], "", 0)
                .on(&["GETCONFIG", "1", "LD", "0"], refreshed, 0),
        );
        let mut ld = LogicalDrive::new(1, 0);
        ld.update_from(&record(), 56);

        assert!(ld.set_name(&cli, "renamed").unwrap());
        assert_eq!(ld.name(), "renamed");
        assert_eq!(ld.status(), "Optimal");
    }

    #[test]
    fn set_cache_refreshes_cache_lines() {
        let refreshed = "a\nb\nc\nd\n   Read-cache setting : Disabled\n   Logical Device name : other";
        let cli = Arcconf::new(
            ScriptedExecutor::new()
                .on(&["SETCACHE", "1", "LOGICALDRIVE", "0", "roff"], "", 0)
                .on(&["GETCONFIG", "1", "LD", "0"], refreshed, 0),
        );
        let mut ld = LogicalDrive::new(1, 0);
        ld.update_from(&record(), 56);

        assert!(ld.set_cache(&cli, "roff", &[]).unwrap());
        assert_eq!(ld.read_cache(), "No");
        assert_eq!(ld.name(), "data");
    }

    #[test]
    fn rejected_state_change_keeps_status() {
        let cli = Arcconf::new(ScriptedExecutor::new().on(&["SETSTATE"], "Command aborted.", 1));
        let mut ld = LogicalDrive::new(1, 0);
        ld.update_from(&record(), 56);
        assert!(!ld.set_state(&cli, "OPTIMAL", &[]).unwrap());
        assert_eq!(ld.status(), "Optimal");
    }
}
