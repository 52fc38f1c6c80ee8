use crate::collectors::arcconf::Arcconf;
use crate::error::{Error, Result};
use crate::models::array::{Array, ArrayMembers};
use crate::models::fields::{named_blocks, FieldSet};
use crate::models::logical_drive::LogicalDrive;
use crate::models::physical_drive::{parse_device_report, DeviceAddress, Enclosure, EnclosureKind, PhysicalDrive};
use crate::models::task::Task;
use crate::parser::attribute::{display_key, normalize_key, parse_attribute, AttrValue};
use crate::parser::properties::{build_properties, KeyStyle, Properties, Property};
use crate::parser::text::{cut_lines, paragraphs, split_sections};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

lazy_static! {
    static ref NO_CURRENT_OPERATION: Regex = Regex::new(r"Current operation\s*:\s*None").unwrap();
}

/// Section offsets of a RAID-mode `GETCONFIG AD` report, after the primary
/// block: body position, field name, display name.
const RAID_LAYOUT: [(usize, &str, &str); 3] = [
    (2, "raid_properties", "RAID Properties"),
    (4, "versions", "Versions"),
    (6, "battery", "Battery"),
];
const RAID_LAYOUT_END: usize = 7;

/// Operating mode as reported by `Controller Mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ControllerMode {
    Raid,
    Hba,
    Mixed,
    Unknown(String),
}

impl ControllerMode {
    /// "RAID (Hide RAW)" and "RAID (Expose RAW)" are both RAID.
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        if upper.starts_with("HBA") {
            ControllerMode::Hba
        } else if upper.contains("MIXED") {
            ControllerMode::Mixed
        } else if upper.contains("RAID") {
            ControllerMode::Raid
        } else {
            ControllerMode::Unknown(raw.trim().to_string())
        }
    }

    pub fn is_raid_capable(&self) -> bool {
        matches!(self, ControllerMode::Raid | ControllerMode::Mixed)
    }
}

/// Natural-key lookups, rebuilt whenever drives or logical drives are listed.
#[derive(Debug, Clone, Default)]
struct ControllerIndex {
    serials:  HashMap<String, usize>,
    ld_names: HashMap<String, u32>,
}

impl ControllerIndex {
    fn rebuild_drives(&mut self, drives: &[PhysicalDrive]) {
        self.serials.clear();
        for (pos, drive) in drives.iter().enumerate() {
            let serial = drive.serial();
            if serial.is_empty() {
                continue;
            }
            if self.serials.contains_key(serial) {
                warn!(serial, address = %drive.address, "duplicate drive serial; keeping first");
                continue;
            }
            self.serials.insert(serial.to_string(), pos);
        }
    }

    fn rebuild_logical_drives(&mut self, lds: &[LogicalDrive]) {
        self.ld_names.clear();
        for ld in lds {
            if !ld.name().is_empty() {
                self.ld_names.entry(ld.name().to_string()).or_insert(ld.id);
            }
        }
    }
}

/// Parameters of `CREATE <id> LOGICALDRIVE`.
#[derive(Debug, Clone)]
pub struct NewLogicalDrive {
    pub name:      String,
    /// `raid1`, `RAID5` or a bare level such as `10`.
    pub raid:      String,
    pub drives:    Vec<DeviceAddress>,
    pub stripe_kb: Option<u32>,
    /// Megabytes, `MAX` or `MAXMBR`.
    pub size:      String,
}

impl NewLogicalDrive {
    pub fn new(name: &str, raid: &str, drives: Vec<DeviceAddress>) -> Self {
        Self {
            name: name.to_string(),
            raid: raid.to_string(),
            drives,
            stripe_kb: Some(64),
            size: "MAX".to_string(),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["LOGICALDRIVE".to_string()];
        if !self.name.is_empty() {
            args.extend(["Name".to_string(), self.name.clone()]);
        }
        if let Some(kb) = self.stripe_kb {
            args.extend(["Stripesize".to_string(), kb.to_string()]);
        }
        args.push(self.size.clone());
        args.push(self.raid.to_lowercase().replace("raid", ""));
        for drive in &self.drives {
            args.extend(drive.args());
        }
        args.push("noprompt".to_string());
        args
    }
}

/// A RAID/HBA controller and everything found behind it.
#[derive(Debug, Clone, Serialize)]
pub struct Controller {
    pub id:             u32,
    pub fields:         FieldSet,
    pub drives:         Vec<PhysicalDrive>,
    pub enclosures:     Vec<Enclosure>,
    pub logical_drives: Vec<LogicalDrive>,
    pub arrays:         Vec<Array>,
    pub tasks:          Vec<Task>,
    #[serde(skip)]
    index:              ControllerIndex,
}

impl Controller {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            fields: FieldSet::new(),
            drives: Vec::new(),
            enclosures: Vec::new(),
            logical_drives: Vec::new(),
            arrays: Vec::new(),
            tasks: Vec::new(),
            index: ControllerIndex::default(),
        }
    }

    /// Load the controller report plus every collection and resolve array
    /// membership.
    pub fn initialize(&mut self, cli: &Arcconf) -> Result<()> {
        self.update(cli)?;
        self.get_pds(cli)?;
        self.get_lds(cli)?;
        self.get_arrays(cli)?;
        let ids: Vec<u32> = self.arrays.iter().map(|a| a.id).collect();
        for id in ids {
            self.resolve_array(cli, id)?;
        }
        self.get_tasks(cli)?;
        Ok(())
    }

    /// Re-read `GETCONFIG <id> AD`.
    pub fn update(&mut self, cli: &Arcconf) -> Result<()> {
        let text = cli.query("GETCONFIG", self.id, &["AD".into()])?;
        self.update_from(&cut_lines(&text, 4, 0), cli.section_width());
        Ok(())
    }

    pub fn update_from(&mut self, text: &str, width: usize) {
        let sections = split_sections(text, width);
        self.fields = FieldSet::new();
        let Some(primary) = sections.first() else {
            warn!(controller = self.id, "empty controller report");
            return;
        };
        self.fields.absorb_block(primary);

        if self.mode().is_raid_capable() {
            self.raid_layout(&sections);
        } else {
            self.walk_sections(&sections, 1);
        }
    }

    fn raid_layout(&mut self, sections: &[String]) {
        for (offset, key, display) in RAID_LAYOUT {
            match sections.get(offset) {
                Some(body) => {
                    self.fields.insert_block(key, display, body);
                }
                None => debug!(controller = self.id, section = key, "section missing from RAID report"),
            }
        }
        self.walk_sections(sections, RAID_LAYOUT_END);
    }

    fn walk_sections(&mut self, sections: &[String], start: usize) {
        for block in named_blocks(sections, start) {
            let label = section_label(block.header);
            let key = normalize_key(&label);
            if label.to_lowercase().contains("temperature sensors") {
                let (fields, facts) = sensor_groups(block.body);
                self.fields.insert_group(&key, &label, fields, facts);
            } else {
                self.fields.insert_block(&key, &label, block.body);
            }
        }
    }

    pub fn mode(&self) -> ControllerMode {
        ControllerMode::parse(self.fields.text("controller_mode"))
    }

    pub fn is_hba(&self) -> bool {
        self.mode() == ControllerMode::Hba
    }

    pub fn is_raid_capable(&self) -> bool {
        self.mode().is_raid_capable()
    }

    pub fn model(&self) -> &str { self.fields.text_any(&["controller_model", "model"]) }
    pub fn status(&self) -> &str { self.fields.text("controller_status") }
    pub fn channel_description(&self) -> &str { self.fields.text("channel_description") }

    /// Only a RAID-capable controller has the fixed `RAID Properties` block.
    pub fn raid_properties(&self) -> Option<&Properties> {
        self.is_raid_capable().then(|| self.fields.group("raid_properties")).flatten()
    }
    pub fn versions(&self) -> Option<&Properties> { self.fields.group("versions") }
    pub fn battery(&self) -> Option<&Properties> { self.fields.group("battery") }

    /// Refresh physical drives and enclosures from `GETCONFIG <id> PD`.
    pub fn get_pds(&mut self, cli: &Arcconf) -> Result<&[PhysicalDrive]> {
        let text = cli.query("GETCONFIG", self.id, &["PD".into()])?;
        let report = parse_device_report(self.id, &cut_lines(&text, 4, 0), cli.section_width());
        self.drives = report.drives;
        self.enclosures = report.enclosures;
        self.index.rebuild_drives(&self.drives);
        Ok(&self.drives)
    }

    pub fn get_lds(&mut self, cli: &Arcconf) -> Result<&[LogicalDrive]> {
        let width = cli.section_width();
        let listing = self.fetch_listing(cli, "LD", &["not supported", "No logical devices configured"])?;
        self.logical_drives = numbered_records(listing.as_deref().unwrap_or(""))
            .into_iter()
            .map(|(id, record)| {
                let mut ld = LogicalDrive::new(self.id, id);
                ld.update_from(&record, width);
                ld
            })
            .collect();
        self.index.rebuild_logical_drives(&self.logical_drives);
        Ok(&self.logical_drives)
    }

    pub fn get_arrays(&mut self, cli: &Arcconf) -> Result<&[Array]> {
        let width = cli.section_width();
        let listing = self.fetch_listing(cli, "AR", &["not supported", "No arrays configured"])?;
        self.arrays = numbered_records(listing.as_deref().unwrap_or(""))
            .into_iter()
            .map(|(id, record)| {
                let mut array = Array::new(self.id, id);
                array.update_from(&record, width);
                array
            })
            .collect();
        Ok(&self.arrays)
    }

    pub fn get_tasks(&mut self, cli: &Arcconf) -> Result<&[Task]> {
        let out = cli.run("GETSTATUS", self.id, &[])?;
        if NO_CURRENT_OPERATION.is_match(&out.text) {
            self.tasks.clear();
            return Ok(&self.tasks);
        }
        if !out.code.is_success() {
            return Err(Error::Query { command: format!("GETSTATUS {}", self.id), code: out.code.code() });
        }
        self.tasks = paragraphs(&cut_lines(&out.text, 1, 0))
            .iter()
            .map(|block| Task::from_block(block))
            .filter(|task| !task.fields.is_empty())
            .collect();
        Ok(&self.tasks)
    }

    /// `GETCONFIG <id> <object>` without its banner, or `None` when the
    /// controller reports nothing of that kind.
    fn fetch_listing(&self, cli: &Arcconf, object: &str, empty_markers: &[&str]) -> Result<Option<String>> {
        let out = cli.run("GETCONFIG", self.id, &[object.to_string()])?;
        if let Some(marker) = empty_markers.iter().copied().find(|m| out.text.contains(*m)) {
            debug!(controller = self.id, object, marker, "nothing configured");
            return Ok(None);
        }
        if !out.code.is_success() {
            return Err(Error::Query { command: format!("GETCONFIG {} {}", self.id, object), code: out.code.code() });
        }
        Ok(Some(cut_lines(&out.text, 4, 0)))
    }

    pub fn drive(&self, address: DeviceAddress) -> Option<&PhysicalDrive> {
        self.drives.iter().find(|d| d.address == address)
    }

    pub fn drive_by_serial(&self, serial: &str) -> Option<&PhysicalDrive> {
        self.index
            .serials
            .get(serial)
            .and_then(|&pos| self.drives.get(pos))
            .filter(|d| d.serial() == serial)
    }

    pub fn logical_drive(&self, id: u32) -> Option<&LogicalDrive> {
        self.logical_drives.iter().find(|ld| ld.id == id)
    }

    pub fn logical_drive_by_name(&self, name: &str) -> Option<&LogicalDrive> {
        self.index.ld_names.get(name).and_then(|&id| self.logical_drive(id))
    }

    pub fn array(&self, id: u32) -> Option<&Array> {
        self.arrays.iter().find(|a| a.id == id)
    }

    /// Re-fetch one array and link it to its drives and logical drives.
    ///
    /// Matched drives are re-fetched too. Listed members missing from the
    /// controller's collections are left out. `Ok(None)` if no array with
    /// that id has been listed.
    pub fn resolve_array(&mut self, cli: &Arcconf, array_id: u32) -> Result<Option<&ArrayMembers>> {
        let Some(pos) = self.arrays.iter().position(|a| a.id == array_id) else {
            warn!(controller = self.id, array = array_id, "no such array");
            return Ok(None);
        };
        if self.drives.is_empty() {
            self.get_pds(cli)?;
        }
        if self.logical_drives.is_empty() {
            self.get_lds(cli)?;
        }

        self.arrays[pos].update(cli)?;
        let serials = self.arrays[pos].member_serials.clone();
        let names = self.arrays[pos].member_names.clone();

        let drives = self.refresh_drives_by_serial(cli, &serials)?;
        let mut logical_drives = Vec::new();
        for name in &names {
            match self.index.ld_names.get(name) {
                Some(&id) => logical_drives.push(id),
                None => debug!(controller = self.id, array = array_id, name = %name, "array member logical drive not found"),
            }
        }

        self.arrays[pos].members = ArrayMembers { drives, logical_drives };
        Ok(Some(&self.arrays[pos].members))
    }

    /// Drives of an array as last resolved by [`Controller::resolve_array`].
    pub fn array_drives(&self, array_id: u32) -> Vec<&PhysicalDrive> {
        self.array(array_id)
            .map(|a| a.members.drives.iter().filter_map(|&addr| self.drive(addr)).collect())
            .unwrap_or_default()
    }

    pub fn array_logical_drives(&self, array_id: u32) -> Vec<&LogicalDrive> {
        self.array(array_id)
            .map(|a| a.members.logical_drives.iter().filter_map(|&id| self.logical_drive(id)).collect())
            .unwrap_or_default()
    }

    /// Re-fetch a logical drive and the drives backing its segments.
    pub fn logical_drive_drives(&mut self, cli: &Arcconf, ld_id: u32) -> Result<Vec<DeviceAddress>> {
        let Some(pos) = self.logical_drives.iter().position(|ld| ld.id == ld_id) else {
            warn!(controller = self.id, logical_drive = ld_id, "no such logical drive");
            return Ok(Vec::new());
        };
        if self.drives.is_empty() {
            self.get_pds(cli)?;
        }
        self.logical_drives[pos].update(cli)?;
        let serials: Vec<String> = self.logical_drives[pos].segment_serials().map(str::to_string).collect();
        self.refresh_drives_by_serial(cli, &serials)
    }

    fn refresh_drives_by_serial(&mut self, cli: &Arcconf, serials: &[String]) -> Result<Vec<DeviceAddress>> {
        let mut found = Vec::new();
        for serial in serials {
            let Some(&pos) = self.index.serials.get(serial) else {
                debug!(controller = self.id, serial = %serial, "member drive not found");
                continue;
            };
            let Some(drive) = self.drives.get_mut(pos).filter(|d| d.serial() == serial) else {
                debug!(controller = self.id, serial = %serial, "drive list changed since last listing");
                continue;
            };
            drive.update(cli)?;
            found.push(drive.address);
        }
        Ok(found)
    }

    /// Enclosures that sit on an expander, if `EXPANDERLIST` reports any.
    pub fn expanders(&mut self, cli: &Arcconf) -> Result<Vec<&Enclosure>> {
        let out = cli.run("EXPANDERLIST", self.id, &[])?;
        if out.text.contains("No expanders connected") {
            return Ok(Vec::new());
        }
        if !out.code.is_success() {
            return Err(Error::Query { command: format!("EXPANDERLIST {}", self.id), code: out.code.code() });
        }
        if self.drives.is_empty() && self.enclosures.is_empty() {
            self.get_pds(cli)?;
        }
        Ok(self.enclosures.iter().filter(|e| e.kind() == EnclosureKind::Expander).collect())
    }

    /// Connector settings from `GETCONFIG <id> CN`, keyed by connector number.
    pub fn connectors(&self, cli: &Arcconf) -> Result<IndexMap<String, Properties>> {
        let text = cli.query("GETCONFIG", self.id, &["CN".into()])?;
        let mut connectors = IndexMap::new();
        for part in paragraphs(&cut_lines(&text, 4, 0)) {
            let (head, body) = part.split_once('\n').unwrap_or((part.as_str(), ""));
            let id = head.rsplit('#').next().unwrap_or(head).trim().to_string();
            connectors.insert(id, build_properties(body, KeyStyle::Field));
        }
        Ok(connectors)
    }

    /// Controller-wide PHY error counters keyed by PHY id.
    pub fn phy_error_counters(&self, cli: &Arcconf) -> Result<IndexMap<String, Properties>> {
        let text = cli.query("PHYERRORLOG", self.id, &[])?;
        let mut counters = IndexMap::new();
        for part in paragraphs(&cut_lines(&text, 8, 0)) {
            let (head, body) = part.split_once('\n').unwrap_or((part.as_str(), ""));
            let Some(id) = parse_attribute(head) else { continue };
            counters.insert(id.value.render(), build_properties(body, KeyStyle::Field));
        }
        Ok(counters)
    }

    /// `SETCACHE <id> <mode> [args…]`, e.g. `NOBATTERYWRITECACHE enable`.
    pub fn set_cache(&self, cli: &Arcconf, mode: &str, extra: &[&str]) -> Result<bool> {
        cli.mutate("SETCACHE", self.id, &with_args(&[mode], extra, &[]))
    }

    /// Reset to factory settings. Removes every logical drive.
    pub fn set_config_default(&self, cli: &Arcconf) -> Result<bool> {
        cli.mutate("SETCONFIG", self.id, &["default".to_string()])
    }

    pub fn set_connector_mode(&self, cli: &Arcconf, args: &[&str]) -> Result<bool> {
        cli.mutate("SETCONNECTORMODE", self.id, &with_args(args, &[], &["noprompt"]))
    }

    pub fn set_controller_mode(&self, cli: &Arcconf, args: &[&str]) -> Result<bool> {
        cli.mutate("SETCONTROLLERMODE", self.id, &with_args(args, &[], &["noprompt"]))
    }

    pub fn set_stats_data_collection(&self, cli: &Arcconf, enable: bool) -> Result<bool> {
        let flag = if enable { "Enable" } else { "Disable" };
        cli.mutate("SETSTATSDATACOLLECTION", self.id, &[flag.to_string()])
    }

    /// Create a logical drive and return its id once it shows up in the
    /// refreshed listing under the requested name.
    pub fn create_logical_drive(&mut self, cli: &Arcconf, request: &NewLogicalDrive) -> Result<Option<u32>> {
        if !cli.mutate("CREATE", self.id, &request.args())? {
            return Ok(None);
        }
        self.get_lds(cli)?;
        if request.name.is_empty() {
            warn!(controller = self.id, "created an unnamed logical drive; it cannot be identified");
            return Ok(None);
        }
        let id = self.index.ld_names.get(&request.name).copied();
        if id.is_none() {
            warn!(controller = self.id, name = %request.name, "created logical drive not found in listing");
        }
        Ok(id)
    }
}

fn with_args(head: &[&str], extra: &[&str], tail: &[&str]) -> Vec<String> {
    head.iter().chain(extra).chain(tail).map(|s| s.to_string()).collect()
}

/// "Controller Version Information" -> "Version".
fn section_label(header: &str) -> String {
    display_key(header).replace("Information", "").replace("Controller", "").trim().to_string()
}

/// One nested group per sensor paragraph, keyed by its `Sensor ID` or by
/// position when the paragraph has none.
fn sensor_groups(body: &str) -> (Properties, Properties) {
    let mut fields = Properties::new();
    let mut facts = Properties::new();
    for (pos, para) in paragraphs(body).iter().enumerate() {
        let sensor = build_properties(para, KeyStyle::Field);
        if sensor.is_empty() {
            continue;
        }
        let id = sensor
            .get("sensor_id")
            .and_then(Property::as_value)
            .map(AttrValue::render)
            .unwrap_or_else(|| pos.to_string());
        facts.insert(id.clone(), Property::Group(build_properties(para, KeyStyle::Display)));
        fields.insert(id, Property::Group(sensor));
    }
    (fields, facts)
}

/// Split a listing into paragraphs whose first line ends with the record
/// number (`Logical Device number 3`, `Array Number 0`).
fn numbered_records(text: &str) -> Vec<(u32, String)> {
    paragraphs(text)
        .into_iter()
        .filter_map(|record| {
            let id = record
                .lines()
                .next()
                .and_then(|l| l.split_whitespace().last())
                .and_then(|w| w.parse::<u32>().ok());
            match id {
                Some(id) => Some((id, record)),
                None => {
                    warn!(record = %record, "record without a numeric id");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::executor::testing::ScriptedExecutor;

    fn banner(title: &str) -> String {
        let bar = "-".repeat(70);
        format!("Controllers found: 1\n{bar}\n{title}\n{bar}\n")
    }

    fn raid_report() -> String {
        let d = "-".repeat(56);
        format!(
            "{}\
   Controller Status                          : Optimal
   Controller Mode                            : RAID (Hide RAW)
   Channel description                        : SCSI
   Controller Model                           : Adaptec ASR8405
   {d}
   RAID Properties
   {d}
   Logical devices/Failed/Degraded            : 1/0/0
   Copyback                                   : Disabled
   {d}
   Controller Version Information
   {d}
   BIOS                                       : 7.5-0 (32118)
   Firmware                                   : 7.5-0 (32118)
   {d}
   Controller Battery Information
   {d}
   Status                                     : Not Installed
   {d}
   Controller Vital Product Data
   {d}
   Platform Assembly Number                   : 2277600-R

Command completed successfully.
",
            banner("Controller information")
        )
    }

    fn hba_report() -> String {
        let d = "-".repeat(56);
        format!(
            "{}\
   Controller Status                          : Optimal
   Controller Mode                            : HBA
   Controller Model                           : Adaptec HBA 1100-8i
   {d}
   Controller Version Information
   {d}
   Firmware                                   : 4.11
   {d}
   Temperature Sensors Information
   {d}
   Sensor ID                                  : 0
   Current Value                              : 35 deg C
   Location                                   : Inlet Ambient

   Sensor ID                                  : 1
   Current Value                              : 40 deg C
   Location                                   : ASIC
",
            banner("Controller information")
        )
    }

    #[test]
    fn parses_modes() {
        assert_eq!(ControllerMode::parse("RAID (Expose RAW)"), ControllerMode::Raid);
        assert_eq!(ControllerMode::parse("HBA"), ControllerMode::Hba);
        assert_eq!(ControllerMode::parse("Mixed"), ControllerMode::Mixed);
        assert_eq!(ControllerMode::parse("Simple"), ControllerMode::Unknown("Simple".into()));
        assert!(ControllerMode::Mixed.is_raid_capable());
        assert!(!ControllerMode::Hba.is_raid_capable());
    }

    #[test]
    fn raid_report_uses_fixed_layout() {
        let cli = Arcconf::new(ScriptedExecutor::new().on(&["GETCONFIG", "1", "AD"], &raid_report(), 0));
        let mut controller = Controller::new(1);
        controller.update(&cli).unwrap();

        assert_eq!(controller.mode(), ControllerMode::Raid);
        assert_eq!(controller.model(), "Adaptec ASR8405");
        assert_eq!(controller.status(), "Optimal");
        assert_eq!(controller.channel_description(), "SCSI");

        let raid = controller.raid_properties().unwrap();
        assert_eq!(raid["copyback"], Property::Value(AttrValue::Flag(false)));
        assert!(controller.versions().unwrap().contains_key("firmware"));
        assert!(controller.battery().unwrap().contains_key("status"));
        assert!(controller.fields.group("vital_product_data").is_some());
        assert!(controller.fields.group("version").is_none());
    }

    #[test]
    fn hba_report_is_walked_by_header() {
        let cli = Arcconf::new(ScriptedExecutor::new().on(&["GETCONFIG", "2", "AD"], &hba_report(), 0));
        let mut controller = Controller::new(2);
        controller.update(&cli).unwrap();

        assert!(controller.is_hba());
        assert!(controller.raid_properties().is_none());
        assert!(controller.fields.group("version").unwrap().contains_key("firmware"));

        let sensors = controller.fields.group("temperature_sensors").unwrap();
        assert_eq!(sensors.keys().collect::<Vec<_>>(), vec!["0", "1"]);
        let asic = sensors["1"].as_group().unwrap();
        assert_eq!(asic["location"], Property::Value(AttrValue::Text("ASIC".into())));
        assert!(controller.fields.fact("Temperature Sensors").is_some());
    }

    #[test]
    fn blank_raid_properties_keep_later_offsets() {
        let d = "-".repeat(56);
        let text = format!(
            "Controller Mode : RAID (Expose RAW)\n{d}\nRAID Properties\n{d}\n   \n{d}\nController Version Information\n{d}\n\
             Firmware : 7.5-0\n{d}\nController Battery Information\n{d}\nStatus : Optimal"
        );
        let mut controller = Controller::new(1);
        controller.update_from(&text, 56);

        assert!(controller.raid_properties().is_none());
        assert!(controller.versions().unwrap().contains_key("firmware"));
        assert!(controller.battery().unwrap().contains_key("status"));
    }

    #[test]
    fn short_raid_report_keeps_primary_fields() {
        let mut controller = Controller::new(1);
        controller.update_from("Controller Mode : RAID\nController Status : Optimal", 56);
        assert_eq!(controller.status(), "Optimal");
        assert!(controller.versions().is_none());
    }

    #[test]
    fn hba_without_logical_drives_lists_nothing() {
        let cli = Arcconf::new(
            ScriptedExecutor::new()
                .on(&["GETCONFIG", "2", "LD"], "Controllers found: 1\nThis operation is not supported.", 2)
                .on(&["GETCONFIG", "2", "AR"], "No arrays configured", 0),
        );
        let mut controller = Controller::new(2);
        assert!(controller.get_lds(&cli).unwrap().is_empty());
        assert!(controller.get_arrays(&cli).unwrap().is_empty());
    }

    #[test]
    fn failing_listing_is_an_error() {
        let cli = Arcconf::new(ScriptedExecutor::new().on(&["GETCONFIG", "1", "LD"], "garbage", 1));
        let mut controller = Controller::new(1);
        assert!(matches!(controller.get_lds(&cli), Err(Error::Query { code: 1, .. })));
    }

    #[test]
    fn no_current_operation_means_no_tasks() {
        let cli = Arcconf::new(
            ScriptedExecutor::new().on(&["GETSTATUS", "1"], "Controllers found: 1\nCurrent operation              : None\n", 0),
        );
        let mut controller = Controller::new(1);
        assert!(controller.get_tasks(&cli).unwrap().is_empty());
    }

    #[test]
    fn reads_task_paragraphs() {
        let text = "Controllers found: 1\nLogical Device Task:\n   Logical Device : 0\n   Current operation : Rebuild\n\nLogical Device Task:\n   Logical Device : 1\n   Current operation : Verify\n";
        let cli = Arcconf::new(ScriptedExecutor::new().on(&["GETSTATUS", "1"], text, 0));
        let mut controller = Controller::new(1);
        let tasks = controller.get_tasks(&cli).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].operation(), "Verify");
    }

    #[test]
    fn builds_create_arguments() {
        let request = NewLogicalDrive::new("data", "RAID1", vec![DeviceAddress::new(0, 0), DeviceAddress::new(0, 1)]);
        assert_eq!(
            request.args(),
            vec!["LOGICALDRIVE", "Name", "data", "Stripesize", "64", "MAX", "1", "0", "0", "0", "1", "noprompt"]
        );
    }

    #[test]
    fn rejected_create_returns_none() {
        let cli = Arcconf::new(ScriptedExecutor::new().on(&["CREATE", "1"], "Command aborted.", 2));
        let mut controller = Controller::new(1);
        let request = NewLogicalDrive::new("data", "raid0", vec![DeviceAddress::new(0, 0)]);
        assert_eq!(controller.create_logical_drive(&cli, &request).unwrap(), None);
    }

    #[test]
    fn reads_connectors() {
        let text = format!(
            "{}Connector #0\n   Connector name : CN0\n   Functional Mode : HBA\n\nConnector #1\n   Connector name : CN1\n",
            banner("Connector information")
        );
        let cli = Arcconf::new(ScriptedExecutor::new().on(&["GETCONFIG", "1", "CN"], &text, 0));
        let connectors = Controller::new(1).connectors(&cli).unwrap();
        assert_eq!(connectors.len(), 2);
        assert_eq!(connectors["1"]["connector_name"], Property::Value(AttrValue::Text("CN1".into())));
    }

    #[test]
    fn no_expanders_connected() {
        let cli = Arcconf::new(ScriptedExecutor::new().on(&["EXPANDERLIST", "1"], "No expanders connected", 0));
        let mut controller = Controller::new(1);
        assert!(controller.expanders(&cli).unwrap().is_empty());
    }

    #[test]
    fn mode_change_appends_noprompt() {
        // Only the full command line with noprompt is answered with SUCCESS.
        let executor = ScriptedExecutor::new()
            .on(&["SETCONTROLLERMODE", "1", "2", "noprompt"], "", 0)
            .on(&["SETSTATSDATACOLLECTION", "1", "Enable"], "", 0);
        let cli = Arcconf::new(executor);
        let controller = Controller::new(1);
        assert!(controller.set_controller_mode(&cli, &["2"]).unwrap());
        assert!(controller.set_stats_data_collection(&cli, true).unwrap());
        assert!(!controller.set_stats_data_collection(&cli, false).unwrap());
    }
}
