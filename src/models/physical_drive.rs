use crate::collectors::arcconf::Arcconf;
use crate::collectors::executor::ResultCode;
use crate::error::{Error, Result};
use crate::models::fields::{named_blocks, FieldSet};
use crate::parser::attribute::{display_key, normalize_key, parse_attribute};
use crate::parser::properties::{build_properties, KeyStyle, Properties};
use crate::parser::text::{cut_lines, paragraphs, split_sections};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::warn;

lazy_static! {
    static ref CHANNEL_HEADER: Regex = Regex::new(r"^\s*Channel #\d+:\s*$").unwrap();
    static ref DEVICE_HEADER: Regex = Regex::new(r"^\s*Device #\d+\s*$").unwrap();
}

const HARD_DRIVE_MARKER: &str = "Device is a Hard drive";
const NOT_A_DRIVE_MARKER: &str = "Device is not a hard drive";

/// Channel/device pair identifying a device on its controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeviceAddress {
    pub channel: u32,
    pub device:  u32,
}

impl DeviceAddress {
    pub fn new(channel: u32, device: u32) -> Self {
        Self { channel, device }
    }

    /// Parse the value of `Reported Channel,Device(T:L) : 2,3(3:0)`.
    pub fn from_reported(value: &str) -> Option<Self> {
        let head = value.split('(').next()?;
        let (channel, device) = head.split_once(',')?;
        Some(Self { channel: channel.trim().parse().ok()?, device: device.trim().parse().ok()? })
    }

    pub fn args(&self) -> [String; 2] {
        [self.channel.to_string(), self.device.to_string()]
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.channel, self.device)
    }
}

/// One hard drive attached to a controller.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalDrive {
    pub controller: u32,
    pub address:    DeviceAddress,
    pub fields:     FieldSet,
}

impl PhysicalDrive {
    pub fn new(controller: u32, address: DeviceAddress) -> Self {
        Self { controller, address, fields: FieldSet::new() }
    }

    /// Re-fetch `GETCONFIG <id> PD <ch> <dev>` and replace all fields.
    pub fn update(&mut self, cli: &Arcconf) -> Result<()> {
        let text = cli.query("GETCONFIG", self.controller, &self.config_args())?;
        self.update_from(&cut_lines(&text, 4, 0), cli.section_width());
        Ok(())
    }

    pub fn update_from(&mut self, text: &str, width: usize) {
        self.fields = populate_device(text, width);
    }

    fn config_args(&self) -> Vec<String> {
        let [ch, dev] = self.address.args();
        vec!["PD".into(), ch, dev]
    }

    fn device_args(&self, extra: &[&str]) -> Vec<String> {
        let [ch, dev] = self.address.args();
        let mut args = vec!["DEVICE".to_string(), ch, dev];
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    }

    pub fn vendor(&self) -> &str { self.fields.text("vendor") }
    pub fn model(&self) -> &str { self.fields.text("model") }
    pub fn serial(&self) -> &str { self.fields.text("serial_number") }
    pub fn state(&self) -> &str { self.fields.text("state") }
    pub fn size(&self) -> &str { self.fields.text("total_size") }
    pub fn write_cache(&self) -> String { self.fields.render("write_cache") }

    /// OS device name without `/dev/`, FreeBSD `nvd` mapped to `nvme`.
    pub fn name(&self) -> String {
        self.fields.text("disk_name").replace("/dev/", "").replace("nvd", "nvme")
    }

    /// Change the drive state (HSP, RDY, DDD, EED).
    ///
    /// On success only the `State` line is re-read. Rejections leave the
    /// drive untouched and return `Ok(false)`.
    pub fn set_state(&mut self, cli: &Arcconf, state: &str, extra: &[&str]) -> Result<bool> {
        let mut args = vec![state];
        args.extend_from_slice(extra);
        if !cli.mutate("SETSTATE", self.controller, &self.device_args(&args))? {
            return Ok(false);
        }
        let text = cli.query("GETCONFIG", self.controller, &self.config_args())?;
        self.fields.refresh_from(&cut_lines(&text, 4, 0), |k| k == "state");
        Ok(true)
    }

    /// Per-PHY error counters keyed by PHY id. SATA devices report none.
    pub fn phy_error_counters(&self, cli: &Arcconf) -> Result<IndexMap<String, Properties>> {
        let out = cli.run("PHYERRORLOG", self.controller, &self.device_args(&[]))?;
        if out.code == ResultCode::Abort {
            return Ok(IndexMap::new());
        }
        if !out.code.is_success() {
            return Err(Error::Query { command: "PHYERRORLOG".into(), code: out.code.code() });
        }
        if out.text.contains("SATA") {
            return Ok(IndexMap::new());
        }
        let mut counters = IndexMap::new();
        for phy in paragraphs(&cut_lines(&out.text, 15, 0)) {
            if phy.contains("No device attached") {
                continue;
            }
            let lines: Vec<&str> = phy.lines().collect();
            let Some(id) = lines.first().and_then(|l| parse_attribute(l)) else { continue };
            let body = lines.get(7..).unwrap_or(&[]).join("\n");
            counters.insert(id.value.render(), build_properties(&body, KeyStyle::Field));
        }
        Ok(counters)
    }
}

/// Whether an enclosure services device sits behind an expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnclosureKind {
    Expander,
    Enclosure,
}

/// Enclosure services device or expander reported among physical devices.
#[derive(Debug, Clone, Serialize)]
pub struct Enclosure {
    pub controller: u32,
    pub address:    DeviceAddress,
    pub fields:     FieldSet,
}

impl Enclosure {
    pub fn new(controller: u32, address: DeviceAddress) -> Self {
        Self { controller, address, fields: FieldSet::new() }
    }

    pub fn update(&mut self, cli: &Arcconf) -> Result<()> {
        let [ch, dev] = self.address.args();
        let out = cli.run("GETCONFIG", self.controller, &["PD".into(), ch, dev])?;
        // Some firmware refuses per-device queries for non-drives; keep what we have.
        if out.text.contains(NOT_A_DRIVE_MARKER) {
            return Ok(());
        }
        if !out.code.is_success() {
            return Err(Error::Query { command: "GETCONFIG PD".into(), code: out.code.code() });
        }
        self.update_from(&cut_lines(&out.text, 4, 0), cli.section_width());
        Ok(())
    }

    pub fn update_from(&mut self, text: &str, width: usize) {
        self.fields = populate_device(text, width);
    }

    pub fn kind(&self) -> EnclosureKind {
        if self.fields.get("expander_id").is_some() {
            EnclosureKind::Expander
        } else {
            EnclosureKind::Enclosure
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind() {
            EnclosureKind::Expander  => "Expander",
            EnclosureKind::Enclosure => "Enclosure",
        }
    }

    pub fn vendor(&self) -> &str { self.fields.text("vendor") }
    pub fn model(&self) -> &str { self.fields.text("model") }
}

/// Primary block as flat fields, then header/body pairs as nested groups
/// (`Device Phy Information` -> `phy_information`).
fn populate_device(text: &str, width: usize) -> FieldSet {
    let sections = split_sections(text, width);
    let mut fields = FieldSet::new();
    let Some(primary) = sections.first() else { return fields };
    fields.absorb_block(primary);

    for block in named_blocks(&sections, 1) {
        let display = display_key(block.header);
        let key = normalize_key(&display);
        let key = key.strip_prefix("device_").unwrap_or(&key);
        fields.insert_block(key, &display, block.body);
    }
    fields
}

/// Devices found in a full `GETCONFIG <id> PD` report.
#[derive(Debug, Default)]
pub struct DeviceReport {
    pub drives:     Vec<PhysicalDrive>,
    pub enclosures: Vec<Enclosure>,
}

/// Split a full device report at `Channel #N:` and `Device #N` headers and
/// classify each block as a drive or an enclosure.
pub fn parse_device_report(controller: u32, text: &str, width: usize) -> DeviceReport {
    let mut report = DeviceReport::default();

    for block in device_blocks(text) {
        let Some(address) = block
            .iter()
            .filter(|l| l.contains("Channel,Device"))
            .find_map(|l| parse_attribute(l))
            .and_then(|attr| attr.value.as_str().and_then(DeviceAddress::from_reported))
        else {
            warn!(first = block.first().copied().unwrap_or(""), "device block without channel/device");
            continue;
        };
        let body = block.join("\n");

        if body.contains(HARD_DRIVE_MARKER) {
            let mut drive = PhysicalDrive::new(controller, address);
            drive.update_from(&body, width);
            report.drives.push(drive);
        } else {
            let mut enclosure = Enclosure::new(controller, address);
            enclosure.update_from(&body, width);
            report.enclosures.push(enclosure);
        }
    }
    report
}

fn device_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if CHANNEL_HEADER.is_match(line) || DEVICE_HEADER.is_match(line) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        let line = line.trim();
        if !line.is_empty() {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}
