use crate::collectors::executor::{CommandExecutor, CommandOutput, ProcessExecutor};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::controller::Controller;
use crate::parser::text::{cut_lines, paragraphs, sanitize_stdout, SECTION_WIDTH};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Per-controller version strings from `GETVERSION`, keyed by controller id.
pub type VersionTable = IndexMap<String, IndexMap<String, String>>;

/// Thin client over an executor that knows arcconf's command conventions:
/// `<VERB> <CONTROLLER_ID> [<OBJECT_TYPE> <KEY…>] [<extra>]`.
pub struct Arcconf {
    executor:      Box<dyn CommandExecutor>,
    terminator:    String,
    section_width: usize,
}

impl Arcconf {
    pub fn new(executor: impl CommandExecutor + 'static) -> Self {
        Self {
            executor:      Box::new(executor),
            terminator:    "Command ".to_string(),
            section_width: SECTION_WIDTH,
        }
    }

    /// Locate the configured binary and apply the parser settings.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let executor = ProcessExecutor::locate(&cfg.executor.binary)?;
        Ok(Self::new(executor)
            .with_terminator(&cfg.executor.terminator)
            .with_section_width(cfg.parser.section_width))
    }

    pub fn with_terminator(mut self, terminator: &str) -> Self {
        self.terminator = terminator.to_string();
        self
    }

    pub fn with_section_width(mut self, width: usize) -> Self {
        self.section_width = width.max(1);
        self
    }

    pub fn section_width(&self) -> usize {
        self.section_width
    }

    /// Run `cmd` + `args`. Output is sanitized unless a token redirects it.
    pub fn execute(&self, cmd: &[&str], args: &[String]) -> Result<CommandOutput> {
        let tokens: Vec<String> = cmd.iter().map(|c| c.to_string()).chain(args.iter().cloned()).collect();
        let out = self.executor.execute(&tokens)?;
        debug!(command = %tokens.join(" "), code = out.code.code(), "executed");

        if tokens.iter().any(|t| t.contains('>')) {
            return Ok(out);
        }
        Ok(CommandOutput { text: sanitize_stdout(&out.text, Some(&self.terminator)), code: out.code })
    }

    /// Run a controller-scoped command.
    pub fn run(&self, verb: &str, controller: u32, args: &[String]) -> Result<CommandOutput> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(controller.to_string());
        full.extend_from_slice(args);
        self.execute(&[verb], &full)
    }

    /// Run a read-only command; anything but SUCCESS is an error.
    pub fn query(&self, verb: &str, controller: u32, args: &[String]) -> Result<String> {
        let out = self.run(verb, controller, args)?;
        if !out.code.is_success() {
            return Err(Error::Query { command: command_line(verb, controller, args), code: out.code.code() });
        }
        Ok(out.text)
    }

    /// Run a state-changing command.
    ///
    /// `Ok(false)` for documented rejections (FAILURE, ABORT,
    /// INVALID_ARGUMENTS, INVALID_CARD_NUM); undocumented codes are errors.
    pub fn mutate(&self, verb: &str, controller: u32, args: &[String]) -> Result<bool> {
        let out = self.run(verb, controller, args)?;
        let command = command_line(verb, controller, args);
        if out.code.is_success() {
            info!(%command, "applied");
            return Ok(true);
        }
        if out.code.is_rejection() {
            warn!(%command, code = ?out.code, "rejected");
            return Ok(false);
        }
        Err(Error::UnexpectedCode { command, code: out.code.code() })
    }

    /// Ids of every controller reported by `LIST`.
    pub fn list(&self) -> Result<Vec<u32>> {
        let out = self.execute(&["LIST"], &[])?;
        if !out.code.is_success() {
            return Err(Error::Query { command: "LIST".to_string(), code: out.code.code() });
        }
        Ok(parse_list(&out.text))
    }

    /// Every controller, populated with its configuration.
    pub fn get_controllers(&self) -> Result<Vec<Controller>> {
        self.list()?
            .into_iter()
            .map(|id| {
                let mut controller = Controller::new(id);
                controller.update(self)?;
                Ok(controller)
            })
            .collect()
    }

    /// BIOS/firmware/driver versions of all controllers.
    pub fn get_version(&self) -> Result<VersionTable> {
        let out = self.execute(&["GETVERSION"], &[])?;
        if !out.code.is_success() {
            return Err(Error::Query { command: "GETVERSION".to_string(), code: out.code.code() });
        }
        Ok(parse_versions(&out.text))
    }
}

fn command_line(verb: &str, controller: u32, args: &[String]) -> String {
    let mut line = format!("{} {}", verb, controller);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// `   Controller 1:   : Optimal, Slot 1, …` rows after a 6 line banner.
fn parse_list(text: &str) -> Vec<u32> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    cut_lines(text, 6, 0)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|line| {
            let head = line.split(':').next().unwrap_or("");
            let id = head.split_whitespace().nth(1)?;
            match id.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(line = line.trim(), "unparsable controller row");
                    None
                }
            }
        })
        .collect()
}

/// `Controller #N`, one underline row, then `key : value` rows.
fn parse_versions(text: &str) -> VersionTable {
    let mut versions = VersionTable::new();
    for part in paragraphs(&cut_lines(text, 1, 0)) {
        let lines: Vec<&str> = part.lines().collect();
        let Some(id) = lines.first().and_then(|l| l.split('#').nth(1)) else {
            warn!(block = %part, "version block without controller number");
            continue;
        };
        let table = versions.entry(id.trim().to_string()).or_default();
        for line in lines.iter().skip(2) {
            if let Some((key, value)) = line.split_once(':') {
                table.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }
    versions
}
