use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Result codes documented for arcconf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success,
    /// The requested command failed.
    Failure,
    /// Parameters failed validation; not a program error.
    Abort,
    InvalidArguments,
    /// No controller with the given id.
    InvalidCardNum,
    Other(i32),
}

impl ResultCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ResultCode::Success,
            1 => ResultCode::Failure,
            2 => ResultCode::Abort,
            3 => ResultCode::InvalidArguments,
            6 => ResultCode::InvalidCardNum,
            n => ResultCode::Other(n),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ResultCode::Success          => 0,
            ResultCode::Failure          => 1,
            ResultCode::Abort            => 2,
            ResultCode::InvalidArguments => 3,
            ResultCode::InvalidCardNum   => 6,
            ResultCode::Other(n)         => n,
        }
    }

    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }

    /// Documented codes a state-changing command may legitimately return.
    pub fn is_rejection(self) -> bool {
        matches!(
            self,
            ResultCode::Failure | ResultCode::Abort | ResultCode::InvalidArguments | ResultCode::InvalidCardNum
        )
    }
}

/// Raw stdout and result code of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub text: String,
    pub code: ResultCode,
}

impl CommandOutput {
    pub fn new(text: impl Into<String>, code: i32) -> Self {
        Self { text: text.into(), code: ResultCode::from_code(code) }
    }
}

/// Runs the vendor utility. `args` excludes the binary itself.
pub trait CommandExecutor {
    fn execute(&self, args: &[String]) -> Result<CommandOutput>;
}

/// Executes a real binary found on `PATH` or given by path.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    binary: PathBuf,
}

impl ProcessExecutor {
    /// Resolve `binary` (a name or a path) to an executable.
    pub fn locate(binary: &str) -> Result<Self> {
        let path = which::which(binary).map_err(|_| Error::BinaryNotFound(binary.to_string()))?;
        Ok(Self { binary: path })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(&self, args: &[String]) -> Result<CommandOutput> {
        let out = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| Error::Spawn {
                command: format!("{} {}", self.binary.display(), args.join(" ")),
                source,
            })?;

        // A signal-terminated process has no code; treat it like an undocumented one.
        let code = out.status.code().unwrap_or(-1);
        debug!(binary = %self.binary.display(), ?args, code, "arcconf finished");
        Ok(CommandOutput::new(String::from_utf8_lossy(&out.stdout), code))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_documented_codes() {
        assert_eq!(ResultCode::from_code(0), ResultCode::Success);
        assert_eq!(ResultCode::from_code(2), ResultCode::Abort);
        assert_eq!(ResultCode::from_code(6), ResultCode::InvalidCardNum);
        assert_eq!(ResultCode::from_code(9), ResultCode::Other(9));
        assert_eq!(ResultCode::Other(9).code(), 9);
    }

    #[test]
    fn classifies_rejections() {
        assert!(ResultCode::Abort.is_rejection());
        assert!(ResultCode::InvalidArguments.is_rejection());
        assert!(!ResultCode::Success.is_rejection());
        assert!(!ResultCode::Other(42).is_rejection());
    }

    #[test]
    fn missing_binary_is_reported() {
        let err = ProcessExecutor::locate("definitely-not-an-arcconf-binary").unwrap_err();
        assert!(matches!(err, Error::BinaryNotFound(_)));
    }
}
