use crate::models::fields::FieldSet;
use serde::Serialize;

/// A background operation reported by `GETSTATUS` (build, verify, rebuild…).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Task {
    pub fields: FieldSet,
}

impl Task {
    /// Build from one status paragraph; its first line is the task kind
    /// header (`Logical Device Task:`) and is skipped.
    pub fn from_block(block: &str) -> Self {
        let mut fields = FieldSet::new();
        for line in block.lines().skip(1).filter(|l| !l.trim().is_empty()) {
            fields.absorb_line(line);
        }
        Self { fields }
    }

    pub fn operation(&self) -> &str { self.fields.text("current_operation") }
    pub fn status(&self) -> &str { self.fields.text("status") }
    pub fn percent_complete(&self) -> &str { self.fields.text("percentage_complete") }
}
