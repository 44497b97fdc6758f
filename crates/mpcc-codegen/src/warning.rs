//! Non-fatal diagnostics (spec.md §7: "warnings never abort compilation"),
//! grounded on the two `print("WARNING...")` call sites in
//! `ASTmanipulations.py`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Warning {
    #[error("WARNING in line {line}: Leaking in secret branch may leak value of branch-condition.")]
    LeakInSecretBranch { line: u32 },

    #[error("WARNING: Outputting variable '{name}' with constant value {value}")]
    ConstantOutput { name: String, value: String },
}
