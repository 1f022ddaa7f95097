// Prompt Builder - fixed instruction template around the full ledger
//
// Pure functions only: no I/O, deterministic for identical inputs.

use crate::ledger::Ledger;

/// System-role persona sent with every completion request
pub const SYSTEM_PERSONA: &str = "You are a helpful bank statement analyst.";

/// Formatting directive the answer must follow
pub const FORMAT_DIRECTIVE: &str = "Important: When displaying monetary amounts, \
always format them to exactly 2 decimal places (e.g., $123.45, not $123.4567890123).";

/// Build the user-role prompt: role preamble, the serialized ledger, the
/// verbatim question (quoted), and the two-decimal formatting directive.
///
/// The ledger is embedded whole - there is no truncation, so prompt size
/// grows with the statement. Known limitation, kept on purpose.
pub fn build_prompt(ledger: &Ledger, question: &str) -> String {
    format!(
        "You are a financial assistant helping users understand their bank transactions.\n\
         Below is their transaction history:\n\
         \n\
         {csv}\n\
         Now answer this question based on the data:\n\
         \"{question}\"\n\
         \n\
         {directive}\n",
        csv = ledger.to_csv_string(),
        question = question,
        directive = FORMAT_DIRECTIVE,
    )
}
