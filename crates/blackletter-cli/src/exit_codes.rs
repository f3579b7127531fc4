//! Process exit codes. Part of the public contract for CI and batch callers.

pub const SUCCESS: i32 = 0;
pub const MISSING_INPUT: i32 = 1; // Findings file absent; rerun the evaluation step first
pub const INTERNAL_ERROR: i32 = 2; // Filesystem, parse or config error
pub const RULE_CHECK_FAILED: i32 = 3; // `rules check` errors or manifest drift
pub const UNMATCHED_RULES: i32 = 4; // `stamp --strict` saw unknown rule ids (outputs still written)
