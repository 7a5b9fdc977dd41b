//! Predefined error codes usable in `ErrorEquals` lists.

/// Matches any error. Must be the only code in its list, and the
/// retrier or catcher holding it must be the last one declared.
pub const ALL: &str = "States.ALL";

/// A task ran longer than its `TimeoutSeconds` or missed a heartbeat.
pub const TIMEOUT: &str = "States.Timeout";

/// A task failed during execution.
pub const TASK_FAILED: &str = "States.TaskFailed";

/// A task had insufficient privileges to run.
pub const PERMISSIONS: &str = "States.Permissions";

/// A `ResultPath` could not be applied to the state's input.
pub const RESULT_PATH_MATCH_FAILURE: &str = "States.ResultPathMatchFailure";

/// A branch of a parallel state failed.
pub const BRANCH_FAILED: &str = "States.BranchFailed";

/// A choice state found no matching rule and has no default.
pub const NO_CHOICE_MATCHED: &str = "States.NoChoiceMatched";

/// Returns true if `code` is the match-all sentinel.
pub fn is_match_all(code: &str) -> bool {
    code == ALL
}
