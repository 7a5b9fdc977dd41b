//! Field names used in diagnostics.

pub const START_AT: &str = "StartAt";
pub const STATES: &str = "States";
pub const STATE_NAME: &str = "StateName";
pub const TIMEOUT_SECONDS: &str = "TimeoutSeconds";
pub const HEARTBEAT_SECONDS: &str = "HeartbeatSeconds";
pub const RESOURCE: &str = "Resource";
pub const TRANSITION: &str = "Transition";
pub const NEXT: &str = "Next";
pub const DEFAULT: &str = "Default";
pub const INPUT_PATH: &str = "InputPath";
pub const OUTPUT_PATH: &str = "OutputPath";
pub const RESULT_PATH: &str = "ResultPath";
pub const ERROR_EQUALS: &str = "ErrorEquals";
pub const INTERVAL_SECONDS: &str = "IntervalSeconds";
pub const MAX_ATTEMPTS: &str = "MaxAttempts";
pub const BACKOFF_RATE: &str = "BackoffRate";
pub const WAIT_FOR: &str = "WaitFor";
pub const SECONDS: &str = "Seconds";
pub const SECONDS_PATH: &str = "SecondsPath";
pub const TIMESTAMP: &str = "Timestamp";
pub const TIMESTAMP_PATH: &str = "TimestampPath";
pub const CAUSE: &str = "Cause";
pub const CONDITION: &str = "Condition";
pub const CONDITIONS: &str = "Conditions";
pub const VARIABLE: &str = "Variable";
pub const EXPECTED_VALUE: &str = "ExpectedValue";
