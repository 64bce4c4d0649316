// Project-wide constants
//
// Centralised here so service defaults and UI timings have one source of
// truth. Import via `use crate::config::constants::*;`.

/// Default base URL of the review generation service.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default per-request timeout for service calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts for transient service failures.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// How long a section shows as "copied" after a successful clipboard write.
pub const DEFAULT_COPY_INDICATOR_MS: u64 = 2000;

/// Minimum trimmed length of a case description.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Maximum number of capabilities a review can be scoped to.
pub const MAX_SELECTED_CAPABILITIES: usize = 3;

/// Directory (under the home directory) holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = ".portfolio-review";

/// Environment variable overriding the service base URL.
pub const ENV_API_URL: &str = "PORTFOLIO_REVIEW_API_URL";

/// Environment variable overriding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "PORTFOLIO_REVIEW_TIMEOUT_SECS";
