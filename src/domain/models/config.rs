//! Configuration tree for the supervisor.
//!
//! Every keyword family the classifier, turn manager, and validator consume
//! is an explicit table here, loaded once at construction, rather than a
//! literal scattered through the decision code.

use serde::{Deserialize, Serialize};

/// Main configuration structure for Vigil.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Timing knobs: polling cadence, cooldown, stuck thresholds.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Bounded-collection capacities and similarity thresholds.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Keyword tables for classification, turn detection, and validation.
    #[serde(default)]
    pub markers: MarkerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Status journal configuration.
    #[serde(default)]
    pub journal: JournalConfig,

    /// Screen capture collaborator configuration.
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Instruction generator collaborator configuration.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Action executor collaborator configuration.
    #[serde(default)]
    pub executor: ExecutorConfig,
}

/// Timing configuration. All values are seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimingConfig {
    /// Polling tick interval.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Minimum spacing between two non-forced dispatches.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Stable duration after which unchanged content counts as stuck.
    #[serde(default = "default_stuck_threshold_secs")]
    pub stuck_threshold_secs: u64,

    /// Stuck threshold while a busy marker is present.
    #[serde(default = "default_busy_stuck_threshold_secs")]
    pub busy_stuck_threshold_secs: u64,

    /// Hard ceiling on suppression before a forced-progress dispatch.
    #[serde(default = "default_max_stuck_secs")]
    pub max_stuck_secs: u64,

    /// Window under which repeated near-identical content feeds the backoff
    /// counter instead of escalating.
    #[serde(default = "default_repeat_window_secs")]
    pub repeat_window_secs: u64,

    /// How long the loop pauses once the backoff counter trips.
    #[serde(default = "default_backoff_pause_secs")]
    pub backoff_pause_secs: u64,

    /// A run of repeats older than this is forgotten.
    #[serde(default = "default_backoff_reset_secs")]
    pub backoff_reset_secs: u64,
}

const fn default_poll_interval_secs() -> u64 {
    20
}

const fn default_cooldown_secs() -> u64 {
    8
}

const fn default_stuck_threshold_secs() -> u64 {
    30
}

const fn default_busy_stuck_threshold_secs() -> u64 {
    60
}

const fn default_max_stuck_secs() -> u64 {
    120
}

const fn default_repeat_window_secs() -> u64 {
    60
}

const fn default_backoff_pause_secs() -> u64 {
    30
}

const fn default_backoff_reset_secs() -> u64 {
    600
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            cooldown_secs: default_cooldown_secs(),
            stuck_threshold_secs: default_stuck_threshold_secs(),
            busy_stuck_threshold_secs: default_busy_stuck_threshold_secs(),
            max_stuck_secs: default_max_stuck_secs(),
            repeat_window_secs: default_repeat_window_secs(),
            backoff_pause_secs: default_backoff_pause_secs(),
            backoff_reset_secs: default_backoff_reset_secs(),
        }
    }
}

/// Capacities and thresholds for the bounded state the supervisor keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LimitsConfig {
    /// Minimum significant length for a snapshot to be valid.
    #[serde(default = "default_min_snapshot_chars")]
    pub min_snapshot_chars: usize,

    /// How many times the same raw content may trigger processing.
    #[serde(default = "default_max_same_content")]
    pub max_same_content: u32,

    /// Length growth treated as active generation when a busy marker is
    /// present.
    #[serde(default = "default_growth_margin_chars")]
    pub growth_margin_chars: usize,

    /// Minimum instruction length before echo detection applies.
    #[serde(default = "default_echo_min_chars")]
    pub echo_min_chars: usize,

    /// Positional similarity above which a snapshot is a near-exact match.
    #[serde(default = "default_near_exact_similarity")]
    pub near_exact_similarity: f64,

    /// Normalized similarity above which content is substantially the same.
    #[serde(default = "default_substantial_similarity")]
    pub substantial_similarity: f64,

    /// Minimum normalized length before containment counts as sameness.
    #[serde(default = "default_containment_min_chars")]
    pub containment_min_chars: usize,

    /// Dialog history capacity and post-trim size.
    #[serde(default = "default_dialog_history_cap")]
    pub dialog_history_cap: usize,
    #[serde(default = "default_dialog_history_trim")]
    pub dialog_history_trim: usize,

    /// Conversation turn history capacity and post-trim size.
    #[serde(default = "default_turn_history_cap")]
    pub turn_history_cap: usize,
    #[serde(default = "default_turn_history_trim")]
    pub turn_history_trim: usize,

    /// Repetition counter capacity and post-trim size.
    #[serde(default = "default_repetition_cap")]
    pub repetition_cap: usize,
    #[serde(default = "default_repetition_trim")]
    pub repetition_trim: usize,

    /// Processed-fingerprint set capacity (trimmed by half on overflow).
    #[serde(default = "default_processed_cap")]
    pub processed_cap: usize,

    /// Consecutive near-identical repeats before the loop pauses.
    #[serde(default = "default_backoff_max_repeats")]
    pub backoff_max_repeats: u32,
}

const fn default_min_snapshot_chars() -> usize {
    10
}

const fn default_max_same_content() -> u32 {
    3
}

const fn default_growth_margin_chars() -> usize {
    50
}

const fn default_echo_min_chars() -> usize {
    20
}

const fn default_near_exact_similarity() -> f64 {
    0.99
}

const fn default_substantial_similarity() -> f64 {
    0.9
}

const fn default_containment_min_chars() -> usize {
    50
}

const fn default_dialog_history_cap() -> usize {
    20
}

const fn default_dialog_history_trim() -> usize {
    15
}

const fn default_turn_history_cap() -> usize {
    10
}

const fn default_turn_history_trim() -> usize {
    7
}

const fn default_repetition_cap() -> usize {
    100
}

const fn default_repetition_trim() -> usize {
    50
}

const fn default_processed_cap() -> usize {
    50
}

const fn default_backoff_max_repeats() -> u32 {
    5
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_snapshot_chars: default_min_snapshot_chars(),
            max_same_content: default_max_same_content(),
            growth_margin_chars: default_growth_margin_chars(),
            echo_min_chars: default_echo_min_chars(),
            near_exact_similarity: default_near_exact_similarity(),
            substantial_similarity: default_substantial_similarity(),
            containment_min_chars: default_containment_min_chars(),
            dialog_history_cap: default_dialog_history_cap(),
            dialog_history_trim: default_dialog_history_trim(),
            turn_history_cap: default_turn_history_cap(),
            turn_history_trim: default_turn_history_trim(),
            repetition_cap: default_repetition_cap(),
            repetition_trim: default_repetition_trim(),
            processed_cap: default_processed_cap(),
            backoff_max_repeats: default_backoff_max_repeats(),
        }
    }
}

/// Keyword tables. All matching is done on lowercased text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MarkerConfig {
    /// Generation/in-progress markers.
    #[serde(default = "default_busy_markers")]
    pub busy: Vec<String>,

    /// Active-work terms that, combined with significant growth, read as
    /// busy.
    #[serde(default = "default_active_work_markers")]
    pub active_work: Vec<String>,

    /// "Ready for review" family markers. Highest-priority completion signal.
    #[serde(default = "default_review_markers")]
    pub review: Vec<String>,

    /// Explicit completion phrases.
    #[serde(default = "default_completion_markers")]
    pub completion: Vec<String>,

    /// Question-style prompts asking the observer what to do next.
    #[serde(default = "default_question_markers")]
    pub question: Vec<String>,

    /// Request-style wording that opens a new conversation turn.
    #[serde(default = "default_request_markers")]
    pub request: Vec<String>,

    /// Capture-noise tokens a degraded OCR pass emits.
    #[serde(default = "default_invalid_markers")]
    pub invalid: Vec<String>,
}

fn default_busy_markers() -> Vec<String> {
    [
        "generating",
        "working on",
        "fixing",
        "analyzing",
        "processing",
        "loading",
        "thinking",
        "please wait",
    ]
    .map(String::from)
    .to_vec()
}

fn default_active_work_markers() -> Vec<String> {
    ["generating", "processing", "creating", "analyzing", "writing"]
        .map(String::from)
        .to_vec()
}

fn default_review_markers() -> Vec<String> {
    [
        "review changes",
        "review the changes",
        "code review",
        "ready for review",
        "changes ready",
        "review code",
        "implementation complete",
    ]
    .map(String::from)
    .to_vec()
}

fn default_completion_markers() -> Vec<String> {
    [
        "done",
        "finished",
        "completed",
        "completed successfully",
        "success",
        "build successful",
        "tests passing",
        "execution finished",
        "ready",
    ]
    .map(String::from)
    .to_vec()
}

fn default_question_markers() -> Vec<String> {
    [
        "what would you like",
        "would you like",
        "do you want",
        "should i",
        "shall i",
        "let me know",
        "next step",
        "anything else",
        "what's next",
    ]
    .map(String::from)
    .to_vec()
}

fn default_request_markers() -> Vec<String> {
    [
        "please", "help me", "implement", "fix", "optimize", "add", "create", "refactor", "build",
    ]
    .map(String::from)
    .to_vec()
}

fn default_invalid_markers() -> Vec<String> {
    [
        "dark_content",
        "detected_features:",
        "high_brightness_content",
        "text_like_patterns",
        "stable_content",
        "unknown_content",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            busy: default_busy_markers(),
            active_work: default_active_work_markers(),
            review: default_review_markers(),
            completion: default_completion_markers(),
            question: default_question_markers(),
            request: default_request_markers(),
            invalid: default_invalid_markers(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty.
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for the rolling supervisor log file. Stderr only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Status journal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JournalConfig {
    /// Path of the append-only status journal.
    #[serde(default = "default_journal_path")]
    pub path: String,

    /// Prune once the entry count exceeds this.
    #[serde(default = "default_journal_max_entries")]
    pub max_entries: usize,

    /// Entries kept after a prune.
    #[serde(default = "default_journal_trim_to")]
    pub trim_to: usize,
}

fn default_journal_path() -> String {
    ".vigil/status.log".to_string()
}

const fn default_journal_max_entries() -> usize {
    100
}

const fn default_journal_trim_to() -> usize {
    80
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: default_journal_path(),
            max_entries: default_journal_max_entries(),
            trim_to: default_journal_trim_to(),
        }
    }
}

/// Screen capture collaborator configuration.
///
/// The capture command is expected to print the OCR text of the requested
/// region on stdout. `{x}`, `{y}`, `{width}`, and `{height}` placeholders in
/// the arguments are substituted with the region before each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CaptureConfig {
    /// Capture command executable.
    #[serde(default = "default_capture_command")]
    pub command: String,

    /// Arguments, with region placeholders.
    #[serde(default = "default_capture_args")]
    pub args: Vec<String>,

    /// Per-capture timeout.
    #[serde(default = "default_capture_timeout_secs")]
    pub timeout_secs: u64,

    /// Region configuration file, consumed once at start-up.
    #[serde(default = "default_region_file")]
    pub region_file: String,
}

fn default_capture_command() -> String {
    "vigil-capture".to_string()
}

fn default_capture_args() -> Vec<String> {
    ["--region", "{x},{y},{width},{height}"]
        .map(String::from)
        .to_vec()
}

const fn default_capture_timeout_secs() -> u64 {
    15
}

fn default_region_file() -> String {
    ".vigil/regions.json".to_string()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            command: default_capture_command(),
            args: default_capture_args(),
            timeout_secs: default_capture_timeout_secs(),
            region_file: default_region_file(),
        }
    }
}

/// Instruction generator collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GeneratorConfig {
    /// API key (can also be set via ANTHROPIC_API_KEY env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model to use.
    #[serde(default = "default_generator_model")]
    pub model: String,

    /// Base URL for the API (for testing/proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_generator_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tokens to generate.
    #[serde(default = "default_generator_max_tokens")]
    pub max_tokens: u32,

    /// Instruction sent when the generator errors or returns near-empty
    /// output.
    #[serde(default = "default_fallback_instruction")]
    pub fallback_instruction: String,
}

fn default_generator_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

const fn default_generator_timeout_secs() -> u64 {
    60
}

const fn default_generator_max_tokens() -> u32 {
    1024
}

fn default_fallback_instruction() -> String {
    "I reviewed your latest output. Please continue with the next step of the current task, \
     and tell me if anything is blocking you."
        .to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_generator_model(),
            base_url: None,
            timeout_secs: default_generator_timeout_secs(),
            max_tokens: default_generator_max_tokens(),
            fallback_instruction: default_fallback_instruction(),
        }
    }
}

/// Action executor collaborator configuration.
///
/// The executor command receives the instruction text on stdin and is
/// expected to type it into the monitored session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExecutorConfig {
    /// Executor command executable.
    #[serde(default = "default_executor_command")]
    pub command: String,

    /// Command arguments.
    #[serde(default)]
    pub args: Vec<String>,

    /// Per-dispatch timeout.
    #[serde(default = "default_executor_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_executor_command() -> String {
    "vigil-type".to_string()
}

const fn default_executor_timeout_secs() -> u64 {
    30
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            command: default_executor_command(),
            args: Vec::new(),
            timeout_secs: default_executor_timeout_secs(),
        }
    }
}
