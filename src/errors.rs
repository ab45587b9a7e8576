// src/errors.rs

use thiserror::Error;

/// Fatal errors surfaced through the public search interface.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("unknown ROM profile: {version}/{region}")]
    UnknownRomProfile { version: String, region: String },

    #[error("invalid search conditions: {0}")]
    InvalidSearchConditions(String),

    #[error("target set holds {0} unique seeds (limit is 10000)")]
    TargetSetTooLarge(usize),

    #[error("target set is empty")]
    TargetSetEmpty,

    #[error("worker {worker_id} failed to initialize: {reason}")]
    WorkerInitFailure { worker_id: usize, reason: String },

    #[error("a search is already running")]
    SearchAlreadyRunning,

    #[error("no search is running")]
    NotRunning,

    #[error("cannot reconfigure the engine while a search is in progress")]
    SearchInProgress,
}

/// Per-tick assembly failures. These skip the tick, never the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("year {0} is outside the console RTC window (2000-2099)")]
    YearOutOfRange(i32),

    #[error("{year:04}-{month:02}-{day:02} is not a valid calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("{hour:02}:{minute:02}:{second:02} is not a valid time of day")]
    InvalidTime { hour: u32, minute: u32, second: u32 },
}
