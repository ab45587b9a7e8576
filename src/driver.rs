// src/driver.rs
//
// One worker: walks its datetime chunk second by second (datetime outermost,
// Timer0 middle, VCount innermost), batches assembled messages into the
// lane-parallel SHA-1 core, and streams matches and progress back to the
// coordinator over the shared channel. The control word is inspected between
// batches, so a pause or stop becomes visible well inside the 200 ms
// reporting interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::data_types::{
    InitialSeedResult, ProgressSnapshot, ResultConditions, SearchConditions, WorkerChunk,
    WorkerStatus,
};
use crate::datetime_codes::{self, DAYS_IN_WINDOW, EPOCH_2000_UNIX, SECONDS_PER_DAY};
use crate::message::MessageTemplate;
use crate::rom_profiles::RomProfile;
use crate::seed::BATCH_WIDTH;
use crate::sha1;
use crate::target_set::TargetSeedSet;

const REPORT_INTERVAL: Duration = Duration::from_millis(200);
const PAUSE_POLL: Duration = Duration::from_millis(10);

const RUN: u8 = 0;
const PAUSE: u8 = 1;
const STOP: u8 = 2;

/// The one word of shared mutable state: the coordinator writes, every
/// worker polls at its checkpoints.
pub(crate) struct ControlToken {
    state: AtomicU8,
}

impl ControlToken {
    pub fn new() -> Self {
        ControlToken {
            state: AtomicU8::new(RUN),
        }
    }

    pub fn resume(&self) {
        self.state.store(RUN, Ordering::SeqCst);
    }

    pub fn pause(&self) {
        self.state.store(PAUSE, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.state.store(STOP, Ordering::SeqCst);
    }

    fn load(&self) -> u8 {
        self.state.load(Ordering::Relaxed)
    }
}

/// Everything that flows to the coordinator over the search channel: worker
/// traffic plus the caller's control notifications.
pub(crate) enum SearchEvent {
    Progress(ProgressSnapshot),
    Match(Box<InitialSeedResult>),
    WorkerFailed { worker_id: usize, reason: String },
    WorkerFinished { worker_id: usize, status: WorkerStatus },
    Paused,
    Resumed,
    StopRequested,
}

pub(crate) struct WorkerContext {
    pub worker_id: usize,
    pub profile: &'static RomProfile,
    pub conditions: Arc<SearchConditions>,
    pub chunk: WorkerChunk,
    pub targets: Arc<TargetSeedSet>,
    pub control: Arc<ControlToken>,
}

enum Flow {
    Continue,
    Stop,
}

struct WorkerRun {
    template: MessageTemplate,
    result_conditions: ResultConditions,
    targets: Arc<TargetSeedSet>,
    control: Arc<ControlToken>,
    events: Sender<SearchEvent>,
    buf: Vec<u32>,
    meta: Vec<(u16, u8)>,
    progress: ProgressSnapshot,
    started: Instant,
    last_report: Instant,
}

impl WorkerRun {
    fn push(&mut self, timer0: u16, vcount: u8, date_code: u32, time_code: u32) -> Flow {
        self.buf
            .extend_from_slice(&self.template.fill(timer0, vcount, date_code, time_code));
        self.meta.push((timer0, vcount));
        if self.meta.len() == BATCH_WIDTH {
            if !self.flush() {
                return Flow::Stop;
            }
            return self.checkpoint();
        }
        Flow::Continue
    }

    /// Hash the pending batch and stream out any matches. Returns false when
    /// the coordinator is gone.
    fn flush(&mut self) -> bool {
        if self.meta.is_empty() {
            return true;
        }
        let digests = sha1::compress_batch(&self.buf);
        for (i, (digest, &(timer0, vcount))) in digests.iter().zip(self.meta.iter()).enumerate() {
            self.progress.current_step += 1;
            let seed = digest[0];
            if self.targets.contains(seed) {
                self.progress.matches_found += 1;
                let mut message = [0u32; 16];
                message.copy_from_slice(&self.buf[i * 16..i * 16 + 16]);
                let result = InitialSeedResult {
                    seed,
                    datetime: self.progress.current_datetime,
                    timer0,
                    vcount,
                    conditions: self.result_conditions.clone(),
                    message,
                    sha1_hash: sha1::digest_hex(digest),
                    is_match: true,
                };
                if self.events.send(SearchEvent::Match(Box::new(result))).is_err() {
                    return false;
                }
            }
        }
        self.buf.clear();
        self.meta.clear();
        true
    }

    fn report(&mut self, status: WorkerStatus) {
        self.progress.status = status;
        self.progress.elapsed_millis = self.started.elapsed().as_millis() as u64;
        let step = self.progress.current_step;
        self.progress.estimated_remaining_millis = if step > 0 && self.progress.total_steps > step
        {
            self.progress.elapsed_millis * (self.progress.total_steps - step) / step
        } else {
            0
        };
        let _ = self.events.send(SearchEvent::Progress(self.progress.clone()));
        self.last_report = Instant::now();
    }

    fn checkpoint(&mut self) -> Flow {
        match self.control.load() {
            STOP => Flow::Stop,
            PAUSE => {
                self.report(WorkerStatus::Paused);
                loop {
                    thread::sleep(PAUSE_POLL);
                    match self.control.load() {
                        STOP => return Flow::Stop,
                        PAUSE => {}
                        _ => break,
                    }
                }
                self.report(WorkerStatus::Running);
                Flow::Continue
            }
            _ => {
                if self.last_report.elapsed() >= REPORT_INTERVAL {
                    self.report(WorkerStatus::Running);
                }
                Flow::Continue
            }
        }
    }
}

pub(crate) fn run_worker(ctx: WorkerContext, events: Sender<SearchEvent>) {
    let WorkerContext {
        worker_id,
        profile,
        conditions,
        chunk,
        targets,
        control,
    } = ctx;

    let start_ts = chunk.start.and_utc().timestamp();
    let chunk_seconds = chunk.seconds();
    let hardware = conditions.hardware;
    let per_second_triples = conditions.timer0_count() * conditions.vcount_count();

    let mut run = WorkerRun {
        template: MessageTemplate::new(profile, conditions.mac, conditions.key_input, conditions.frame),
        result_conditions: ResultConditions {
            version: conditions.version,
            region: conditions.region,
            hardware,
            mac: conditions.mac,
            key_input: conditions.key_input,
            frame: conditions.frame,
        },
        targets,
        control,
        events,
        buf: Vec::with_capacity(BATCH_WIDTH * 16),
        meta: Vec::with_capacity(BATCH_WIDTH),
        progress: ProgressSnapshot {
            worker_id,
            current_step: 0,
            total_steps: chunk.estimated_ops,
            elapsed_millis: 0,
            estimated_remaining_millis: 0,
            matches_found: 0,
            skipped_ticks: 0,
            current_datetime: chunk.start,
            status: WorkerStatus::Init,
        },
        started: Instant::now(),
        last_report: Instant::now(),
    };

    run.report(WorkerStatus::Init);

    let first_second = start_ts - EPOCH_2000_UNIX;
    if first_second < 0 || first_second / SECONDS_PER_DAY >= DAYS_IN_WINDOW as i64 {
        let reason = format!("chunk start {} is outside the RTC window", chunk.start);
        let _ = run.events.send(SearchEvent::WorkerFailed {
            worker_id,
            reason,
        });
        run.report(WorkerStatus::Error);
        let _ = run.events.send(SearchEvent::WorkerFinished {
            worker_id,
            status: WorkerStatus::Error,
        });
        return;
    }

    run.report(WorkerStatus::Running);
    info!(
        worker_id,
        start = %chunk.start,
        end = %chunk.end,
        steps = chunk.estimated_ops,
        "worker started"
    );

    let mut outcome = WorkerStatus::Completed;
    'seconds: for offset in 0..chunk_seconds {
        run.progress.current_datetime = chunk.start + chrono::Duration::seconds(offset as i64);

        let Some((date_code, time_code)) =
            datetime_codes::codes_at(first_second + offset as i64, hardware)
        else {
            run.progress.current_step += per_second_triples;
            run.progress.skipped_ticks += per_second_triples;
            debug!(worker_id, datetime = %run.progress.current_datetime, "tick skipped");
            continue;
        };

        for timer0 in chunk.timer0_min..=chunk.timer0_max {
            if conditions.auto_vcount {
                let vcount = profile.effective_vcount(timer0);
                if let Flow::Stop = run.push(timer0, vcount, date_code, time_code) {
                    outcome = WorkerStatus::Stopped;
                    break 'seconds;
                }
            } else {
                for vcount in chunk.vcount_min..=chunk.vcount_max {
                    if let Flow::Stop = run.push(timer0, vcount, date_code, time_code) {
                        outcome = WorkerStatus::Stopped;
                        break 'seconds;
                    }
                }
            }
        }

        // drain the partial batch so current_datetime stays truthful
        if !run.flush() {
            outcome = WorkerStatus::Stopped;
            break;
        }
        if let Flow::Stop = run.checkpoint() {
            outcome = WorkerStatus::Stopped;
            break;
        }
    }

    if let WorkerStatus::Completed = outcome {
        if !run.flush() {
            outcome = WorkerStatus::Stopped;
        }
    }

    run.report(outcome);
    info!(
        worker_id,
        status = ?outcome,
        steps = run.progress.current_step,
        matches = run.progress.matches_found,
        "worker finished"
    );
    let _ = run.events.send(SearchEvent::WorkerFinished {
        worker_id,
        status: outcome,
    });
}
