// src/coordinator.rs
//
// Owns the worker pool for one search. A single mpsc channel multiplexes
// worker progress/matches and the caller's control notifications; the
// coordinator thread folds per-worker snapshots into an aggregated view and
// drives the caller's callbacks. All shared mutable state is the one atomic
// control word plus the state cell in the handle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};

use crate::chunker;
use crate::data_types::{
    AggregatedProgress, InitialSeedResult, ProgressSnapshot, SearchConditions,
};
use crate::driver::{self, ControlToken, SearchEvent, WorkerContext};
use crate::errors::SearchError;
use crate::rom_profiles;
use crate::target_set::TargetSeedSet;

/// Caller hooks. Every callback fires on the coordinator thread; anything
/// handed to `on_result` is owned by the caller afterwards.
#[derive(Default)]
pub struct SearchCallbacks {
    pub on_progress: Option<Box<dyn Fn(&ProgressSnapshot) + Send>>,
    pub on_aggregated_progress: Option<Box<dyn Fn(&AggregatedProgress) + Send>>,
    pub on_result: Option<Box<dyn Fn(InitialSeedResult) + Send>>,
    pub on_complete: Option<Box<dyn Fn(&AggregatedProgress) + Send>>,
    pub on_error: Option<Box<dyn Fn(&SearchError) + Send>>,
    pub on_paused: Option<Box<dyn Fn() + Send>>,
    pub on_resumed: Option<Box<dyn Fn() + Send>>,
    pub on_stopped: Option<Box<dyn Fn() + Send>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Running,
    Paused,
    Stopping,
    Completed,
    Stopped,
    Failed,
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchState::Completed | SearchState::Stopped | SearchState::Failed
        )
    }
}

fn lock_state(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Live handle to a running search.
pub struct SearchHandle {
    control: Arc<ControlToken>,
    state: Arc<Mutex<SearchState>>,
    events: Sender<SearchEvent>,
    coordinator: Option<JoinHandle<()>>,
}

impl SearchHandle {
    pub fn state(&self) -> SearchState {
        *lock_state(&self.state)
    }

    pub fn pause(&self) -> Result<(), SearchError> {
        let mut state = lock_state(&self.state);
        if *state != SearchState::Running {
            return Err(SearchError::NotRunning);
        }
        *state = SearchState::Paused;
        self.control.pause();
        let _ = self.events.send(SearchEvent::Paused);
        Ok(())
    }

    pub fn resume(&self) -> Result<(), SearchError> {
        let mut state = lock_state(&self.state);
        if *state != SearchState::Paused {
            return Err(SearchError::NotRunning);
        }
        *state = SearchState::Running;
        self.control.resume();
        let _ = self.events.send(SearchEvent::Resumed);
        Ok(())
    }

    pub fn stop(&self) -> Result<(), SearchError> {
        let mut state = lock_state(&self.state);
        match *state {
            SearchState::Running | SearchState::Paused => {
                *state = SearchState::Stopping;
                self.control.stop();
                let _ = self.events.send(SearchEvent::StopRequested);
                Ok(())
            }
            _ => Err(SearchError::NotRunning),
        }
    }

    /// Block until every worker has drained and the search is terminal.
    pub fn wait(mut self) -> SearchState {
        if let Some(handle) = self.coordinator.take() {
            let _ = handle.join();
        }
        self.state()
    }
}

/// Owns the parallelism knobs and the one-search-at-a-time guard.
pub struct SearchEngine {
    parallelism: usize,
    parallel_mode: bool,
    active: Arc<AtomicBool>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        SearchEngine::new()
    }
}

impl SearchEngine {
    pub fn new() -> Self {
        SearchEngine {
            parallelism: num_cpus::get().max(1),
            parallel_mode: true,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_parallelism(&mut self, workers: usize) -> Result<(), SearchError> {
        if self.active.load(Ordering::SeqCst) {
            return Err(SearchError::SearchInProgress);
        }
        self.parallelism = workers.max(1);
        Ok(())
    }

    pub fn set_parallel_mode(&mut self, enabled: bool) -> Result<(), SearchError> {
        if self.active.load(Ordering::SeqCst) {
            return Err(SearchError::SearchInProgress);
        }
        self.parallel_mode = enabled;
        Ok(())
    }

    /// Worker count the next search will use.
    pub fn effective_parallelism(&self) -> usize {
        if self.parallel_mode { self.parallelism } else { 1 }
    }

    /// Validate, build the shared read-only state, fan the chunks out to
    /// worker threads and hand back the live handle. Validation failures are
    /// synchronous; everything later arrives through the callbacks.
    pub fn start_search(
        &self,
        conditions: SearchConditions,
        target_seeds: &[u32],
        callbacks: SearchCallbacks,
    ) -> Result<SearchHandle, SearchError> {
        conditions.validate()?;
        let profile = rom_profiles::profile(conditions.version, conditions.region)?;
        let targets = Arc::new(TargetSeedSet::new(target_seeds)?);

        if self.active.swap(true, Ordering::SeqCst) {
            return Err(SearchError::SearchAlreadyRunning);
        }

        let chunks = chunker::split(&conditions, self.effective_parallelism());
        let worker_count = chunks.len();
        let total_steps = conditions.total_operations();
        info!(
            workers = worker_count,
            total_steps,
            targets = targets.len(),
            balance = chunker::load_balance_score(&chunks),
            "starting seed search"
        );

        let conditions = Arc::new(conditions);
        let control = Arc::new(ControlToken::new());
        let state = Arc::new(Mutex::new(SearchState::Running));
        let (tx, rx) = channel();

        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(worker_count);
        for chunk in chunks {
            let worker_id = chunk.worker_id;
            let ctx = WorkerContext {
                worker_id,
                profile,
                conditions: conditions.clone(),
                chunk,
                targets: targets.clone(),
                control: control.clone(),
            };
            let events = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("seed-worker-{worker_id}"))
                .spawn(move || driver::run_worker(ctx, events));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    control.stop();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    self.active.store(false, Ordering::SeqCst);
                    return Err(SearchError::WorkerInitFailure {
                        worker_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let coordinator = {
            let state = state.clone();
            let active = self.active.clone();
            let control = control.clone();
            thread::Builder::new()
                .name("seed-coordinator".to_string())
                .spawn(move || {
                    run_coordinator(
                        rx,
                        callbacks,
                        workers,
                        state,
                        active,
                        control,
                        total_steps,
                        worker_count,
                    )
                })
        };
        let coordinator = match coordinator {
            Ok(handle) => handle,
            Err(e) => {
                control.stop();
                self.active.store(false, Ordering::SeqCst);
                return Err(SearchError::WorkerInitFailure {
                    worker_id: usize::MAX,
                    reason: format!("coordinator spawn failed: {e}"),
                });
            }
        };

        Ok(SearchHandle {
            control,
            state,
            events: tx,
            coordinator: Some(coordinator),
        })
    }
}

fn aggregate(snapshots: &HashMap<usize, ProgressSnapshot>, total_steps: u64) -> AggregatedProgress {
    let mut agg = AggregatedProgress {
        total_steps,
        ..Default::default()
    };
    for snap in snapshots.values() {
        agg.current_step += snap.current_step;
        agg.elapsed_millis += snap.elapsed_millis;
        agg.matches_found += snap.matches_found;
        if snap.status.is_terminal() {
            agg.completed_workers += 1;
        } else {
            agg.active_workers += 1;
        }
    }
    agg.workers = snapshots.clone();
    agg
}

#[allow(clippy::too_many_arguments)]
fn run_coordinator(
    rx: Receiver<SearchEvent>,
    callbacks: SearchCallbacks,
    workers: Vec<JoinHandle<()>>,
    state: Arc<Mutex<SearchState>>,
    active: Arc<AtomicBool>,
    control: Arc<ControlToken>,
    total_steps: u64,
    worker_count: usize,
) {
    let mut snapshots: HashMap<usize, ProgressSnapshot> = HashMap::new();
    let mut finished = 0usize;
    let mut failure: Option<SearchError> = None;

    while finished < worker_count {
        let Ok(event) = rx.recv() else { break };
        match event {
            SearchEvent::Progress(snapshot) => {
                if let Some(cb) = &callbacks.on_progress {
                    cb(&snapshot);
                }
                snapshots.insert(snapshot.worker_id, snapshot);
                if let Some(cb) = &callbacks.on_aggregated_progress {
                    cb(&aggregate(&snapshots, total_steps));
                }
            }
            SearchEvent::Match(result) => {
                if let Some(cb) = &callbacks.on_result {
                    cb(*result);
                }
            }
            SearchEvent::WorkerFailed { worker_id, reason } => {
                error!(worker_id, %reason, "worker failed, aborting peers");
                control.stop();
                {
                    let mut s = lock_state(&state);
                    if !s.is_terminal() {
                        *s = SearchState::Stopping;
                    }
                }
                if failure.is_none() {
                    let err = SearchError::WorkerInitFailure { worker_id, reason };
                    if let Some(cb) = &callbacks.on_error {
                        cb(&err);
                    }
                    failure = Some(err);
                }
            }
            SearchEvent::WorkerFinished { worker_id, status } => {
                finished += 1;
                if let Some(snapshot) = snapshots.get_mut(&worker_id) {
                    snapshot.status = status;
                }
            }
            SearchEvent::Paused => {
                if let Some(cb) = &callbacks.on_paused {
                    cb();
                }
            }
            SearchEvent::Resumed => {
                if let Some(cb) = &callbacks.on_resumed {
                    cb();
                }
            }
            SearchEvent::StopRequested => {
                info!("stop requested, draining workers");
            }
        }
    }

    for handle in workers {
        let _ = handle.join();
    }

    let final_state = {
        let mut s = lock_state(&state);
        let next = if failure.is_some() {
            SearchState::Failed
        } else if *s == SearchState::Stopping {
            SearchState::Stopped
        } else {
            SearchState::Completed
        };
        *s = next;
        next
    };

    let agg = aggregate(&snapshots, total_steps);
    match final_state {
        SearchState::Completed => {
            info!(
                steps = agg.current_step,
                matches = agg.matches_found,
                "search complete"
            );
            if let Some(cb) = &callbacks.on_complete {
                cb(&agg);
            }
        }
        SearchState::Stopped => {
            info!(steps = agg.current_step, "search stopped");
            if let Some(cb) = &callbacks.on_stopped {
                cb();
            }
        }
        _ => {
            warn!("search aborted after worker failure");
        }
    }
    active.store(false, Ordering::SeqCst);
}
