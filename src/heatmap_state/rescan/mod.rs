//! # Rescan Scheduler
//!
//! Cooperative, tick-budgeted re-population of a slot's cache over a disc of chunks.
//!
//! ## Job Lifecycle
//! 1. A job is staged via [`RescanScheduler::seed`] (manual reset, or a fill request
//!    when a slot becomes visible)
//! 2. Every tick the owner checks whether the job is still wanted and cancels it if
//!    not ([`RescanScheduler::cancel`])
//! 3. [`RescanScheduler::process_batch`] pops up to `batch_size` chunks and scans them,
//!    drawing from the shared [`ScanBudget`]
//! 4. When the pending queue drains the job is removed and reported as
//!    [`RescanProgress::Completed`]; the owner then refreshes overlays and saves
//!
//! At most one job exists at a time; seeding replaces the previous job.
//!
//! ## Chunks That Are Not Loaded
//! A chunk that is not resident when its turn comes is handled per [`RetryPolicy`]:
//! dropped for good, or put back at the end of the queue until its attempt cap.

mod job;

pub use job::{PendingChunk, RescanJob, RescanMode};

use super::{
    config::RetryPolicy,
    coordinates::{ChunkKey, DimensionId},
    scanning::{scan_chunk, ScanBudget, ScanError, WorldView},
    shared::{RunningMax, SlotData},
    slot::SlotIndex,
};

/// Result of one scheduling opportunity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RescanProgress {
    /// No job is staged.
    Idle,
    /// The job advanced (or waited on the budget) and still has pending chunks.
    Progressed {
        /// Chunks scanned in this batch.
        scanned: usize,
    },
    /// The job drained and was removed.
    Completed {
        /// The slot the job filled.
        slot: SlotIndex,
        /// Chunks scanned over the job's lifetime.
        scanned: usize,
        /// Chunks given up on over the job's lifetime.
        dropped: usize,
    },
}

/// Owns the single background rescan job.
#[derive(Debug)]
pub struct RescanScheduler {
    job: Option<RescanJob>,
    batch_size: usize,
    retry: RetryPolicy,
}

impl RescanScheduler {
    /// Creates an idle scheduler.
    ///
    /// # Arguments
    /// * `batch_size` - Chunks attempted per scheduling opportunity
    /// * `retry` - What to do with chunks that are not resident yet
    pub fn new(batch_size: usize, retry: RetryPolicy) -> Self {
        Self {
            job: None,
            batch_size: batch_size.max(1),
            retry,
        }
    }

    /// Applies new batch and retry settings. A running job keeps going under them.
    pub fn configure(&mut self, batch_size: usize, retry: RetryPolicy) {
        self.batch_size = batch_size.max(1);
        self.retry = retry;
    }

    /// Stages a job over the disc of `radius` chunks around `center`, replacing any
    /// current job.
    pub fn seed(
        &mut self,
        slot: SlotIndex,
        dimension: DimensionId,
        center: ChunkKey,
        radius: u32,
        mode: RescanMode,
    ) -> &RescanJob {
        if let Some(previous) = self.job.take() {
            log::debug!(
                "Replacing slot {} rescan with {} chunks left",
                previous.slot,
                previous.pending_len()
            );
        }
        let job = RescanJob::new(slot, dimension, center, radius, mode);
        log::info!(
            "Seeded {:?} for slot {} around chunk {} (radius {}, {} chunks)",
            mode,
            slot,
            center,
            radius,
            job.pending_len()
        );
        self.job.insert(job)
    }

    /// Stops and removes the current job. Counts already written stay in the cache.
    pub fn cancel(&mut self, reason: &str) -> Option<RescanJob> {
        let mut job = self.job.take()?;
        job.active = false;
        log::info!(
            "Cancelled slot {} rescan ({}), {} chunks left",
            job.slot,
            reason,
            job.pending_len()
        );
        Some(job)
    }

    /// The staged job, if any.
    pub fn job(&self) -> Option<&RescanJob> {
        self.job.as_ref()
    }

    /// Runs one batch of the staged job against `slot_data`.
    ///
    /// Every pending chunk is looked at no more than once per batch, so a requeued chunk
    /// cannot burn through its attempts within a single tick.
    ///
    /// # Arguments
    /// * `world` - The world to scan
    /// * `slot_data` - Tracked set and cache of the job's slot
    /// * `budget` - The shared per-tick scan budget
    /// * `running_max` - Raised with every new count when the job's slot is being
    ///   rendered
    pub fn process_batch<W: WorldView + ?Sized>(
        &mut self,
        world: &W,
        slot_data: &SlotData,
        budget: &ScanBudget,
        running_max: Option<&RunningMax>,
    ) -> RescanProgress {
        let Some(job) = self.job.as_mut() else {
            return RescanProgress::Idle;
        };

        let started = web_time::Instant::now();
        let tracked = slot_data.tracked.get();
        let mut attempted = 0;
        let mut scanned = 0;
        let visits = job.pending.len();

        for _ in 0..visits {
            if attempted >= self.batch_size {
                break;
            }
            let Some(mut pending) = job.pending.pop_front() else {
                break;
            };

            if job.mode == RescanMode::Fill
                && slot_data.cache.get().contains(&job.dimension, pending.key)
            {
                continue;
            }
            if !budget.try_acquire() {
                job.pending.push_front(pending);
                break;
            }
            attempted += 1;

            match scan_chunk(world, pending.key, &tracked) {
                Ok(count) => {
                    slot_data
                        .cache
                        .get_mut()
                        .insert(&job.dimension, pending.key, count);
                    if let Some(max) = running_max {
                        max.observe(count);
                    }
                    job.scanned_count += 1;
                    scanned += 1;
                }
                Err(ScanError::NotResident(key)) => {
                    pending.attempts += 1;
                    match self.retry {
                        RetryPolicy::Requeue { max_attempts } if pending.attempts < max_attempts => {
                            job.pending.push_back(pending);
                        }
                        _ => {
                            log::debug!(
                                "Giving up on chunk {} after {} attempts",
                                key,
                                pending.attempts
                            );
                            job.dropped_count += 1;
                        }
                    }
                }
            }
        }
        drop(tracked);

        if attempted > 0 {
            log::debug!(
                "Rescan batch: {} scanned, {} pending, took {:?}",
                scanned,
                job.pending_len(),
                started.elapsed()
            );
        }

        if !job.pending.is_empty() {
            return RescanProgress::Progressed { scanned };
        }

        let mut finished = match self.job.take() {
            Some(job) => job,
            None => return RescanProgress::Idle,
        };
        finished.active = false;
        log::info!(
            "Slot {} rescan complete: {} scanned, {} dropped",
            finished.slot,
            finished.scanned_count,
            finished.dropped_count
        );
        RescanProgress::Completed {
            slot: finished.slot,
            scanned: finished.scanned_count,
            dropped: finished.dropped_count,
        }
    }
}
