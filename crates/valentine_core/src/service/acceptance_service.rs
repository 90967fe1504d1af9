//! Acceptance flow: the one-way `Undecided -> Accepted` transition.
//!
//! # Responsibility
//! - Guard the accept action so it runs at most once per view.
//! - Sequence celebrate, capture, upload, persist and notify.
//!
//! # Invariants
//! - `Accepted` is terminal; there is no way back to `Undecided`.
//! - Only the caller that wins the state compare-exchange runs the pipeline.
//! - Capture, upload, persist and notify failures are logged and never roll
//!   back the acceptance.
//! - A page with a stored acceptance starts `Accepted` and never re-runs.

use crate::model::acceptance::AcceptanceRecord;
use crate::model::page::{Page, PageId};
use crate::model::theme::Theme;
use crate::relay::notify::{CreatorNotifier, NotifyOutcome, NotifyRequest};
use crate::relay::snapshot::{snapshot_object_name, SnapshotCapturer};
use crate::relay::storage::SnapshotStore;
use crate::repo::acceptance_repo::{AcceptanceRepository, RecordOutcome};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptState {
    Undecided,
    Accepted,
}

/// What the shell renders the moment the recipient says yes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Celebration {
    pub confetti_colors: [String; 3],
    pub sender_name: Option<String>,
    pub main_emoji: &'static str,
    pub final_message: String,
}

/// Proof that this caller won the accept race. Consumed by `complete`.
#[derive(Debug)]
pub struct AcceptTicket {
    celebration: Celebration,
    accepted_at: i64,
}

impl AcceptTicket {
    pub fn celebration(&self) -> &Celebration {
        &self.celebration
    }

    pub fn accepted_at(&self) -> i64 {
        self.accepted_at
    }
}

/// Downstream collaborators for one accept run.
pub struct AcceptSteps<'a> {
    pub capturer: &'a dyn SnapshotCapturer,
    pub store: &'a dyn SnapshotStore,
    pub notifier: &'a dyn CreatorNotifier,
}

/// Outcome of the post-celebration pipeline. `None` marks a failed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptReport {
    pub snapshot_url: Option<String>,
    pub record: Option<RecordOutcome>,
    pub notification: Option<NotifyOutcome>,
}

pub struct AcceptanceFlow<A: AcceptanceRepository> {
    page_id: PageId,
    receiver_name: Option<String>,
    celebration: Celebration,
    repo: A,
    accepted: AtomicBool,
    processing: AtomicBool,
    snapshot_url: Mutex<Option<String>>,
    settle_delay: Duration,
}

impl<A: AcceptanceRepository> AcceptanceFlow<A> {
    /// Builds the flow for a page, starting `Accepted` when `existing` is set.
    pub fn new(
        page: &Page,
        theme: &Theme,
        repo: A,
        existing: Option<&AcceptanceRecord>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            page_id: page.id.clone(),
            receiver_name: page.receiver_name.clone(),
            celebration: Celebration {
                confetti_colors: theme.confetti_colors(),
                sender_name: page.sender_name.clone(),
                main_emoji: page.resolved_decoration().main_emoji(),
                final_message: page.final_message.clone(),
            },
            repo,
            accepted: AtomicBool::new(existing.is_some()),
            processing: AtomicBool::new(false),
            snapshot_url: Mutex::new(existing.and_then(|record| record.snapshot_url.clone())),
            settle_delay,
        }
    }

    pub fn state(&self) -> AcceptState {
        if self.accepted.load(Ordering::Acquire) {
            AcceptState::Accepted
        } else {
            AcceptState::Undecided
        }
    }

    /// Whether the post-celebration pipeline is still running.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn snapshot_url(&self) -> Option<String> {
        self.snapshot_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Marks the page accepted and hands out the single ticket.
    ///
    /// Returns `None` when already accepted, when another caller won, or when
    /// the store already holds an acceptance from another session.
    pub fn begin(&self) -> Option<AcceptTicket> {
        if self.accepted.load(Ordering::Acquire) {
            return None;
        }

        match self.repo.get_acceptance(&self.page_id) {
            Ok(Some(existing)) => {
                self.adopt(existing.snapshot_url);
                info!("event=accept_begin module=service status=skipped reason=already_accepted");
                return None;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    "event=accept_begin module=service status=degraded error_code=acceptance_lookup_failed error={err}"
                );
            }
        }

        if self
            .accepted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        self.processing.store(true, Ordering::Release);
        info!("event=accept_begin module=service status=ok");

        Some(AcceptTicket {
            celebration: self.celebration.clone(),
            accepted_at: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Runs capture, upload, persist and notify for a won ticket.
    pub fn complete(&self, ticket: AcceptTicket, steps: &AcceptSteps<'_>) -> AcceptReport {
        let started_at = Instant::now();
        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }

        let snapshot_url = self.capture_and_upload(ticket.accepted_at, steps);
        *self
            .snapshot_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = snapshot_url.clone();

        let record = AcceptanceRecord::new(
            self.page_id.clone(),
            ticket.accepted_at,
            snapshot_url.clone(),
        );
        let record = match self.repo.record_acceptance(&record) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(
                    "event=accept_record module=service status=error error_code=record_failed error={err}"
                );
                None
            }
        };

        let request = NotifyRequest {
            page_id: self.page_id.clone(),
            screenshot_url: snapshot_url.clone(),
            receiver_name: self.receiver_name.clone(),
        };
        let notification = match steps.notifier.notify(&request) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(
                    "event=accept_notify module=service status=error error_code={} error={err}",
                    err.code()
                );
                None
            }
        };

        self.processing.store(false, Ordering::Release);
        info!(
            "event=accept_complete module=service status=ok duration_ms={} has_snapshot={} recorded={} notified={}",
            started_at.elapsed().as_millis(),
            snapshot_url.is_some(),
            record.is_some(),
            notification.is_some()
        );

        AcceptReport {
            snapshot_url,
            record,
            notification,
        }
    }

    /// `begin` then `complete`, celebrating in between.
    ///
    /// Returns `None` when the accept was suppressed.
    pub fn accept(
        &self,
        steps: &AcceptSteps<'_>,
        celebrate: impl FnOnce(&Celebration),
    ) -> Option<AcceptReport> {
        let ticket = self.begin()?;
        celebrate(ticket.celebration());
        Some(self.complete(ticket, steps))
    }

    fn capture_and_upload(&self, accepted_at: i64, steps: &AcceptSteps<'_>) -> Option<String> {
        let bytes = match steps.capturer.capture() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("event=accept_capture module=service status=error error={err}");
                return None;
            }
        };

        let name = snapshot_object_name(&self.page_id, accepted_at);
        match steps.store.upload_png(&name, &bytes) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(
                    "event=accept_upload module=service status=error error_code={} error={err}",
                    err.code()
                );
                None
            }
        }
    }

    fn adopt(&self, snapshot_url: Option<String>) {
        self.accepted.store(true, Ordering::Release);
        *self
            .snapshot_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = snapshot_url;
    }
}
