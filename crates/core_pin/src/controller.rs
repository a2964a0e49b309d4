//! The bottom-pinning controller.
//!
//! # Architecture
//!
//! Each [`PinController`] owns at most one maintenance loop, spawned as a
//! Tokio task by [`PinController::lock`]. The loop polls the window's
//! stacking depth and rectangle, and issues a single bottom-of-stack
//! placement whenever either has drifted from the last enforced state.
//!
//! # Cancellation
//!
//! Every loop gets its own `watch` channel. [`PinController::unlock`] (or
//! starting a new lock, or dropping the controller) flips it to `true`.
//! The loop checks the flag once per iteration, inside the controller's
//! critical section, so:
//! - once `unlock` returns, the cancelled loop never starts another iteration
//! - an iteration that already passed its check may finish its correction
//! - two loops of the same controller never correct concurrently
//!
//! The inter-iteration wait also wakes on the flag, so a cancelled task
//! exits promptly instead of sleeping out its interval.

use crate::geometry::Geometry;
use crate::system::{
    ExtendedStyle, Placement, WindowId, WindowStyle, WindowSystem, WindowSystemError,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Delay between two polls of the pinned window.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Construction options for a [`PinController`].
#[derive(Debug, Clone)]
pub struct PinOptions {
    /// Delay between iterations of the maintenance loop.
    pub poll_interval: Duration,
    /// Apply the tool-window / bare styles at construction so the window
    /// never shows up in the taskbar or Alt-Tab.
    pub hide_from_task_switcher: bool,
}

impl Default for PinOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            hide_from_task_switcher: true,
        }
    }
}

/// Lifecycle state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    /// No loop is running.
    Idle,
    /// A maintenance loop is running.
    Pinning,
}

/// State shared between the controller and its loops.
#[derive(Debug, Default)]
struct PinRecord {
    /// Stacking depth observed right after the last correction.
    /// `None` until the first correction, which forces one on the first poll.
    baseline: Option<usize>,
    /// Number of placement calls issued over the controller's lifetime.
    corrections: u64,
}

/// Cancellation side of one running loop. Dropping it cancels the loop.
struct ActiveLoop {
    cancel: watch::Sender<bool>,
}

impl Drop for ActiveLoop {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}

/// Keeps one window at the bottom of the stacking order.
///
/// The controller does not own the window: the caller guarantees the handle
/// outlives any active loop. Unlocking stops future corrections only; it
/// never restores the window's previous position or z-order. Dropping the
/// controller cancels its loop the same way [`unlock`](Self::unlock) does.
///
/// # Example
///
/// ```ignore
/// let system = Arc::new(Win32WindowSystem);
/// let mut pin = PinController::new(hwnd, system, PinOptions::default());
/// pin.lock(Geometry::unconstrained().with_x(0).with_y(0));
/// // ... later
/// pin.unlock();
/// ```
pub struct PinController<S: WindowSystem> {
    window: WindowId,
    system: Arc<S>,
    options: PinOptions,
    record: Arc<Mutex<PinRecord>>,
    active: Option<ActiveLoop>,
}

impl<S: WindowSystem> PinController<S> {
    /// Bind a controller to `window`.
    ///
    /// When `options.hide_from_task_switcher` is set, the window's styles are
    /// changed synchronously here. Failures are logged and otherwise ignored.
    pub fn new(window: WindowId, system: Arc<S>, options: PinOptions) -> Self {
        if options.hide_from_task_switcher {
            hide_from_task_switcher(system.as_ref(), window);
        }

        Self {
            window,
            system,
            options,
            record: Arc::new(Mutex::new(PinRecord::default())),
            active: None,
        }
    }

    /// Start (or restart) pinning with the given target geometry.
    ///
    /// Any running loop is cancelled before the new one is spawned. Returns
    /// immediately; the returned handle resolves once the new loop has been
    /// cancelled and exited, and may be ignored.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn lock(&mut self, target: Geometry) -> JoinHandle<()> {
        self.unlock();

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(run_pin_loop(
            self.window,
            Arc::clone(&self.system),
            Arc::clone(&self.record),
            target,
            self.options.poll_interval,
            cancel_rx,
        ));
        self.active = Some(ActiveLoop { cancel: cancel_tx });

        info!("Pinning window {:#x} to bottom (target: {:?})", self.window, target);
        handle
    }

    /// Stop pinning. A no-op when idle; never touches the window.
    pub fn unlock(&mut self) {
        if self.active.take().is_some() {
            debug!("Unpinned window {:#x}", self.window);
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PinState {
        if self.active.is_some() {
            PinState::Pinning
        } else {
            PinState::Idle
        }
    }

    /// Stacking depth recorded after the most recent correction.
    pub fn baseline(&self) -> Option<usize> {
        lock_record(&self.record).baseline
    }

    /// Total placement calls issued by this controller's loops.
    pub fn corrections(&self) -> u64 {
        lock_record(&self.record).corrections
    }

    /// The window this controller is bound to.
    pub fn window(&self) -> WindowId {
        self.window
    }
}

fn lock_record(record: &Mutex<PinRecord>) -> MutexGuard<'_, PinRecord> {
    // The record is plain data; a panic elsewhere cannot leave it torn.
    record.lock().unwrap_or_else(PoisonError::into_inner)
}

fn hide_from_task_switcher<S: WindowSystem>(system: &S, window: WindowId) {
    if let Err(e) = system.set_extended_style(window, ExtendedStyle::ToolWindow) {
        warn!("Failed to hide window {:#x} from task switcher: {}", window, e);
    }
    if let Err(e) = system.set_style(window, WindowStyle::Bare) {
        warn!("Failed to strip window {:#x} styles: {}", window, e);
    }
}

/// Cancelled explicitly, or the controller side has gone away.
fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow() || cancel.has_changed().is_err()
}

async fn run_pin_loop<S: WindowSystem>(
    window: WindowId,
    system: Arc<S>,
    record: Arc<Mutex<PinRecord>>,
    target: Geometry,
    poll_interval: Duration,
    mut cancel: watch::Receiver<bool>,
) {
    debug!("Pin loop started for window {:#x}", window);

    loop {
        {
            let mut record = lock_record(&record);
            if is_cancelled(&cancel) {
                break;
            }
            if let Err(e) = correct_once(system.as_ref(), window, &target, &mut record) {
                // Window gone or query refused: keep polling, only cancellation ends the loop.
                trace!("Skipping pin iteration for window {:#x}: {}", window, e);
            }
        }

        tokio::select! {
            biased;
            _ = cancel.changed() => {}
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }

    debug!("Pin loop stopped for window {:#x}", window);
}

/// One poll/compare/correct pass. Returns whether a placement was issued.
fn correct_once<S: WindowSystem>(
    system: &S,
    window: WindowId,
    target: &Geometry,
    record: &mut PinRecord,
) -> Result<bool, WindowSystemError> {
    let depth = system.stacking_depth(window)?;
    let current = system.window_rect(window)?;

    let stacking_drift = record.baseline != Some(depth);
    let geometry_drift = !target.matches(&current);
    if !stacking_drift && !geometry_drift {
        return Ok(false);
    }

    let placement = Placement::to_bottom(target, &current);
    debug!(
        "Correcting window {:#x}: depth {} (baseline {:?}), rect {:?} -> {:?}",
        window, depth, record.baseline, current, placement.rect
    );

    if let Err(e) = system.set_placement(window, &placement) {
        debug!("Placement failed for window {:#x}: {}", window, e);
    }
    record.corrections += 1;

    // An unreadable depth leaves no baseline, so the next poll corrects again.
    record.baseline = system.stacking_depth(window).ok();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_options_default() {
        let options = PinOptions::default();
        assert_eq!(options.poll_interval, Duration::from_millis(100));
        assert!(options.hide_from_task_switcher);
    }

    #[test]
    fn test_record_starts_without_baseline() {
        let record = PinRecord::default();
        assert_eq!(record.baseline, None);
        assert_eq!(record.corrections, 0);
    }

    #[test]
    fn test_dropping_active_loop_cancels() {
        let (tx, rx) = watch::channel(false);
        let active = ActiveLoop { cancel: tx };
        assert!(!is_cancelled(&rx));
        drop(active);
        assert!(is_cancelled(&rx));
    }

    #[test]
    fn test_closed_channel_counts_as_cancelled() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        assert!(is_cancelled(&rx));
    }
}
