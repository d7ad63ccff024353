//! Foreground-focus forcing with bounded retries.
//!
//! Windows normally permits only the thread that owns the current foreground
//! window to change the foreground. The workarounds used here are the
//! thread-input attach trick and the topmost toggle; both are best-effort and
//! the worst outcome is a window left in the background.

use std::time::{Duration, Instant};

use log::{info, warn};

/// Raw top-level window handle owned by another process. The underlying
/// window can close or be replaced at any time, so holders must tolerate the
/// handle going stale between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub isize);

/// Result of waiting for a process to create its main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The main window appeared.
    Window(WindowHandle),
    /// The window did not appear within the wait budget.
    Timeout,
    /// The process terminated before creating a window.
    ProcessExited,
}

/// Outcome of a single focus attempt inside the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusAttemptResult {
    Success,
    Failed,
    WindowNotAvailable,
}

/// Narrow window-control seam over the OS. The live binding is in the win32
/// module; tests substitute a counting fake. Every operation is best-effort:
/// failure is reported as `false` or `None`, never as a panic or an error.
pub trait WindowControl {
    fn foreground_window(&self) -> Option<WindowHandle>;
    fn set_foreground_window(&self, window: WindowHandle) -> bool;
    /// Restore the window from a minimized or hidden state.
    fn restore_window(&self, window: WindowHandle) -> bool;
    /// Move the window to the topmost band, or back out of it.
    fn set_topmost(&self, window: WindowHandle, topmost: bool) -> bool;
    fn attach_thread_input(&self, thread: u32, attach_to: u32, attach: bool) -> bool;
    /// Id of the OS thread that owns the window, or 0 if it cannot be resolved.
    fn window_thread_id(&self, window: WindowHandle) -> u32;
    fn current_thread_id(&self) -> u32;
    /// Grant the process permission to bring itself to the foreground.
    fn allow_set_foreground(&self, pid: u32) -> bool;
}

/// Observed state of the process whose window is being focused. The process
/// is owned by the caller; this trait never terminates or closes it.
pub trait TargetProcess {
    fn pid(&self) -> u32;
    fn has_exited(&self) -> bool;
    /// Main top-level window, or `None` if the process has not created one
    /// yet (or has already torn it down).
    fn main_window(&self) -> Option<WindowHandle>;
}

/// Detaches thread input on drop so an attachment can never leak, whatever
/// path the focus attempt takes out of the attached section. Two threads
/// permanently sharing an input queue is a system-wide leak.
struct AttachGuard<'a, O: WindowControl> {
    ops: &'a O,
    thread: u32,
    attach_to: u32,
    attached: bool,
}

impl<'a, O: WindowControl> AttachGuard<'a, O> {
    fn attach(ops: &'a O, thread: u32, attach_to: u32) -> Self {
        // A thread cannot attach to itself, and a zero id means the owning
        // thread could not be resolved.
        let attached = thread != 0
            && attach_to != 0
            && thread != attach_to
            && ops.attach_thread_input(thread, attach_to, true);
        Self {
            ops,
            thread,
            attach_to,
            attached,
        }
    }
}

impl<O: WindowControl> Drop for AttachGuard<'_, O> {
    fn drop(&mut self) {
        if self.attached {
            self.ops.attach_thread_input(self.thread, self.attach_to, false);
        }
    }
}

/// Pause between the topmost and not-topmost halves of the fallback toggle.
const TOPMOST_SETTLE: Duration = Duration::from_millis(50);

/// Single best-effort attempt to make `window` the foreground window.
///
/// Strategies in order, stopping at the first success:
/// 1. No-op if the window already is the foreground window.
/// 2. Thread-input attach trick: attach to the window's thread and the
///    current foreground thread, restore the window, request foreground.
/// 3. Topmost toggle fallback if the request was rejected, then one more
///    foreground request.
///
/// Returns true only if the OS reported success or a re-check confirms the
/// window is now foreground. OS rejections come back as `false`, never as an
/// error: foreground-lock protection is an intentional OS feature.
pub fn bring_to_front<O: WindowControl>(ops: &O, window: WindowHandle) -> bool {
    let foreground = ops.foreground_window();
    if foreground == Some(window) {
        return true;
    }

    let this_thread = ops.current_thread_id();
    let target_thread = ops.window_thread_id(window);
    let fg_thread = foreground.map_or(0, |w| ops.window_thread_id(w));

    let mut success = {
        let _target = AttachGuard::attach(ops, this_thread, target_thread);
        let _foreground = AttachGuard::attach(ops, this_thread, fg_thread);

        ops.restore_window(window);
        ops.set_foreground_window(window)
        // Guards detach here, on every exit path.
    };

    if !success {
        // A topmost round-trip forces a z-order re-evaluation, which can
        // dislodge an unresponsive foreground owner.
        ops.set_topmost(window, true);
        std::thread::sleep(TOPMOST_SETTLE);
        ops.set_topmost(window, false);
        success = ops.set_foreground_window(window);
    }

    success || ops.foreground_window() == Some(window)
}

/// Poll `process` until its main window exists, it exits, or `max_wait`
/// elapses. `Timeout` is an expected outcome rather than an error; the caller
/// decides whether a missing window is fatal.
pub fn wait_for_main_window<P: TargetProcess>(
    process: &P,
    max_wait: Duration,
    poll_interval: Duration,
) -> WaitOutcome {
    let deadline = Instant::now() + max_wait;
    loop {
        if let Some(window) = process.main_window() {
            return WaitOutcome::Window(window);
        }
        if process.has_exited() {
            info!(
                "Process {} exited before creating a main window",
                process.pid()
            );
            return WaitOutcome::ProcessExited;
        }
        if Instant::now() >= deadline {
            return WaitOutcome::Timeout;
        }
        std::thread::sleep(poll_interval);
    }
}

/// Bounded retry loop around [`bring_to_front`].
///
/// The window handle is re-resolved from the process on every iteration: it
/// may not have existed earlier, or may have been recreated. Sleeps `delay`
/// between failed attempts but not after the final one. Per-attempt OS
/// failures are contained; the loop always runs to a boolean.
pub fn bring_to_front_with_retry<O, P>(
    ops: &O,
    process: &P,
    attempts: u32,
    delay: Duration,
) -> bool
where
    O: WindowControl,
    P: TargetProcess,
{
    // Optional pre-step: let the target raise itself if the OS honors it.
    ops.allow_set_foreground(process.pid());

    for attempt in 1..=attempts {
        let result = match process.main_window() {
            Some(window) => {
                if bring_to_front(ops, window) {
                    FocusAttemptResult::Success
                } else {
                    FocusAttemptResult::Failed
                }
            }
            None => FocusAttemptResult::WindowNotAvailable,
        };

        match result {
            FocusAttemptResult::Success => {
                info!("Frontend window is now in the foreground (attempt #{attempt})");
                return true;
            }
            FocusAttemptResult::Failed => {
                warn!("Failed to bring the frontend window to the front (attempt #{attempt})");
            }
            FocusAttemptResult::WindowNotAvailable => {
                if process.has_exited() {
                    // Resolving a window for a dead process is meaningless.
                    warn!("Frontend exited before its window could be focused");
                    return false;
                }
                warn!("Frontend window does not exist yet (attempt #{attempt})");
            }
        }

        if attempt < attempts {
            std::thread::sleep(delay);
        }
    }

    false
}
