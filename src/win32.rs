//! Live Win32 bindings behind the window-control and process seams.

use std::cell::RefCell;
use std::process::Child;

use log::warn;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM};
use windows::Win32::System::Threading::{AttachThreadInput, GetCurrentThreadId};
use windows::Win32::UI::WindowsAndMessaging::{
    AllowSetForegroundWindow, EnumWindows, GetForegroundWindow, GetWindowTextLengthW,
    GetWindowThreadProcessId, IsWindowVisible, SetForegroundWindow, SetWindowPos, ShowWindow,
    HWND_NOTOPMOST, HWND_TOPMOST, SWP_NOMOVE, SWP_NOSIZE, SWP_SHOWWINDOW, SW_RESTORE,
};

use crate::focus::{TargetProcess, WindowControl, WindowHandle};

fn to_hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut _)
}

/// Window control backed by user32. All failures are mapped to `false` and
/// logged at warn level; foreground rejection is normal OS behavior, not a
/// bug condition.
pub struct Win32WindowControl;

impl WindowControl for Win32WindowControl {
    fn foreground_window(&self) -> Option<WindowHandle> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            None
        } else {
            Some(WindowHandle(hwnd.0 as isize))
        }
    }

    fn set_foreground_window(&self, window: WindowHandle) -> bool {
        unsafe { SetForegroundWindow(to_hwnd(window)).as_bool() }
    }

    fn restore_window(&self, window: WindowHandle) -> bool {
        unsafe { ShowWindow(to_hwnd(window), SW_RESTORE).as_bool() }
    }

    fn set_topmost(&self, window: WindowHandle, topmost: bool) -> bool {
        let insert_after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
        let result = unsafe {
            SetWindowPos(
                to_hwnd(window),
                insert_after,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_SHOWWINDOW,
            )
        };
        if let Err(e) = &result {
            warn!("SetWindowPos failed: {e}");
        }
        result.is_ok()
    }

    fn attach_thread_input(&self, thread: u32, attach_to: u32, attach: bool) -> bool {
        unsafe { AttachThreadInput(thread, attach_to, BOOL::from(attach)).as_bool() }
    }

    fn window_thread_id(&self, window: WindowHandle) -> u32 {
        unsafe { GetWindowThreadProcessId(to_hwnd(window), None) }
    }

    fn current_thread_id(&self) -> u32 {
        unsafe { GetCurrentThreadId() }
    }

    fn allow_set_foreground(&self, pid: u32) -> bool {
        match unsafe { AllowSetForegroundWindow(pid) } {
            Ok(()) => true,
            Err(e) => {
                warn!("AllowSetForegroundWindow failed for pid {pid}: {e}");
                false
            }
        }
    }
}

/// A spawned frontend observed through the process seam. Owns the child
/// handle for state queries but never kills it.
pub struct SpawnedProcess {
    child: RefCell<Child>,
    pid: u32,
}

impl SpawnedProcess {
    pub fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child: RefCell::new(child),
            pid,
        }
    }
}

impl TargetProcess for SpawnedProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn has_exited(&self) -> bool {
        match self.child.borrow_mut().try_wait() {
            Ok(status) => status.is_some(),
            Err(e) => {
                warn!("Could not query frontend process state: {e}");
                false
            }
        }
    }

    fn main_window(&self) -> Option<WindowHandle> {
        find_main_window(self.pid)
    }
}

struct FindWindowData {
    pid: u32,
    hwnd: Option<HWND>,
}

/// Find the main top-level window of a process: visible, titled, and owned
/// by the given pid. Returns `None` while the process has no such window.
pub fn find_main_window(pid: u32) -> Option<WindowHandle> {
    let mut data = FindWindowData { pid, hwnd: None };

    unsafe {
        // EnumWindows reports an error when the callback stops enumeration
        // early, which is how a match is signalled.
        let _ = EnumWindows(
            Some(enum_windows_callback),
            LPARAM(&mut data as *mut FindWindowData as isize),
        );
    }

    data.hwnd.map(|h| WindowHandle(h.0 as isize))
}

unsafe extern "system" fn enum_windows_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let data = &mut *(lparam.0 as *mut FindWindowData);

    // Skip invisible windows and the untitled message-only helpers every
    // process carries around.
    if !IsWindowVisible(hwnd).as_bool() || GetWindowTextLengthW(hwnd) == 0 {
        return BOOL(1);
    }

    let mut pid: u32 = 0;
    GetWindowThreadProcessId(hwnd, Some(&mut pid));
    if pid == data.pid {
        data.hwnd = Some(hwnd);
        return BOOL(0); // Stop enumeration
    }

    BOOL(1)
}
