//! Native entrypoints handed to user32
//!
//! The window procedure installed into subclassed windows and the two hook
//! procedures. They reach the interceptor through one published weak pointer;
//! when nothing is published, or the interceptor is gone, messages get
//! default handling (subclassing) or are simply chained (hooks).

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::trace;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{CallNextHookEx, CWPRETSTRUCT, CWPSTRUCT, HHOOK};

use super::platform::{default_window_proc, encoding_of, from_hwnd, to_message, Win32Platform};
use crate::application::services::Interceptor;
use crate::application::strategies::Delivery;

static ACTIVE: RwLock<Option<Weak<Interceptor<Win32Platform>>>> = parking_lot::const_rwlock(None);

/// Make `interceptor` the target of every callback in the process
pub fn publish(interceptor: &Arc<Interceptor<Win32Platform>>) {
    *ACTIVE.write() = Some(Arc::downgrade(interceptor));
}

/// Detach the callbacks from any interceptor
pub fn withdraw() {
    *ACTIVE.write() = None;
}

fn active() -> Option<Arc<Interceptor<Win32Platform>>> {
    ACTIVE.read().as_ref().and_then(Weak::upgrade)
}

/// Window procedure installed by the subclass strategy
pub unsafe extern "system" fn subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let Some(interceptor) = active() else {
        return default_window_proc(hwnd, encoding_of(hwnd), msg, wparam, lparam);
    };

    match interceptor.dispatch(from_hwnd(hwnd), to_message(msg, wparam, lparam)) {
        Delivery::Handled(result) => LRESULT(result),
        Delivery::Chain => default_window_proc(hwnd, encoding_of(hwnd), msg, wparam, lparam),
    }
}

/// WH_CALLWNDPROC hook: sees each message before the window procedure does
pub unsafe extern "system" fn call_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 && lparam.0 != 0 {
        if let Some(interceptor) = active() {
            let cwp = &*(lparam.0 as *const CWPSTRUCT);
            let message = to_message(cwp.message, cwp.wParam, cwp.lParam);
            trace!("Hook saw {:#06x} for {:?}", cwp.message, cwp.hwnd);
            interceptor.dispatch(from_hwnd(cwp.hwnd), message);
        }
    }
    CallNextHookEx(HHOOK::default(), code, wparam, lparam)
}

/// WH_CALLWNDPROCRET hook: sees each message after the window procedure
pub unsafe extern "system" fn after_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 && lparam.0 != 0 {
        if let Some(interceptor) = active() {
            let ret = &*(lparam.0 as *const CWPRETSTRUCT);
            interceptor.after_delivery(to_message(ret.message, ret.wParam, ret.lParam));
        }
    }
    CallNextHookEx(HHOOK::default(), code, wparam, lparam)
}
