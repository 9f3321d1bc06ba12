//! Win32Platform - WindowPlatform on top of user32
//!
//! Procedures are read, swapped and called through the narrow or wide
//! entrypoint matching the window's encoding. Reading a procedure through the
//! other entrypoint yields a conversion thunk instead of the real address.

use std::ffi::c_void;

use tracing::{error, warn};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::*;

use super::callbacks;
use crate::application::ports::{ObserverHandle, ObserverKind, WindowPlatform};
use crate::domain::errors::InterceptError;
use crate::domain::value_objects::{Message, ProcedureRef, TextEncoding, WindowHandle};

/// The real windowing layer of the calling process
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32Platform;

impl Win32Platform {
    pub fn new() -> Self {
        Self
    }
}

pub fn to_hwnd(window: WindowHandle) -> HWND {
    HWND(window.raw() as *mut c_void)
}

pub fn from_hwnd(hwnd: HWND) -> WindowHandle {
    WindowHandle::from_raw(hwnd.0 as usize)
}

pub(crate) fn to_message(msg: u32, wparam: WPARAM, lparam: LPARAM) -> Message {
    Message::new(msg, wparam.0, lparam.0)
}

fn to_wndproc(procedure: ProcedureRef) -> WNDPROC {
    // SAFETY: a ProcedureRef only ever holds an address read from the window
    // or one of our own entrypoints, and WNDPROC is a nullable fn pointer.
    unsafe { std::mem::transmute::<usize, WNDPROC>(procedure.raw()) }
}

#[cfg(target_pointer_width = "64")]
unsafe fn read_procedure(hwnd: HWND, encoding: TextEncoding) -> isize {
    match encoding {
        TextEncoding::Wide => GetWindowLongPtrW(hwnd, GWLP_WNDPROC),
        TextEncoding::Narrow => GetWindowLongPtrA(hwnd, GWLP_WNDPROC),
    }
}

#[cfg(target_pointer_width = "64")]
unsafe fn write_procedure(hwnd: HWND, encoding: TextEncoding, value: isize) -> isize {
    match encoding {
        TextEncoding::Wide => SetWindowLongPtrW(hwnd, GWLP_WNDPROC, value),
        TextEncoding::Narrow => SetWindowLongPtrA(hwnd, GWLP_WNDPROC, value),
    }
}

#[cfg(target_pointer_width = "32")]
unsafe fn read_procedure(hwnd: HWND, encoding: TextEncoding) -> isize {
    match encoding {
        TextEncoding::Wide => GetWindowLongW(hwnd, GWL_WNDPROC) as isize,
        TextEncoding::Narrow => GetWindowLongA(hwnd, GWL_WNDPROC) as isize,
    }
}

#[cfg(target_pointer_width = "32")]
unsafe fn write_procedure(hwnd: HWND, encoding: TextEncoding, value: isize) -> isize {
    match encoding {
        TextEncoding::Wide => SetWindowLongW(hwnd, GWL_WNDPROC, value as i32) as isize,
        TextEncoding::Narrow => SetWindowLongA(hwnd, GWL_WNDPROC, value as i32) as isize,
    }
}

/// Default handling through the entrypoint matching `encoding`
pub(crate) fn default_window_proc(
    hwnd: HWND,
    encoding: TextEncoding,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe {
        match encoding {
            TextEncoding::Wide => DefWindowProcW(hwnd, msg, wparam, lparam),
            TextEncoding::Narrow => DefWindowProcA(hwnd, msg, wparam, lparam),
        }
    }
}

pub(crate) fn encoding_of(hwnd: HWND) -> TextEncoding {
    TextEncoding::from_unicode_flag(unsafe { IsWindowUnicode(hwnd) }.as_bool())
}

impl WindowPlatform for Win32Platform {
    fn dispatcher_procedure(&self) -> ProcedureRef {
        ProcedureRef::from_address(callbacks::subclass_proc as usize)
    }

    fn window_encoding(&self, window: WindowHandle) -> TextEncoding {
        encoding_of(to_hwnd(window))
    }

    fn active_procedure(&self, window: WindowHandle, encoding: TextEncoding) -> Option<ProcedureRef> {
        let raw = unsafe { read_procedure(to_hwnd(window), encoding) };
        ProcedureRef::from_raw(raw as usize)
    }

    fn replace_procedure(
        &self,
        window: WindowHandle,
        encoding: TextEncoding,
        procedure: ProcedureRef,
    ) -> Option<ProcedureRef> {
        let previous = unsafe { write_procedure(to_hwnd(window), encoding, procedure.raw() as isize) };
        let previous = ProcedureRef::from_raw(previous as usize);
        if previous.is_none() {
            warn!("Window {window} reported no previous procedure");
        }
        previous
    }

    fn call_procedure(
        &self,
        procedure: ProcedureRef,
        window: WindowHandle,
        encoding: TextEncoding,
        message: Message,
    ) -> isize {
        let hwnd = to_hwnd(window);
        let wparam = WPARAM(message.wparam);
        let lparam = LPARAM(message.lparam);
        let result = unsafe {
            match encoding {
                TextEncoding::Wide => {
                    CallWindowProcW(to_wndproc(procedure), hwnd, message.id, wparam, lparam)
                }
                TextEncoding::Narrow => {
                    CallWindowProcA(to_wndproc(procedure), hwnd, message.id, wparam, lparam)
                }
            }
        };
        result.0
    }

    fn default_procedure(&self, window: WindowHandle, encoding: TextEncoding, message: Message) -> isize {
        default_window_proc(
            to_hwnd(window),
            encoding,
            message.id,
            WPARAM(message.wparam),
            LPARAM(message.lparam),
        )
        .0
    }

    fn install_observer(&self, kind: ObserverKind) -> Result<ObserverHandle, InterceptError> {
        let (id, hook_proc): (WINDOWS_HOOK_ID, HOOKPROC) = match kind {
            ObserverKind::BeforeDelivery => (WH_CALLWNDPROC, Some(callbacks::call_hook_proc)),
            ObserverKind::AfterDelivery => (WH_CALLWNDPROCRET, Some(callbacks::after_hook_proc)),
        };

        let hook = unsafe {
            SetWindowsHookExW(id, hook_proc, HINSTANCE::default(), GetCurrentThreadId())
        }
        .map_err(|e| {
            error!("Failed to install {kind:?} hook: {e}");
            InterceptError::ObserverInstall(e.to_string())
        })?;

        Ok(ObserverHandle(hook.0 as usize))
    }

    fn remove_observer(&self, handle: ObserverHandle) {
        let hook = HHOOK(handle.0 as *mut c_void);
        if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
            warn!("Failed to remove hook {handle:?}: {e}");
        }
    }

    fn hide_cursor(&self) {
        unsafe {
            let _ = SetCursor(HCURSOR::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::win32::window::{create_window, destroy_window, register_window_class};

    #[test]
    fn test_subclass_and_restore_real_window() {
        register_window_class().unwrap();
        let hwnd = create_window("procedure swap").unwrap();
        let platform = Win32Platform::new();
        let window = from_hwnd(hwnd);

        let encoding = platform.window_encoding(window);
        assert_eq!(encoding, TextEncoding::Wide);

        let original = platform.active_procedure(window, encoding).unwrap();
        let dispatcher = platform.dispatcher_procedure();
        assert_eq!(platform.replace_procedure(window, encoding, dispatcher), Some(original));
        assert_eq!(platform.active_procedure(window, encoding), Some(dispatcher));

        platform.replace_procedure(window, encoding, original);
        assert_eq!(platform.active_procedure(window, encoding), Some(original));

        destroy_window(hwnd);
    }

    #[test]
    fn test_hook_install_and_remove() {
        let platform = Win32Platform::new();
        let handle = platform.install_observer(ObserverKind::BeforeDelivery).unwrap();
        platform.remove_observer(handle);
    }
}
