//! Win32 message loop

use windows::Win32::UI::WindowsAndMessaging::*;

/// Run the Windows message loop
///
/// # Arguments
/// * `on_message` - Callback for each message, return true to continue, false to exit
pub fn run_message_loop<F>(mut on_message: F)
where
    F: FnMut(&MSG) -> bool,
{
    unsafe {
        let mut msg = MSG::default();
        loop {
            let ret = GetMessageW(&mut msg, None, 0, 0);
            if ret.0 <= 0 {
                break;
            }

            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);

            if !on_message(&msg) {
                break;
            }
        }
    }
}

/// Post a quit message
pub fn post_quit() {
    unsafe {
        PostQuitMessage(0);
    }
}
