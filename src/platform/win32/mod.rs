//! Win32 platform implementation

pub mod callbacks;
pub mod event;
pub mod platform;
pub mod window;

pub use event::{post_quit, run_message_loop};
pub use platform::{from_hwnd, to_hwnd, Win32Platform};
pub use window::{
    create_window, destroy_window, register_window_class, show_window, unregister_window_class,
    WM_APP_CLOSE_REQUEST,
};
