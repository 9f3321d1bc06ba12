//! hwnd-intercept - demo host
//!
//! Creates a window, registers it with a device that traces every message and
//! forwards it to the window's own procedure, then runs the message loop until
//! the window is closed.

#[cfg(target_os = "windows")]
fn main() {
    if let Err(e) = host::run() {
        eprintln!("hwnd-intercept: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "windows"))]
fn main() {
    eprintln!("hwnd-intercept: the demo host requires Windows");
    std::process::exit(1);
}

#[cfg(target_os = "windows")]
mod host {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tracing::{debug, info, warn};

    use hwnd_intercept::application::ports::WindowPlatform;
    use hwnd_intercept::platform::win32::{self, Win32Platform, WM_APP_CLOSE_REQUEST};
    use hwnd_intercept::{
        CompositionRoot, InterceptConfig, Message, MessageDevice, ProcedureRef, TextEncoding,
        WindowHandle,
    };

    /// Logs every message and lets the window's own procedure answer it
    struct TracingDevice {
        platform: Win32Platform,
        messages: AtomicUsize,
    }

    impl MessageDevice for TracingDevice {
        fn handle_message(
            &self,
            window: WindowHandle,
            encoding: TextEncoding,
            message: Message,
            fallback: Option<ProcedureRef>,
        ) -> isize {
            self.messages.fetch_add(1, Ordering::Relaxed);
            debug!("Device got {:#06x} for {window} ({encoding:?})", message.id);

            match fallback {
                Some(procedure) => self.platform.call_procedure(procedure, window, encoding, message),
                // hook strategy: the window procedure still runs after us
                None => 0,
            }
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let config = InterceptConfig::load();
        let log_path = hwnd_intercept::log::init(&config.log)?;
        info!("Logging to {}", log_path.display());

        let root = CompositionRoot::win32(config);
        root.start()?;

        win32::register_window_class()?;
        let hwnd = win32::create_window("hwnd-intercept")?;
        let window = win32::from_hwnd(hwnd);

        let tracer = Arc::new(TracingDevice {
            platform: Win32Platform::new(),
            messages: AtomicUsize::new(0),
        });
        let device: Arc<dyn MessageDevice> = tracer.clone();
        root.interceptor().register(window, &device)?;
        win32::show_window(hwnd);

        win32::run_message_loop(|msg| {
            if msg.message == WM_APP_CLOSE_REQUEST {
                if let Err(e) = root.interceptor().unregister(window) {
                    warn!("Closing window {window}: {e}");
                }
                win32::destroy_window(hwnd);
            }
            true
        });

        info!(
            "Device handled {} messages",
            tracer.messages.load(Ordering::Relaxed)
        );
        root.shutdown();
        win32::callbacks::withdraw();
        win32::unregister_window_class();
        Ok(())
    }
}
