//! Interrupt Handling
//!
//! SIGINT and SIGTERM set a flag instead of killing the process. The
//! executor checks it between trials, so the trial in flight finishes and
//! the partial results are still rendered. A second signal exits at once.

use std::sync::atomic::{AtomicBool, Ordering};

/// Set once an interrupt has been received
pub static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install the SIGINT/SIGTERM handlers and return the flag they set.
#[cfg(unix)]
pub fn install() -> &'static AtomicBool {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = interrupt_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut sa.sa_mask);
        libc::sigaction(libc::SIGINT, &sa, std::ptr::null_mut());
        libc::sigaction(libc::SIGTERM, &sa, std::ptr::null_mut());
    }
    &INTERRUPTED
}

#[cfg(unix)]
extern "C" fn interrupt_handler(_sig: libc::c_int) {
    if INTERRUPTED.swap(true, Ordering::Relaxed) {
        // 128 + SIGINT
        unsafe { libc::_exit(130) };
    }
}

/// No-op on non-Unix; the flag is never set.
#[cfg(not(unix))]
pub fn install() -> &'static AtomicBool {
    &INTERRUPTED
}
