//! Unix signal handling (SIGINT).
//!
//! We let the first SIGINT reach child processes, which fail their step and
//! let the build record the interrupted task; a flag is set so no further
//! step starts.  The handler then restores the default disposition, so a
//! second SIGINT kills the build outright.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

fn sigint_action(handler: libc::sighandler_t) {
    // Safety: registering a signal handler is libc unsafe code.
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler;
        libc::sigaction(libc::SIGINT, &sa, std::ptr::null_mut());
    }
}

extern "C" fn sigint_handler(_sig: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
    sigint_action(libc::SIG_DFL as libc::sighandler_t);
}

pub fn register_sigint() {
    sigint_action(sigint_handler as libc::sighandler_t);
}

/// Whether a SIGINT has arrived since startup.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
