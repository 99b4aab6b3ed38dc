//! Process and thread identity used when stamping records
//!
//! Thread ids are small integers handed out from a process-wide counter the
//! first time a thread logs, then cached thread-locally.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID_CACHE: Cell<u64> = const { Cell::new(0) };
}

/// Identifier of the calling thread, stable for the thread's lifetime
pub fn thread_id() -> u64 {
    THREAD_ID_CACHE.with(|cache| {
        let cached = cache.get();
        if cached != 0 {
            return cached;
        }
        let id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
        cache.set(id);
        id
    })
}

#[inline]
pub fn process_id() -> u32 {
    std::process::id()
}

/// Stem of the running executable, `"app"` when it cannot be determined
pub fn application_name() -> &'static str {
    static NAME: OnceLock<String> = OnceLock::new();
    NAME.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "app".to_string())
    })
}

/// Directory containing the running executable, falling back to the current directory
pub fn application_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `<exe dir>/log/<app>.log`
pub fn default_log_path() -> PathBuf {
    application_dir()
        .join("log")
        .join(format!("{}.log", application_name()))
}
