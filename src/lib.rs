pub mod fs;
pub mod graph;
pub mod progress;
pub mod pyenv;
pub mod recipe;
pub mod run;
mod signal;
pub mod task;
pub mod trace;
pub mod work;

#[cfg(not(any(windows, target_arch = "wasm32")))]
use jemallocator::Jemalloc;

#[cfg(not(any(windows, target_arch = "wasm32")))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;
