use std::future::Future;
use std::time::Duration;

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub use web_time::Instant;

        /// Yields to the browser for at least `duration`.
        pub async fn sleep(duration: Duration) {
            gloo_timers::future::sleep(duration).await;
        }

        /// Yields until `deadline`, returning at once if it has passed.
        pub async fn sleep_until(deadline: Instant) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !remaining.is_zero() {
                gloo_timers::future::sleep(remaining).await;
            }
        }

        /// Runs `future` on the browser's event loop.
        pub fn spawn_local<F: Future<Output = ()> + 'static>(future: F) {
            wasm_bindgen_futures::spawn_local(future);
        }
    } else {
        // tokio's clock so paused-time tests see timers advance
        pub use tokio::time::Instant;

        pub async fn sleep(duration: Duration) {
            tokio::time::sleep(duration).await;
        }

        pub async fn sleep_until(deadline: Instant) {
            tokio::time::sleep_until(deadline).await;
        }

        /// Runs `future` on the current `LocalSet`.
        ///
        /// Must be called from inside `LocalSet::run_until` (or a task spawned on one).
        pub fn spawn_local<F: Future<Output = ()> + 'static>(future: F) {
            tokio::task::spawn_local(future);
        }
    }
}

/// Lower-cased file extension of the last path segment, without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
