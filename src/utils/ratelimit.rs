/// Sliding-window limiter for image renders, shared through `AppState`
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::utils::errors::ReceiptError;

pub struct RenderRateLimiter {
    inner: Mutex<Window>,
}

struct Window {
    /// Timestamps of renders admitted within the window
    request_times: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl Window {
    fn check_and_record(&mut self, now: Instant) -> Duration {
        // Drop timestamps that left the window
        while let Some(&front) = self.request_times.front() {
            if now.duration_since(front) >= self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        if self.request_times.len() >= self.max_requests {
            if let Some(&oldest) = self.request_times.front() {
                return self.window - now.duration_since(oldest);
            }
        }

        self.request_times.push_back(now);
        Duration::ZERO
    }
}

impl RenderRateLimiter {
    pub fn new(max_per_second: usize) -> Self {
        Self::with_window(max_per_second, Duration::from_secs(1))
    }

    pub fn with_window(max_requests: usize, window: Duration) -> Self {
        Self {
            inner: Mutex::new(Window {
                request_times: VecDeque::new(),
                max_requests: max_requests.max(1),
                window,
            }),
        }
    }

    /// Admit one render or report how long the caller should wait
    pub fn acquire(&self) -> Result<(), ReceiptError> {
        let wait = {
            let mut window = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            window.check_and_record(Instant::now())
        };

        if wait.is_zero() {
            Ok(())
        } else {
            tracing::debug!("Render rate limit hit, retry in {}ms", wait.as_millis());
            Err(ReceiptError::RateLimited {
                retry_after_ms: (wait.as_millis() as u64).max(1),
            })
        }
    }
}
