use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Sliding-window request throttle. VK allows a small number of API calls
/// per second per token; every call awaits `acquire` before going out.
#[derive(Debug)]
pub struct RequestThrottle {
    window: Duration,
    capacity: usize,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RequestThrottle {
    pub fn per_second(capacity: u32) -> Self {
        Self {
            window: Duration::from_secs(1),
            capacity: capacity.max(1) as usize,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until a request slot is free in the current window, then claim it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut stamps = self.timestamps.lock().await;
                let now = Instant::now();

                while let Some(front) = stamps.front() {
                    if now.duration_since(*front) >= self.window {
                        stamps.pop_front();
                    } else {
                        break;
                    }
                }

                if stamps.len() < self.capacity {
                    stamps.push_back(now);
                    return;
                }

                // Oldest stamp in the window decides when a slot opens.
                match stamps.front() {
                    Some(front) => self.window - now.duration_since(*front),
                    None => Duration::ZERO,
                }
            };

            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_within_capacity_is_immediate() {
        let throttle = RequestThrottle::per_second(3);
        let start = Instant::now();

        for _ in 0..3 {
            throttle.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_over_capacity_waits_for_window() {
        let throttle = RequestThrottle::per_second(2);
        let start = Instant::now();

        for _ in 0..3 {
            throttle.acquire().await;
        }

        // Third acquire must wait for the first slot to age out.
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slots_free_up_after_window() {
        let throttle = RequestThrottle::per_second(1);

        throttle.acquire().await;
        sleep(Duration::from_millis(1100)).await;

        let before = Instant::now();
        throttle.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let throttle = RequestThrottle::per_second(0);
        assert_eq!(throttle.capacity, 1);
    }
}
