use std::time::Duration;

use crate::utils::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    /// The rendering host is still settling; nothing is interactive yet.
    Initializing,
    Ready,
}

/// One-shot grace period between mount and the first interactive frame.
#[derive(Debug)]
pub struct StartupTimer {
    mounted_at: Instant,
    grace: Duration,
    phase: StartupPhase,
}

impl StartupTimer {
    pub fn start(grace: Duration) -> Self {
        Self {
            mounted_at: Instant::now(),
            grace,
            phase: if grace.is_zero() {
                StartupPhase::Ready
            } else {
                StartupPhase::Initializing
            },
        }
    }

    pub fn phase(&self) -> StartupPhase {
        self.phase
    }

    /// Advances to `Ready` once the grace period is over. Never goes back.
    pub fn poll(&mut self) -> StartupPhase {
        if self.phase == StartupPhase::Initializing && self.mounted_at.elapsed() >= self.grace {
            log::info!("viewer ready after {:?}", self.mounted_at.elapsed());
            self.phase = StartupPhase::Ready;
        }
        self.phase
    }

    pub fn remaining(&self) -> Duration {
        match self.phase {
            StartupPhase::Ready => Duration::ZERO,
            StartupPhase::Initializing => self.grace.saturating_sub(self.mounted_at.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ready_after_grace() {
        let mut timer = StartupTimer::start(Duration::from_millis(800));
        assert_eq!(timer.poll(), StartupPhase::Initializing);
        tokio::time::sleep(Duration::from_millis(799)).await;
        assert_eq!(timer.poll(), StartupPhase::Initializing);
        assert_eq!(timer.remaining(), Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(timer.poll(), StartupPhase::Ready);
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[tokio::test]
    async fn zero_grace_is_ready_immediately() {
        let timer = StartupTimer::start(Duration::ZERO);
        assert_eq!(timer.phase(), StartupPhase::Ready);
    }
}
