use std::time::Instant;

use tracing::info;

/// Guard that logs how long a scope took when dropped. Disabled guards cost a
/// single branch on drop.
pub struct ScopedTimer {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl ScopedTimer {
    pub fn new(label: &'static str, enabled: bool) -> Self {
        Self { label, start: Instant::now(), enabled }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if self.enabled {
            info!("{} took {:.4}s", self.label, self.start.elapsed().as_secs_f64());
        }
    }
}

// ── Tests ──
