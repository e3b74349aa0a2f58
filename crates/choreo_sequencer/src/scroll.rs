// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll source: document scroll lock and eased wheel scrolling.

use crate::config::SmoothScrollConfig;

/// Distance under which the eased offset snaps to its target
const SNAP_DISTANCE: f32 = 0.5;

/// Document scroll lock held by the loading screen
#[derive(Debug, Default, Clone)]
pub struct ScrollLock {
    locked: bool,
    releases: u32,
}

impl ScrollLock {
    /// Create an unlocked lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Block document scrolling
    pub fn lock(&mut self) {
        if !self.locked {
            tracing::debug!("document scroll locked");
        }
        self.locked = true;
    }

    /// Allow document scrolling. Returns true if this call unlocked it.
    pub fn release(&mut self) -> bool {
        if !self.locked {
            return false;
        }
        self.locked = false;
        self.releases += 1;
        tracing::debug!(releases = self.releases, "document scroll released");
        true
    }

    /// Whether scrolling is blocked
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of locked to unlocked transitions
    pub fn release_count(&self) -> u32 {
        self.releases
    }
}

/// Eased scroll offset following wheel input
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    current: f32,
    target: f32,
    limit: f32,
    config: SmoothScrollConfig,
}

impl SmoothScroll {
    /// Create at offset 0 with a maximum offset of `limit`
    pub fn new(config: SmoothScrollConfig, limit: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            limit: limit.max(0.0),
            config,
        }
    }

    /// Current eased offset
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Offset being approached
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Maximum offset
    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Whether the offset is still easing
    pub fn is_moving(&self) -> bool {
        self.current != self.target
    }

    /// Change the document limit, e.g. after a resize
    pub fn set_limit(&mut self, limit: f32) {
        self.limit = limit.max(0.0);
        self.target = self.target.min(self.limit);
        self.current = self.current.min(self.limit);
    }

    /// Feed a wheel delta. Ignored while `lock` is held.
    pub fn scroll_by(&mut self, delta: f32, lock: &ScrollLock) {
        if lock.is_locked() {
            return;
        }
        self.target = (self.target + delta * self.config.wheel_multiplier).clamp(0.0, self.limit);
    }

    /// Jump straight to an offset
    pub fn scroll_to(&mut self, offset: f32) {
        self.target = offset.clamp(0.0, self.limit);
        self.current = self.target;
    }

    /// Advance one frame and return the new offset
    pub fn tick(&mut self) -> f32 {
        let remaining = self.target - self.current;
        if remaining.abs() < SNAP_DISTANCE {
            self.current = self.target;
        } else {
            self.current += remaining * self.config.lerp.clamp(0.0, 1.0);
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_counts_transitions_only() {
        let mut lock = ScrollLock::new();
        assert!(!lock.release());
        lock.lock();
        lock.lock();
        assert!(lock.release());
        assert!(!lock.release());
        assert_eq!(lock.release_count(), 1);
    }

    #[test]
    fn wheel_input_is_ignored_while_locked() {
        let mut lock = ScrollLock::new();
        let mut scroll = SmoothScroll::new(SmoothScrollConfig::default(), 5000.0);
        lock.lock();
        scroll.scroll_by(300.0, &lock);
        assert_eq!(scroll.target(), 0.0);
        lock.release();
        scroll.scroll_by(300.0, &lock);
        assert_eq!(scroll.target(), 300.0);
    }

    #[test]
    fn eases_towards_target_and_snaps() {
        let lock = ScrollLock::new();
        let mut scroll = SmoothScroll::new(SmoothScrollConfig::default(), 5000.0);
        scroll.scroll_by(100.0, &lock);
        assert!((scroll.tick() - 10.0).abs() < 1e-4);

        let mut last = scroll.current();
        for _ in 0..200 {
            let now = scroll.tick();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(scroll.current(), 100.0);
        assert!(!scroll.is_moving());
    }

    #[test]
    fn target_is_clamped_to_document() {
        let lock = ScrollLock::new();
        let mut scroll = SmoothScroll::new(SmoothScrollConfig::default(), 1000.0);
        scroll.scroll_by(-50.0, &lock);
        assert_eq!(scroll.target(), 0.0);
        scroll.scroll_by(4000.0, &lock);
        assert_eq!(scroll.target(), 1000.0);
        scroll.set_limit(600.0);
        assert_eq!(scroll.target(), 600.0);
    }

    #[test]
    fn scroll_to_jumps_without_easing() {
        let mut scroll = SmoothScroll::new(SmoothScrollConfig::default(), 1000.0);
        scroll.scroll_to(400.0);
        assert_eq!(scroll.current(), 400.0);
        assert!(!scroll.is_moving());
        assert_eq!(scroll.tick(), 400.0);
        scroll.scroll_to(2000.0);
        assert_eq!(scroll.current(), 1000.0);
    }
}
