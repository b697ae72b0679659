//! Lightbox navigation state machine
//!
//! `Closed` / `Open(index)` over the photos a gallery currently shows.
//! The lightbox never stores the photo list; every transition receives the
//! current length and re-validates its index against it first.
//!
//! While open, the presentation layer's background scroll is locked and the
//! keyboard listener is attached. Both are guards owned by the open state,
//! so leaving `Open` by any path releases them exactly once.

use serde::Serialize;
use std::sync::Arc;

use crate::events::{
    EventSinkExt, SharedEventSink, LIGHTBOX_CHANGED, LIGHTBOX_KEY_LISTENER, LIGHTBOX_SCROLL_LOCK,
};
use crate::utils::error::{AppError, AppResult};

pub const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

/// Presentation-side resources the lightbox holds while open.
pub trait LightboxHost: Send + Sync {
    fn lock_scroll(&self);
    fn unlock_scroll(&self);
    fn attach_key_listener(&self);
    fn detach_key_listener(&self);
}

/// Shared reference to a LightboxHost implementation.
pub type SharedLightboxHost = Arc<dyn LightboxHost>;

/// Host for headless use.
#[derive(Debug, Clone, Default)]
pub struct NoOpLightboxHost;

impl LightboxHost for NoOpLightboxHost {
    fn lock_scroll(&self) {}
    fn unlock_scroll(&self) {}
    fn attach_key_listener(&self) {}
    fn detach_key_listener(&self) {}
}

#[derive(Serialize)]
struct ScrollLockPayload {
    locked: bool,
}

#[derive(Serialize)]
struct KeyListenerPayload {
    attached: bool,
}

/// Host that forwards resource changes as events.
pub struct EventLightboxHost {
    events: SharedEventSink,
}

impl EventLightboxHost {
    pub fn new(events: SharedEventSink) -> Self {
        Self { events }
    }
}

impl LightboxHost for EventLightboxHost {
    fn lock_scroll(&self) {
        self.events
            .emit_typed(LIGHTBOX_SCROLL_LOCK, &ScrollLockPayload { locked: true });
    }

    fn unlock_scroll(&self) {
        self.events
            .emit_typed(LIGHTBOX_SCROLL_LOCK, &ScrollLockPayload { locked: false });
    }

    fn attach_key_listener(&self) {
        self.events
            .emit_typed(LIGHTBOX_KEY_LISTENER, &KeyListenerPayload { attached: true });
    }

    fn detach_key_listener(&self) {
        self.events
            .emit_typed(LIGHTBOX_KEY_LISTENER, &KeyListenerPayload { attached: false });
    }
}

/// Background scroll suppression, released on drop.
pub struct ScrollLock {
    host: SharedLightboxHost,
}

impl ScrollLock {
    pub fn acquire(host: SharedLightboxHost) -> Self {
        host.lock_scroll();
        Self { host }
    }
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.host.unlock_scroll();
    }
}

/// Attached keyboard listener, detached on drop.
pub struct KeyListener {
    host: SharedLightboxHost,
}

impl KeyListener {
    pub fn attach(host: SharedLightboxHost) -> Self {
        host.attach_key_listener();
        Self { host }
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.host.detach_key_listener();
    }
}

/// Animation hint for the last transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Backward,
    #[default]
    None,
    Forward,
}

impl Direction {
    pub fn as_i8(self) -> i8 {
        match self {
            Direction::Backward => -1,
            Direction::None => 0,
            Direction::Forward => 1,
        }
    }

    fn between(from: usize, to: usize) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Less => Direction::Backward,
            std::cmp::Ordering::Equal => Direction::None,
            std::cmp::Ordering::Greater => Direction::Forward,
        }
    }
}

/// Keys the lightbox reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl NavKey {
    /// Map a DOM-style key name.
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => NavKey::Escape,
            "ArrowLeft" | "Left" => NavKey::ArrowLeft,
            "ArrowRight" | "Right" => NavKey::ArrowRight,
            _ => NavKey::Other,
        }
    }
}

/// Observable lightbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LightboxState {
    pub is_open: bool,
    pub current_index: Option<usize>,
    pub pending_direction: i8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightboxConfig {
    pub swipe_threshold: f32,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
        }
    }
}

struct OpenState {
    index: usize,
    direction: Direction,
    _scroll: ScrollLock,
    _keys: KeyListener,
}

pub struct Lightbox {
    host: SharedLightboxHost,
    events: SharedEventSink,
    config: LightboxConfig,
    open: Option<OpenState>,
    touch_start: Option<(f32, f32)>,
    drag_offset: f32,
}

impl Lightbox {
    pub fn new(host: SharedLightboxHost, events: SharedEventSink, config: LightboxConfig) -> Self {
        Self {
            host,
            events,
            config,
            open: None,
            touch_start: None,
            drag_offset: 0.0,
        }
    }

    pub fn state(&self) -> LightboxState {
        match &self.open {
            Some(open) => LightboxState {
                is_open: true,
                current_index: Some(open.index),
                pending_direction: open.direction.as_i8(),
            },
            None => LightboxState::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Index to render for a collection of `len` photos, clamped into range.
    pub fn visible_index(&self, len: usize) -> Option<usize> {
        match &self.open {
            Some(open) if len > 0 => Some(open.index.min(len - 1)),
            _ => None,
        }
    }

    /// Adapt to a new collection length. Returns true if this closed the lightbox.
    pub fn sync_to_len(&mut self, len: usize) -> bool {
        let Some(open) = &self.open else {
            return false;
        };
        if len > 0 && open.index < len {
            return false;
        }

        tracing::info!(index = open.index, len, "Collection shrank under the lightbox, closing");
        self.open = None;
        self.reset_gestures();
        self.publish();
        true
    }

    pub fn open(&mut self, index: usize, len: usize) -> AppResult<LightboxState> {
        if index >= len {
            return Err(AppError::InvalidNavigation { index, len });
        }

        match &mut self.open {
            Some(open) => {
                open.index = index;
                open.direction = Direction::None;
            }
            None => {
                self.open = Some(OpenState {
                    index,
                    direction: Direction::None,
                    _scroll: ScrollLock::acquire(self.host.clone()),
                    _keys: KeyListener::attach(self.host.clone()),
                });
            }
        }

        tracing::debug!(index, len, "Lightbox opened");
        self.publish();
        Ok(self.state())
    }

    pub fn close(&mut self) -> LightboxState {
        if self.open.take().is_some() {
            self.reset_gestures();
            tracing::debug!("Lightbox closed");
            self.publish();
        }
        self.state()
    }

    pub fn next(&mut self, len: usize) -> LightboxState {
        self.step(len, Direction::Forward)
    }

    pub fn prev(&mut self, len: usize) -> LightboxState {
        self.step(len, Direction::Backward)
    }

    fn step(&mut self, len: usize, direction: Direction) -> LightboxState {
        self.sync_to_len(len);
        let Some(open) = &mut self.open else {
            return self.state();
        };

        open.index = match direction {
            Direction::Forward => (open.index + 1) % len,
            Direction::Backward => (open.index + len - 1) % len,
            Direction::None => open.index,
        };
        open.direction = direction;

        self.publish();
        self.state()
    }

    /// Go straight to `index`. Ignored while closed.
    pub fn jump(&mut self, index: usize, len: usize) -> AppResult<LightboxState> {
        if index >= len {
            return Err(AppError::InvalidNavigation { index, len });
        }
        self.sync_to_len(len);
        let Some(open) = &mut self.open else {
            return Ok(self.state());
        };

        open.direction = Direction::between(open.index, index);
        open.index = index;

        self.publish();
        Ok(self.state())
    }

    pub fn handle_key(&mut self, key: NavKey, len: usize) -> LightboxState {
        if self.open.is_none() {
            return self.state();
        }
        match key {
            NavKey::Escape => self.close(),
            NavKey::ArrowRight => self.next(len),
            NavKey::ArrowLeft => self.prev(len),
            NavKey::Other => self.state(),
        }
    }

    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.touch_start = Some((x, y));
    }

    /// Finish a swipe. Only the horizontal displacement counts.
    pub fn touch_end(&mut self, x: f32, _y: f32, len: usize) -> LightboxState {
        let Some((start_x, _start_y)) = self.touch_start.take() else {
            return self.state();
        };
        self.navigate_by_offset(x - start_x, len)
    }

    pub fn drag_move(&mut self, dx: f32) {
        if self.open.is_some() {
            self.drag_offset += dx;
        }
    }

    pub fn drag_end(&mut self, len: usize) -> LightboxState {
        let offset = std::mem::take(&mut self.drag_offset);
        self.navigate_by_offset(offset, len)
    }

    fn navigate_by_offset(&mut self, dx: f32, len: usize) -> LightboxState {
        if self.open.is_none() {
            return self.state();
        }
        let threshold = self.config.swipe_threshold;
        if dx < -threshold {
            self.next(len)
        } else if dx > threshold {
            self.prev(len)
        } else {
            self.state()
        }
    }

    fn reset_gestures(&mut self) {
        self.touch_start = None;
        self.drag_offset = 0.0;
    }

    fn publish(&self) {
        self.events.emit_typed(LIGHTBOX_CHANGED, &self.state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoOpEventSink;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Default)]
    struct CountingHost {
        scroll_locks: AtomicI32,
        key_listeners: AtomicI32,
    }

    impl LightboxHost for CountingHost {
        fn lock_scroll(&self) {
            self.scroll_locks.fetch_add(1, Ordering::SeqCst);
        }
        fn unlock_scroll(&self) {
            self.scroll_locks.fetch_sub(1, Ordering::SeqCst);
        }
        fn attach_key_listener(&self) {
            self.key_listeners.fetch_add(1, Ordering::SeqCst);
        }
        fn detach_key_listener(&self) {
            self.key_listeners.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn lightbox() -> (Lightbox, Arc<CountingHost>) {
        let host = Arc::new(CountingHost::default());
        let lb = Lightbox::new(host.clone(), Arc::new(NoOpEventSink), LightboxConfig::default());
        (lb, host)
    }

    #[test]
    fn test_open_rejects_out_of_range() {
        let (mut lb, host) = lightbox();
        assert!(matches!(
            lb.open(0, 0),
            Err(AppError::InvalidNavigation { index: 0, len: 0 })
        ));
        assert!(lb.open(5, 5).is_err());
        assert!(!lb.is_open());
        assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_next_wraps_and_prev_wraps() {
        let (mut lb, _) = lightbox();
        lb.open(4, 5).unwrap();
        assert_eq!(lb.next(5).current_index, Some(0));
        let state = lb.prev(5);
        assert_eq!(state.current_index, Some(4));
        assert_eq!(state.pending_direction, -1);
    }

    #[test]
    fn test_circularity_and_inverse() {
        let len = 7;
        for start in 0..len {
            let (mut lb, _) = lightbox();
            lb.open(start, len).unwrap();
            for _ in 0..len {
                lb.next(len);
            }
            assert_eq!(lb.state().current_index, Some(start));

            lb.next(len);
            assert_eq!(lb.prev(len).current_index, Some(start));
        }
    }

    #[test]
    fn test_single_photo_stays_put() {
        let (mut lb, _) = lightbox();
        lb.open(0, 1).unwrap();
        let state = lb.next(1);
        assert_eq!(state.current_index, Some(0));
        assert_eq!(state.pending_direction, 1);
        assert_eq!(lb.prev(1).current_index, Some(0));
    }

    #[test]
    fn test_jump_direction() {
        let (mut lb, _) = lightbox();
        lb.open(3, 6).unwrap();
        assert_eq!(lb.jump(1, 6).unwrap().pending_direction, -1);
        assert_eq!(lb.jump(5, 6).unwrap().pending_direction, 1);
        assert_eq!(lb.jump(5, 6).unwrap().pending_direction, 0);
        assert!(lb.jump(6, 6).is_err());
        assert_eq!(lb.state().current_index, Some(5));
    }

    #[test]
    fn test_keys_only_while_open() {
        let (mut lb, _) = lightbox();
        assert!(!lb.handle_key(NavKey::ArrowRight, 3).is_open);

        lb.open(0, 3).unwrap();
        assert_eq!(lb.handle_key(NavKey::ArrowRight, 3).current_index, Some(1));
        assert_eq!(lb.handle_key(NavKey::ArrowLeft, 3).current_index, Some(0));
        assert_eq!(lb.handle_key(NavKey::Other, 3).current_index, Some(0));
        assert!(!lb.handle_key(NavKey::Escape, 3).is_open);
    }

    #[test]
    fn test_resources_released_on_every_exit() {
        let (mut lb, host) = lightbox();

        lb.open(0, 3).unwrap();
        lb.open(2, 3).unwrap();
        assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 1);
        assert_eq!(host.key_listeners.load(Ordering::SeqCst), 1);

        lb.handle_key(NavKey::Escape, 3);
        assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 0);
        assert_eq!(host.key_listeners.load(Ordering::SeqCst), 0);

        lb.open(1, 3).unwrap();
        lb.sync_to_len(0);
        assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 0);

        lb.open(1, 3).unwrap();
        drop(lb);
        assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 0);
        assert_eq!(host.key_listeners.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shrink_below_index_force_closes() {
        let (mut lb, host) = lightbox();
        lb.open(2, 5).unwrap();
        assert!(!lb.sync_to_len(3));
        assert!(lb.sync_to_len(2));
        assert!(!lb.is_open());
        assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_visible_index_clamps() {
        let (mut lb, _) = lightbox();
        lb.open(4, 5).unwrap();
        assert_eq!(lb.visible_index(3), Some(2));
        assert_eq!(lb.visible_index(0), None);
    }

    #[test]
    fn test_swipe_threshold() {
        let (mut lb, _) = lightbox();
        lb.open(2, 5).unwrap();

        lb.touch_start(100.0, 100.0);
        assert_eq!(lb.touch_end(70.0, 300.0, 5).current_index, Some(2));

        lb.touch_start(100.0, 100.0);
        assert_eq!(lb.touch_end(50.0, 100.0, 5).current_index, Some(2));

        lb.touch_start(100.0, 100.0);
        assert_eq!(lb.touch_end(40.0, 100.0, 5).current_index, Some(3));

        lb.touch_start(100.0, 100.0);
        assert_eq!(lb.touch_end(160.0, 100.0, 5).current_index, Some(2));
    }

    #[test]
    fn test_drag_checked_at_release() {
        let (mut lb, _) = lightbox();
        lb.open(0, 4).unwrap();

        lb.drag_move(-30.0);
        lb.drag_move(-30.0);
        assert_eq!(lb.state().current_index, Some(0));
        assert_eq!(lb.drag_end(4).current_index, Some(1));

        lb.drag_move(80.0);
        lb.drag_move(-40.0);
        assert_eq!(lb.drag_end(4).current_index, Some(1));
    }

    #[test]
    fn test_custom_threshold() {
        let host = Arc::new(CountingHost::default());
        let mut lb = Lightbox::new(
            host,
            Arc::new(NoOpEventSink),
            LightboxConfig {
                swipe_threshold: 20.0,
            },
        );
        lb.open(0, 3).unwrap();
        lb.touch_start(0.0, 0.0);
        assert_eq!(lb.touch_end(-30.0, 0.0, 3).current_index, Some(1));
    }

    #[test]
    fn test_nav_key_names() {
        assert_eq!(NavKey::from_key_name("Escape"), NavKey::Escape);
        assert_eq!(NavKey::from_key_name("ArrowLeft"), NavKey::ArrowLeft);
        assert_eq!(NavKey::from_key_name("ArrowRight"), NavKey::ArrowRight);
        assert_eq!(NavKey::from_key_name("Enter"), NavKey::Other);
    }
}
