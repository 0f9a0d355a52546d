//! Frame scheduling.
//!
//! A [`FrameScheduler`] owns an explicit, priority-ordered list of per-frame
//! callbacks. Each [`tick`](FrameScheduler::tick) runs every callback exactly
//! once, lowest priority first; callbacks with equal priority run in the
//! order they were registered. There is no threading: the owner drives
//! ticks from its redraw callback.

mod clock;

pub use clock::FrameClock;

/// Timing information handed to every handler during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Seconds since the previous tick.
    pub delta: f64,
    /// Number of ticks before this one.
    pub frame: u64,
}

/// Opaque registration handle returned by [`FrameScheduler::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Callback<C> = Box<dyn FnMut(&mut C, &FrameState)>;

struct Entry<C> {
    id: HandlerId,
    name: &'static str,
    priority: i32,
    callback: Callback<C>,
}

/// Ordered list of per-frame callbacks operating on a context `C`.
pub struct FrameScheduler<C> {
    entries: Vec<Entry<C>>,
    next_id: u64,
}

impl<C> Default for FrameScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FrameScheduler<C> {
    /// Scheduler with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Register `callback` to run once per tick at `priority`.
    ///
    /// Handlers with lower priority run earlier in the tick.
    pub fn register<F>(
        &mut self,
        name: &'static str,
        priority: i32,
        callback: F,
    ) -> HandlerId
    where
        F: FnMut(&mut C, &FrameState) + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        // Insert after every entry of equal priority so ties keep
        // registration order.
        let at = self.entries.partition_point(|e| e.priority <= priority);
        self.entries.insert(
            at,
            Entry {
                id,
                name,
                priority,
                callback: Box::new(callback),
            },
        );
        log::debug!("registered frame handler '{name}' (priority {priority})");
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.entries.remove(index);
        log::debug!("unregistered frame handler '{}'", entry.name);
        true
    }

    /// Run every handler once, in ascending priority order.
    pub fn tick(&mut self, ctx: &mut C, frame: &FrameState) {
        for entry in &mut self.entries {
            (entry.callback)(ctx, frame);
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, priority)` of every handler, in execution order.
    #[must_use]
    pub fn handlers(&self) -> Vec<(&'static str, i32)> {
        self.entries.iter().map(|e| (e.name, e.priority)).collect()
    }
}
