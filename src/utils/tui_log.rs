//! Keep log output off the screen while the terminal UI owns it
//!
//! Writing to stderr while the alternate screen is active corrupts the
//! display, so the fmt layer is wrapped in `QuietWhileTui` and the UI holds a
//! `ScreenGuard` for as long as it runs.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

static SCREEN_OWNED: AtomicBool = AtomicBool::new(false);

/// Whether the terminal UI currently owns the screen
pub fn screen_owned() -> bool {
    SCREEN_OWNED.load(Ordering::SeqCst)
}

/// Marks the screen as owned by the UI until dropped
///
/// Dropping restores logging on every exit path, including errors while the
/// terminal is being set up.
#[derive(Debug)]
pub struct ScreenGuard {
    previous: bool,
}

impl ScreenGuard {
    pub fn acquire() -> Self {
        let previous = SCREEN_OWNED.swap(true, Ordering::SeqCst);
        Self { previous }
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        SCREEN_OWNED.store(self.previous, Ordering::SeqCst);
    }
}

/// Layer that forwards to `inner` only while no UI owns the screen
pub struct QuietWhileTui<L> {
    inner: L,
}

impl<L> QuietWhileTui<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

impl<S, L> Layer<S> for QuietWhileTui<L>
where
    S: tracing::Subscriber,
    L: Layer<S>,
{
    // Span bookkeeping always reaches the inner layer so spans opened while
    // the screen is owned are still known once output resumes.
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: Context<'_, S>,
    ) {
        self.inner.on_new_span(attrs, id, ctx);
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        ctx: Context<'_, S>,
    ) {
        self.inner.on_record(id, values, ctx);
    }

    fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
        self.inner.on_close(id, ctx);
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        if !screen_owned() {
            self.inner.on_event(event, ctx);
        }
    }

    fn on_enter(&self, id: &tracing::span::Id, ctx: Context<'_, S>) {
        if !screen_owned() {
            self.inner.on_enter(id, ctx);
        }
    }

    fn on_exit(&self, id: &tracing::span::Id, ctx: Context<'_, S>) {
        if !screen_owned() {
            self.inner.on_exit(id, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restores_on_drop() {
        assert!(!screen_owned());
        {
            let _outer = ScreenGuard::acquire();
            assert!(screen_owned());
            {
                let _inner = ScreenGuard::acquire();
                assert!(screen_owned());
            }
            assert!(screen_owned());
        }
        assert!(!screen_owned());
    }
}
