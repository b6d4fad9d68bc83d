use std::{
    io::Write,
    sync::{Arc, RwLock, RwLockReadGuard},
};

use chrono::Utc;

use crate::model::ScreenOut;

/// The rendering collaborator. Layout, wrapping and paging belong to implementors.
pub trait Display: Send {
    fn clear(&mut self);
    fn draw_text(&mut self, text: &str, font_size: u32);
    /// Short overlay drawn over the current frame, e.g. `font:16px`.
    fn status(&mut self, text: &str);
    /// Activity indicator while a feed is being fetched.
    fn busy(&mut self, _on: bool) {}
}

/// Writes frames to stdout.
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    fn write(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(err) = writeln!(out, "{text}") {
            tracing::warn!(error = %err, "failed to write to console display");
        }
    }
}

impl Display for ConsoleDisplay {
    fn clear(&mut self) {
        self.write("────────────────");
    }

    fn draw_text(&mut self, text: &str, font_size: u32) {
        tracing::trace!(font_size, "console frame");
        self.write(text);
    }

    fn status(&mut self, text: &str) {
        self.write(&format!("[{text}]"));
    }
}

/// The current frame, readable from the HTTP API.
#[derive(Debug, Clone, Default)]
pub struct SharedScreen(Arc<RwLock<ScreenOut>>);

impl SharedScreen {
    pub fn snapshot(&self) -> ScreenOut {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, ScreenOut> {
        match self.0.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut ScreenOut)) {
        let mut guard = match self.0.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut *guard);
        guard.updated_at = Some(Utc::now().to_rfc3339());
    }
}

/// Forwards to `inner` and mirrors every frame into a [`SharedScreen`].
pub struct Mirrored<D> {
    inner: D,
    screen: SharedScreen,
}

impl<D: Display> Mirrored<D> {
    pub fn new(inner: D, screen: SharedScreen) -> Self {
        Self { inner, screen }
    }
}

impl<D: Display> Display for Mirrored<D> {
    fn clear(&mut self) {
        self.inner.clear();
        self.screen.update(|s| {
            s.text.clear();
            s.status = None;
        });
    }

    fn draw_text(&mut self, text: &str, font_size: u32) {
        self.inner.draw_text(text, font_size);
        self.screen.update(|s| {
            if !s.text.is_empty() {
                s.text.push('\n');
            }
            s.text.push_str(text);
            s.font_size = font_size;
        });
    }

    fn status(&mut self, text: &str) {
        self.inner.status(text);
        self.screen.update(|s| s.status = Some(text.to_string()));
    }

    fn busy(&mut self, on: bool) {
        self.inner.busy(on);
        self.screen.update(|s| s.fetching = on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Blank;

    impl Display for Blank {
        fn clear(&mut self) {}
        fn draw_text(&mut self, _text: &str, _font_size: u32) {}
        fn status(&mut self, _text: &str) {}
    }

    #[test]
    fn mirror_tracks_latest_frame() {
        let screen = SharedScreen::default();
        let mut display = Mirrored::new(Blank, screen.clone());

        display.clear();
        display.draw_text("first", 12);
        display.status("font:14px");
        display.clear();
        display.draw_text("second", 14);
        display.draw_text("line", 14);

        let snapshot = screen.snapshot();
        assert_eq!(snapshot.text, "second\nline");
        assert_eq!(snapshot.font_size, 14);
        assert_eq!(snapshot.status, None);
        assert!(snapshot.updated_at.is_some());
    }

    #[test]
    fn busy_flag_is_mirrored() {
        let screen = SharedScreen::default();
        let mut display = Mirrored::new(Blank, screen.clone());
        display.busy(true);
        assert!(screen.snapshot().fetching);
        display.busy(false);
        assert!(!screen.snapshot().fetching);
    }
}
