use std::time::Duration;

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    time::Instant,
};
use tracing::{debug, info};

pub const BUTTON_CHANNEL_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSource {
    Stdin,
    Http,
}

#[derive(Debug, Clone, Copy)]
pub struct ButtonPress {
    pub source: ButtonSource,
    pub at: Instant,
}

impl ButtonPress {
    pub fn now(source: ButtonSource) -> Self {
        Self {
            source,
            at: Instant::now(),
        }
    }
}

/// 12 → 14 → 16 → 12. Anything unexpected restarts the cycle at 12.
pub fn next_font_size(current: u32) -> u32 {
    match current {
        12 => 14,
        14 => 16,
        _ => 12,
    }
}

/// Drops presses that arrive within `window` of the last accepted one.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn accept(&mut self, at: Instant) -> bool {
        match self.last {
            Some(last) if at.saturating_duration_since(last) <= self.window => false,
            _ => {
                self.last = Some(at);
                true
            }
        }
    }
}

/// Filters raw presses and forwards accepted ones. The ticker loop is the only
/// consumer, so it alone mutates font size.
pub fn spawn_debouncer(
    mut raw: mpsc::Receiver<ButtonPress>,
    window: Duration,
) -> mpsc::Receiver<ButtonPress> {
    let (tx, rx) = mpsc::channel(BUTTON_CHANNEL_SIZE);
    tokio::spawn(async move {
        let mut debouncer = Debouncer::new(window);
        while let Some(press) = raw.recv().await {
            if !debouncer.accept(press.at) {
                debug!(source = ?press.source, "button press debounced");
                continue;
            }
            if tx.send(press).await.is_err() {
                break;
            }
        }
    });
    rx
}

/// Every line read from stdin counts as one press.
pub fn spawn_stdin_button(tx: mpsc::Sender<ButtonPress>) {
    tokio::spawn(async move {
        info!("press Enter to cycle the font size");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            if tx.send(ButtonPress::now(ButtonSource::Stdin)).await.is_err() {
                break;
            }
        }
        debug!("stdin button reader finished");
    });
}
