use std::time::Duration;

use tokio::{
    sync::mpsc,
    time::{sleep_until, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    config::{DisplayConfig, SiteConfig},
    feed::extract,
    fetcher::FeedSource,
    repo::settings::SettingsStore,
    service::{
        display::Display,
        input::{next_font_size, ButtonPress},
    },
};

/// Cycles through the configured sites forever, showing every item of each.
pub struct Ticker<S, D> {
    sites: Vec<SiteConfig>,
    source: S,
    display: D,
    store: SettingsStore,
    buttons: mpsc::Receiver<ButtonPress>,
    timing: DisplayConfig,
    font_size: u32,
}

impl<S: FeedSource, D: Display> Ticker<S, D> {
    pub async fn new(
        sites: Vec<SiteConfig>,
        source: S,
        display: D,
        store: SettingsStore,
        buttons: mpsc::Receiver<ButtonPress>,
        timing: DisplayConfig,
    ) -> Self {
        let font_size = store.read_font_size().await;
        Self {
            sites,
            source,
            display,
            store,
            buttons,
            timing,
            font_size,
        }
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub async fn run(mut self) {
        let last = self.sites.len().saturating_sub(1);
        let mut start = self.store.read_current_index(last).await;
        info!(start, sites = self.sites.len(), "ticker started");

        loop {
            self.rotation(start).await;
            start = 0;
        }
    }

    /// Shows sites `start..` once. The persisted index always points at the next site.
    pub async fn rotation(&mut self, start: usize) {
        for index in start..self.sites.len() {
            let site = self.sites[index].clone();
            if let Err(err) = self.store.write_current_index(index + 1).await {
                warn!(error = ?err, index, "failed to persist site index");
            }
            self.show_site(&site).await;
        }
    }

    async fn show_site(&mut self, site: &SiteConfig) {
        self.frame(&format!("Access to RSS...\n{}", site.name));
        self.display.busy(true);
        let fetched = self.source.fetch(&site.url).await;
        self.display.busy(false);

        let text = match fetched {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, site = %site.name, url = %site.url, "feed fetch failed");
                self.frame(&format!("Fetch failed\n{}", site.name));
                self.hold(self.timing.title_hold()).await;
                return;
            }
        };

        let mut shown = 0usize;
        for item in extract(&text) {
            shown += 1;
            debug!(site = %site.name, title = %item.title, "showing item");

            self.frame(&site.name);
            self.hold(self.timing.site_name_hold()).await;
            self.frame(&format!("{}{}", self.timing.title_prefix, item.title));
            self.hold(self.timing.title_hold()).await;
            self.frame(&item.description);
            self.hold(self.timing.description_hold()).await;
        }

        if shown == 0 {
            self.frame(&format!("No items\n{}", site.name));
            self.hold(self.timing.title_hold()).await;
        }
        info!(site = %site.name, count = shown, "site shown");
    }

    fn frame(&mut self, text: &str) {
        self.display.clear();
        self.display.draw_text(text, self.font_size);
    }

    /// Keeps the current frame for `duration`, serving button presses meanwhile.
    async fn hold(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                Some(press) = self.buttons.recv() => self.on_button(press).await,
            }
        }
    }

    async fn on_button(&mut self, press: ButtonPress) {
        let previous = self.font_size;
        self.font_size = next_font_size(previous);
        info!(from = previous, to = self.font_size, source = ?press.source, "font size changed");

        if let Err(err) = self.store.write_font_size(self.font_size).await {
            warn!(error = ?err, "failed to persist font size");
        }
        self.display.status(&format!("font:{}px", self.font_size));
    }
}
