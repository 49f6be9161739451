// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The "operator (cron-like ticker)" of §2: a fixed-interval loop that
//! dequeues one patch set and steps every non-terminal Branch, matching
//! §5's serialization rule by sharing the same `Mutex<App>` the listener
//! takes requests against.

use crate::app::App;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct Ticker {
    app: Arc<Mutex<App>>,
    interval: Duration,
}

impl Ticker {
    pub fn new(app: Arc<Mutex<App>>, interval: Duration) -> Self {
        Self { app, interval }
    }

    pub async fn run(self) {
        let mut timer = tokio::time::interval(self.interval);
        loop {
            timer.tick().await;
            self.tick_once().await;
        }
    }

    async fn tick_once(&self) {
        let mut app = self.app.lock().await;

        if let Err(e) = app.get_and_move() {
            warn!(error = %e, "tick: get_and_move failed");
            return;
        }

        match app.tick().await {
            Ok(stepped) => debug!(stepped, "tick complete"),
            Err(e) => warn!(error = %e, "tick: engine step failed"),
        }
    }
}

#[cfg(test)]
#[path = "ticker_tests.rs"]
mod tests;
