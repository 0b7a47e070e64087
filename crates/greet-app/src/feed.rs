//! Background typist.
//!
//! Spawns a worker thread that "types" a name one grapheme at a time
//! through a [`NameUpdater`]. Each prefix is posted to the UI thread's
//! dispatcher, so the label updates exactly as it would for keyboard input
//! while the worker never touches UI state.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use unicode_segmentation::UnicodeSegmentation;

use crate::view_model::NameUpdater;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub text: String,
    pub interval: Duration,
}

/// Running feed thread. Stopped and joined on drop.
#[derive(Debug)]
pub struct FeedHandle {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<usize>>,
}

impl FeedHandle {
    /// Start typing `config.text` on a new thread.
    pub fn spawn(updater: NameUpdater, config: FeedConfig) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("greet-feed".into())
            .spawn(move || type_out(&updater, &config, &stop_flag))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Wait for the whole text to be typed. Returns how many updates were posted.
    pub fn join(mut self) -> usize {
        self.join_thread()
    }

    /// Stop early and wait. Returns how many updates were posted.
    pub fn finish(mut self) -> usize {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> usize {
        self.stop.store(true, Ordering::Release);
        self.join_thread()
    }

    fn join_thread(&mut self) -> usize {
        self.handle
            .take()
            .map_or(0, |handle| handle.join().unwrap_or(0))
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn type_out(updater: &NameUpdater, config: &FeedConfig, stop: &AtomicBool) -> usize {
    let mut posted = 0;
    let mut typed = String::new();
    for grapheme in config.text.graphemes(true) {
        if !config.interval.is_zero() {
            thread::sleep(config.interval);
        }
        if stop.load(Ordering::Acquire) {
            break;
        }
        typed.push_str(grapheme);
        updater.update_name(typed.as_str());
        posted += 1;
    }
    tracing::debug!(posted, "feed finished");
    posted
}
