use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Reads operator input on a dedicated thread and fires a one-shot callback
/// when the literal line `START` (case-insensitive, whitespace ignored)
/// arrives.
///
/// The thread blocks in a line read; `stop` only flips a flag, so a handler
/// whose operator never types anything unwinds with the process.
pub struct InputHandler {
    stop_requested: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            stop_requested: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn start<F>(&mut self, on_start: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.handle.is_some() {
            warn!("input handler already running");
            return;
        }

        let stop_requested = self.stop_requested.clone();
        self.handle = Some(thread::spawn(move || {
            debug!("input thread started");

            let stdin = io::stdin();
            let mut on_start = Some(on_start);

            for line in stdin.lock().lines() {
                if stop_requested.load(Ordering::SeqCst) {
                    break;
                }

                let line = match line {
                    Ok(line) => line,
                    Err(_) => break,
                };

                let command: String = line.split_whitespace().collect::<String>().to_uppercase();
                if command == "START" {
                    info!("START command received");
                    if let Some(callback) = on_start.take() {
                        callback();
                    }
                    break;
                } else if !command.is_empty() {
                    warn!(input = %line.trim(), "unknown command, type START to begin");
                }
            }

            debug!("input thread finished");
        }));
    }

    pub fn stop(&mut self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }
}

impl Drop for InputHandler {
    fn drop(&mut self) {
        self.stop();
    }
}
