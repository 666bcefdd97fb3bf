//! Threads that poll outside programs for what the bar shows.
//!
//! Each one keeps only the latest value, the event loop reads it when it draws the bar
mod input_method;
mod volume;

use std::{
    io::Read,
    process::{Command, Stdio},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use nix::errno::Errno;
use parking_lot::Mutex;

pub(crate) use input_method::InputMethodSource;
pub(crate) use volume::{Volume, VolumeSource};

/// Wakes the event loop up
pub(crate) trait Wake: Send + Sync {
    fn wake(&self);
}

impl Wake for polling::Poller {
    fn wake(&self) {
        if let Err(e) = self.notify() {
            log::warn!("Failed to wake the event loop: {}", e);
        }
    }
}

/// The latest value a watcher saw, `None` while it is unavailable
#[derive(Debug)]
pub(crate) struct Latest<T>(Arc<Mutex<Option<T>>>);

impl<T: Clone> Latest<T> {
    pub(crate) fn new() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }

    pub(crate) fn get(&self) -> Option<T> {
        self.0.lock().clone()
    }

    /// Returns true if the value changed
    fn set(&self, value: Option<T>) -> bool
    where
        T: PartialEq,
    {
        let mut current = self.0.lock();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// Something a watcher asks for the current value
pub(crate) trait Source: Send + 'static {
    type Value: Clone + PartialEq + Send + 'static;

    fn name(&self) -> &'static str;

    /// `Err` stops the watcher for good
    fn poll(&mut self) -> Result<Self::Value, String>;
}

/// A running watcher thread
#[derive(Debug)]
pub(crate) struct Watcher<T> {
    pub(crate) latest: Latest<T>,
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl<T: Clone + PartialEq + Send + 'static> Watcher<T> {
    /// Poll `source` every `period` on a new thread, waking `waker` whenever the value changes
    pub(crate) fn spawn<S>(
        mut source: S,
        period: Duration,
        waker: Arc<dyn Wake>,
    ) -> std::io::Result<Self>
    where
        S: Source<Value = T>,
    {
        let latest = Latest::new();
        let (stop, stopped) = crossbeam_channel::bounded(1);
        let cell = latest.clone();
        let handle = thread::Builder::new()
            .name(format!("zwm-{}", source.name()))
            .spawn(move || watch(&mut source, &cell, period, &stopped, waker.as_ref()))?;

        Ok(Self {
            latest,
            stop,
            handle,
        })
    }

    /// Ask the thread to stop and wait for it
    pub(crate) fn stop(self) {
        // the thread may already be gone, then there is nobody to tell
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            log::error!("A watcher thread panicked");
        }
    }
}

fn watch<S: Source>(
    source: &mut S,
    cell: &Latest<S::Value>,
    period: Duration,
    stopped: &Receiver<()>,
    waker: &dyn Wake,
) {
    log::debug!("Watching {}", source.name());
    loop {
        match source.poll() {
            Ok(value) => {
                if cell.set(Some(value)) {
                    waker.wake();
                }
            }
            Err(e) => {
                log::warn!("{} is unavailable: {}", source.name(), e);
                if cell.set(None) {
                    waker.wake();
                }
                break;
            }
        }

        match stopped.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    log::debug!("Stopped watching {}", source.name());
}

/// Stdout of a command, an error if it can't run or fails
fn command_output(program: &str, args: &[&str]) -> Result<String, String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("can't run {}: {}", program, e))?;

    let mut output = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout
            .read_to_string(&mut output)
            .map_err(|e| format!("can't read the output of {}: {}", program, e))?;
    }

    match child.wait() {
        Ok(status) if !status.success() => {
            return Err(format!("{} exited with {}", program, status));
        }
        Ok(_) => {}
        // SIGCHLD is ignored, children are reaped before we get to wait for them
        Err(e) if e.raw_os_error() == Some(Errno::ECHILD as i32) => {}
        Err(e) => return Err(format!("can't wait for {}: {}", program, e)),
    }
    Ok(output.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Wake for Counter {
        fn wake(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Scripted(Vec<Result<u32, String>>);

    impl Source for Scripted {
        type Value = u32;

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn poll(&mut self) -> Result<u32, String> {
            if self.0.is_empty() {
                Err(String::from("done"))
            } else {
                self.0.remove(0)
            }
        }
    }

    #[test]
    fn wakes_only_on_change_and_stops_on_error() {
        let counter = Arc::new(Counter::default());
        let source = Scripted(vec![Ok(1), Ok(1), Ok(2)]);
        let watcher = Watcher::spawn(source, Duration::from_millis(1), counter.clone()).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !watcher.handle.is_finished() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        // 1, 2 and then unavailable
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
        assert_eq!(watcher.latest.get(), None);
        watcher.stop();
    }

    #[test]
    fn stop_interrupts_the_wait() {
        let counter = Arc::new(Counter::default());
        let source = Scripted(vec![Ok(7)]);
        let watcher = Watcher::spawn(source, Duration::from_secs(60), counter).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while watcher.latest.get().is_none() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(watcher.latest.get(), Some(7));
        watcher.stop();
    }
}
