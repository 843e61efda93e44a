use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use encrypted_export::core::services::delivery::CHUNK_SIZE;

/// One step of input as seen by the export loop.
#[derive(Debug)]
pub enum Feed {
    Chunk(Vec<u8>),
    End,
    Failed(io::Error),
    Interrupted,
}

/// Input read on a background thread so an interrupt can be observed even
/// while a read is blocked (an idle pipe or terminal on stdin).
pub struct InterruptibleInput {
    feed: Receiver<Feed>,
    interrupter: Interrupter,
}

/// Cloneable handle that stops an `InterruptibleInput`.
#[derive(Clone)]
pub struct Interrupter {
    flag: Arc<AtomicBool>,
    feed: SyncSender<Feed>,
}

impl Interrupter {
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // A full channel is fine: the flag is checked before every chunk.
        let _ = self.feed.try_send(Feed::Interrupted);
    }
}

impl InterruptibleInput {
    pub fn spawn<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, feed) = mpsc::sync_channel(4);
        let interrupter = Interrupter {
            flag: Arc::new(AtomicBool::new(false)),
            feed: tx.clone(),
        };
        thread::spawn(move || pump(reader, tx));
        Self { feed, interrupter }
    }

    /// Route Ctrl-C, SIGTERM and SIGHUP to this input.
    pub fn on_termination_signals(self) -> Self {
        let interrupter = self.interrupter();
        if let Err(e) = ctrlc::set_handler(move || interrupter.interrupt()) {
            tracing::warn!(error = %e, "could not install interrupt handler");
        }
        self
    }

    pub fn interrupter(&self) -> Interrupter {
        self.interrupter.clone()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupter.flag.load(Ordering::SeqCst)
    }

    /// Block until the next chunk, the end of input, or an interrupt.
    pub fn next_feed(&self) -> Feed {
        if self.is_interrupted() {
            return Feed::Interrupted;
        }
        match self.feed.recv() {
            Ok(Feed::Chunk(_)) if self.is_interrupted() => Feed::Interrupted,
            Ok(feed) => feed,
            Err(_) => Feed::Failed(io::Error::other("input reader stopped")),
        }
    }
}

fn pump<R: Read>(mut reader: R, tx: SyncSender<Feed>) {
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let feed = match reader.read(&mut buf) {
            Ok(0) => Feed::End,
            Ok(n) => Feed::Chunk(buf[..n].to_vec()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => Feed::Failed(e),
        };
        let last = !matches!(feed, Feed::Chunk(_));
        if tx.send(feed).is_err() || last {
            return;
        }
    }
}
