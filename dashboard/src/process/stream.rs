//! Cancellable line streams over child process output

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tracing::debug;

/// Lines buffered between the reader tasks and the consumer
const LINE_BUFFER: usize = 256;

/// Lines from a running process.
///
/// Dropping the stream closes the channel; the supervising task notices,
/// kills the process and reaps it.
#[derive(Debug)]
pub struct LineStream {
    rx: mpsc::Receiver<String>,
    pid: Option<u32>,
}

impl LineStream {
    /// Take over `child`, forwarding its stdout and stderr line by line
    pub fn from_child(mut child: Child) -> Self {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let pid = child.id();

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx.clone()));
        }

        tokio::spawn(async move {
            let cancelled = tokio::select! {
                _ = tx.closed() => true,
                status = child.wait() => {
                    debug!("Streamed process {:?} exited: {:?}", pid, status);
                    false
                }
            };

            if cancelled {
                debug!("Stream consumer gone, killing process {:?}", pid);
                let _ = child.start_kill();
                let _ = child.wait().await;
            }
        });

        Self { rx, pid }
    }

    /// A finished stream yielding `lines`
    pub fn from_lines(lines: Vec<String>) -> Self {
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            let _ = tx.try_send(line);
        }
        Self { rx, pid: None }
    }

    /// Forward `inner`, then run `cleanup` once it has ended or the
    /// consumer is gone. `inner` is dropped first, which stops its producer.
    pub fn with_cleanup<F>(inner: LineStream, cleanup: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let pid = inner.pid;

        tokio::spawn(async move {
            let mut inner = inner;
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    line = inner.next_line() => match line {
                        Some(line) => {
                            if tx.send(line).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }

            debug!("Stream {:?} finished, running cleanup", pid);
            drop(inner);
            cleanup.await;
        });

        Self { rx, pid }
    }

    /// OS process id of the producer, if any
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Next line, `None` once the process has exited and output is drained
    pub async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

impl Stream for LineStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

async fn forward_lines<R>(reader: R, tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(line).await.is_err() {
                    break;
                }
            }
        }
    }
}
