//! Timestamped log streaming

use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::Utc;
use futures::Stream;

use crate::models::log_line::LogLine;
use crate::process::LineStream;

/// Open-ended application log.
///
/// Lines are parsed as they arrive. Dropping the stream terminates the
/// underlying process and its connection.
#[derive(Debug)]
pub struct LogStream {
    app: String,
    lines: LineStream,
}

impl LogStream {
    pub fn new(app: impl Into<String>, lines: LineStream) -> Self {
        Self {
            app: app.into(),
            lines,
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// OS process id of the producer
    pub fn pid(&self) -> Option<u32> {
        self.lines.pid()
    }

    pub async fn next_line(&mut self) -> Option<LogLine> {
        self.lines
            .next_line()
            .await
            .map(|raw| LogLine::parse(&raw, Utc::now()))
    }
}

impl Stream for LogStream {
    type Item = LogLine;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.lines)
            .poll_next(cx)
            .map(|line| line.map(|raw| LogLine::parse(&raw, Utc::now())))
    }
}
