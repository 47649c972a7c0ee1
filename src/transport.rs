//! Line-oriented transport over the CICS serial console.
//!
//! The listener and command issuer never touch the serial port directly;
//! they work against the [`LineSource`] and [`LineSink`] capabilities.
//! Both are implemented here over any async byte stream, so tests run
//! against in-memory pipes and production runs against a
//! [`tokio_serial`] port opened with [`open_serial`].

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf,
};
use tokio::time::timeout;
use tokio_serial::SerialPortBuilderExt;
use tracing::debug;

/// Terminator appended to every outgoing command line.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Default bounded wait for one incoming line.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of one bounded-wait read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One raw line, line terminator included when the device sent one.
    /// Terminator stripping is the parser's job, not the transport's.
    Line(String),
    /// No line arrived within the wait. Not a failure; the caller loops.
    TimedOut,
    /// The stream reached end of input.
    Closed,
}

/// Capability to read one line of text with a bounded wait.
#[async_trait]
pub trait LineSource: Send {
    async fn next_line(&mut self) -> io::Result<ReadOutcome>;
}

/// Capability to write one command line; the terminator is appended here.
#[async_trait]
pub trait LineSink: Send {
    async fn send_line(&mut self, command: &str) -> io::Result<()>;
}

/// Buffered line reader over any async byte stream.
pub struct StreamSource<R> {
    reader: BufReader<R>,
    read_timeout: Duration,
    line_buf: String,
}

impl<R: AsyncRead + Unpin + Send> StreamSource<R> {
    pub fn new(reader: R, read_timeout: Duration) -> Self {
        Self {
            reader: BufReader::new(reader),
            read_timeout,
            line_buf: String::with_capacity(256),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> LineSource for StreamSource<R> {
    async fn next_line(&mut self) -> io::Result<ReadOutcome> {
        // A timeout can cancel read_line mid-line; whatever was already
        // read stays in line_buf and the next call finishes the line.
        match timeout(self.read_timeout, self.reader.read_line(&mut self.line_buf)).await {
            Err(_) => Ok(ReadOutcome::TimedOut),
            Ok(Ok(0)) => Ok(ReadOutcome::Closed),
            Ok(Ok(_)) => Ok(ReadOutcome::Line(std::mem::take(&mut self.line_buf))),
            Ok(Err(e)) => Err(e),
        }
    }
}

/// Command writer over any async byte stream.
pub struct StreamSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> LineSink for StreamSink<W> {
    async fn send_line(&mut self, command: &str) -> io::Result<()> {
        debug!("TX: {}", command);
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(LINE_TERMINATOR.as_bytes()).await?;
        self.writer.flush().await
    }
}

/// Serial read half wrapped as a [`LineSource`].
pub type SerialSource = StreamSource<ReadHalf<tokio_serial::SerialStream>>;

/// Serial write half wrapped as a [`LineSink`].
pub type SerialSink = StreamSink<WriteHalf<tokio_serial::SerialStream>>;

/// Open the console's serial port and split it into read/write halves.
///
/// The port uses the serial-port defaults (8 data bits, 1 stop bit, no
/// parity, no flow control), which is what the NGT's RS-232 console
/// speaks at any supported baud rate.
pub fn open_serial(
    device: &str,
    baud: u32,
    read_timeout: Duration,
) -> tokio_serial::Result<(SerialSource, SerialSink)> {
    let stream = tokio_serial::new(device, baud).open_native_async()?;
    let (read_half, write_half) = tokio::io::split(stream);
    Ok((
        StreamSource::new(read_half, read_timeout),
        StreamSink::new(write_half),
    ))
}
