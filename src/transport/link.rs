//! Serial transport facade: one port, one background reader, one buffer.

use super::buffer::TransportBuffer;
use super::matcher::{Groups, PatternMatcher};
use super::reader::BackgroundReader;
use crate::config::SerialConfig;
use crate::port::{FlowControl, LineSettings, PortError, SerialPortAdapter, SyncSerialPort};
use regex::Regex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timing knobs for a [`SerialTransport`].
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub read_timeout: Duration,
    pub poll_interval: Duration,
    pub open_settle: Duration,
    pub reconfigure_settle: Duration,
    pub read_chunk_size: usize,
}

impl From<&SerialConfig> for TransportOptions {
    fn from(config: &SerialConfig) -> Self {
        Self {
            read_timeout: config.read_timeout(),
            poll_interval: config.poll_interval(),
            open_settle: config.open_settle(),
            reconfigure_settle: config.reconfigure_settle(),
            read_chunk_size: config.read_chunk_size,
        }
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::from(&SerialConfig::default())
    }
}

/// A serial line to one board.
///
/// Writes happen on the calling thread; everything received is collected by
/// a [`BackgroundReader`] into a shared [`TransportBuffer`] and searched with
/// the [`PatternMatcher`] primitives. Callers clear the buffer before each
/// command so earlier output cannot satisfy the new command's search.
#[derive(Debug)]
pub struct SerialTransport {
    name: String,
    options: TransportOptions,
    buffer: Arc<TransportBuffer>,
    matcher: PatternMatcher,
    port: Option<Box<dyn SerialPortAdapter>>,
    reader: Option<BackgroundReader>,
}

impl SerialTransport {
    pub fn new(name: impl Into<String>, options: TransportOptions) -> Self {
        let buffer = Arc::new(TransportBuffer::new());
        let matcher = PatternMatcher::new(buffer.clone(), options.poll_interval);
        Self {
            name: name.into(),
            options,
            buffer,
            matcher,
            port: None,
            reader: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Open the hardware port at `baud_rate` (8N1, no flow control).
    pub fn open(&mut self, baud_rate: u32) -> Result<(), PortError> {
        if self.is_open() {
            return Err(PortError::AlreadyOpen);
        }
        let settings = LineSettings::new(baud_rate, self.options.read_timeout);
        let port = SyncSerialPort::open(&self.name, settings)?;
        self.attach(Box::new(port))
    }

    /// Take ownership of an already opened adapter and start reading from it.
    pub fn attach(&mut self, mut port: Box<dyn SerialPortAdapter>) -> Result<(), PortError> {
        if self.is_open() {
            return Err(PortError::AlreadyOpen);
        }

        port.set_timeout(self.options.read_timeout)?;
        port.clear_buffers()?;
        self.buffer.clear();

        let reader_port = port.try_clone_adapter()?;
        let reader = BackgroundReader::spawn(
            reader_port,
            self.buffer.clone(),
            self.options.read_chunk_size,
        )?;

        info!(port = %self.name, "serial port opened");
        self.port = Some(port);
        self.reader = Some(reader);

        // boards flashed right before the run print their banner late
        if !self.options.open_settle.is_zero() {
            thread::sleep(self.options.open_settle);
        }
        Ok(())
    }

    /// Stop the reader, drop RTS and release the port.
    pub fn close(&mut self) -> Result<(), PortError> {
        let mut port = self.port.take().ok_or(PortError::NotOpen)?;

        if let Some(mut reader) = self.reader.take() {
            reader.stop();
        }
        // BX310X resets while RTS is asserted
        if let Err(e) = port.write_request_to_send(false) {
            warn!(port = %self.name, error = %e, "failed to drop RTS on close");
        }

        info!(port = %self.name, "serial port closed");
        Ok(())
    }

    /// Drop everything received so far.
    pub fn clear(&self) {
        self.buffer.clear();
    }

    /// Write all of `data` and wait for it to leave the output buffer.
    pub fn write(&mut self, data: &[u8]) -> Result<(), PortError> {
        let port = self.port.as_mut().ok_or(PortError::NotOpen)?;
        port.write_bytes(data)?;
        port.flush()?;

        let text: String = data.iter().map(|&b| char::from(b)).collect();
        debug!(target: "blehil::tx", port = %self.name, "> {}", text.escape_debug());
        Ok(())
    }

    pub fn write_str(&mut self, data: &str) -> Result<(), PortError> {
        self.write(data.as_bytes())
    }

    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), PortError> {
        let port = self.port.as_mut().ok_or(PortError::NotOpen)?;
        port.set_baud_rate(baud_rate)?;
        debug!(port = %self.name, baud_rate, "baud rate changed");
        self.settle();
        Ok(())
    }

    /// Enable or disable software (XON/XOFF) flow control.
    pub fn set_flow_control(&mut self, enable: bool) -> Result<(), PortError> {
        let port = self.port.as_mut().ok_or(PortError::NotOpen)?;
        let mode = FlowControl::enabled(enable);
        port.set_flow_control(mode)?;
        debug!(port = %self.name, ?mode, "flow control changed");
        self.settle();
        Ok(())
    }

    fn settle(&self) {
        if !self.options.reconfigure_settle.is_zero() {
            thread::sleep(self.options.reconfigure_settle);
        }
    }

    pub fn search_first(&self, pattern: &Regex, timeout: Duration) -> Option<Groups> {
        self.matcher.search_first(pattern, timeout)
    }

    pub fn search_first_where(
        &self,
        pattern: &Regex,
        timeout: Duration,
        accept: impl Fn(&Groups) -> bool,
    ) -> Option<Groups> {
        self.matcher.search_first_where(pattern, timeout, accept)
    }

    pub fn search_all(&self, pattern: &Regex, timeout: Duration) -> Vec<Groups> {
        self.matcher.search_all(pattern, timeout)
    }

    pub fn line_starts_with(&self, prefix: &str, timeout: Duration) -> Option<String> {
        self.matcher.line_starts_with(prefix, timeout)
    }

    pub fn poll<T>(&self, timeout: Duration, probe: impl FnMut() -> Option<T>) -> Option<T> {
        self.matcher.poll(timeout, probe)
    }

    /// Everything received since the last clear.
    pub fn snapshot(&self) -> String {
        self.buffer.snapshot()
    }

    pub fn buffer(&self) -> &Arc<TransportBuffer> {
        &self.buffer
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_open() {
            let _ = self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockSerialPort;
    use crate::transport::matcher::pattern;

    fn fast_options() -> TransportOptions {
        TransportOptions {
            read_timeout: Duration::from_millis(5),
            poll_interval: Duration::from_millis(2),
            open_settle: Duration::ZERO,
            reconfigure_settle: Duration::ZERO,
            read_chunk_size: 64,
        }
    }

    fn open_mock() -> (SerialTransport, MockSerialPort) {
        let mock = MockSerialPort::new("MOCK0");
        let mut transport = SerialTransport::new("MOCK0", fast_options());
        transport.attach(Box::new(mock.clone())).unwrap();
        (transport, mock)
    }

    #[test]
    fn test_write_then_search_reply() {
        let (mut transport, mock) = open_mock();
        mock.reply_to("AT+IPR?\r", "\r\n+IPR: 115200\r\n\r\nOK\r\n");

        transport.clear();
        transport.write_str("AT+IPR?\r").unwrap();
        let groups = transport
            .search_first(pattern!(r"\+IPR: (\d+)"), Duration::from_secs(1))
            .unwrap();
        assert_eq!(groups.parse::<u32>(0), Some(115_200));
        assert_eq!(
            transport.line_starts_with("OK", Duration::from_secs(1)),
            Some("OK".to_string())
        );
    }

    #[test]
    fn test_write_when_closed() {
        let mut transport = SerialTransport::new("MOCK0", fast_options());
        assert!(matches!(transport.write(b"AT\r"), Err(PortError::NotOpen)));
        assert!(matches!(transport.close(), Err(PortError::NotOpen)));
    }

    #[test]
    fn test_attach_twice_is_rejected() {
        let (mut transport, _mock) = open_mock();
        let other = MockSerialPort::new("MOCK1");
        assert!(matches!(
            transport.attach(Box::new(other)),
            Err(PortError::AlreadyOpen)
        ));
    }

    #[test]
    fn test_close_drops_rts() {
        let (mut transport, mock) = open_mock();
        transport.close().unwrap();
        assert!(!transport.is_open());
        assert_eq!(mock.rts(), Some(false));
    }

    #[test]
    fn test_reconfigure_reaches_port() {
        let (mut transport, mock) = open_mock();
        transport.set_baud_rate(9600).unwrap();
        transport.set_flow_control(true).unwrap();
        assert_eq!(mock.baud_rate(), 9600);
        assert_eq!(mock.flow_control(), Some(FlowControl::Software));

        transport.set_flow_control(false).unwrap();
        assert_eq!(mock.flow_control(), Some(FlowControl::None));
    }

    #[test]
    fn test_clear_discards_stale_output() {
        let (transport, mock) = open_mock();
        mock.enqueue_read("ERROR\r\n");
        assert!(transport
            .line_starts_with("ERROR", Duration::from_secs(1))
            .is_some());

        transport.clear();
        assert_eq!(transport.snapshot(), "");
        assert_eq!(transport.line_starts_with("ERROR", Duration::ZERO), None);
    }
}
