//! Scripted stand-in for a board on a UART.
//!
//! `MockSerialPort` behaves like a board on the other end of
//! a UART: scripted replies are queued for reading whenever a matching
//! command is written. Clones share state, so the background reader and the
//! test can hold separate handles to the same mock.

use super::error::PortError;
use super::traits::{FlowControl, SerialPortAdapter};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on how long an empty read parks before reporting "no data".
const IDLE_READ_SLEEP: Duration = Duration::from_millis(2);

#[derive(Debug, Default)]
struct MockPortState {
    /// Bytes the board has "sent" and the host has not read yet.
    read_queue: VecDeque<u8>,
    write_log: Vec<Vec<u8>>,
    /// (trigger, reply) pairs: a write equal to the trigger queues the reply.
    script: VecDeque<(Vec<u8>, Vec<u8>)>,
    should_timeout: bool,
    timeout: Duration,
    /// Largest chunk handed out by a single read (0 = unlimited).
    max_chunk: usize,
    baud_rate: u32,
    flow_control: Option<FlowControl>,
    rts: Option<bool>,
}

/// A fake board answering scripted command lines.
///
/// # Example
/// ```
/// use blehil::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.reply_to("AT+FMI\r", "+FMI: Acme Corp\r\nOK\r\n");
///
/// port.write_bytes(b"AT+FMI\r").unwrap();
///
/// let mut buffer = [0u8; 64];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"+FMI: Acme Corp\r\nOK\r\n");
/// assert_eq!(port.written_text(), vec!["AT+FMI\r".to_string()]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_millis(100),
                baud_rate: 115_200,
                ..Default::default()
            })),
        }
    }

    /// Make the board emit `data` unprompted (events, notifications).
    pub fn enqueue_read(&self, data: impl AsRef<[u8]>) {
        self.state.lock().read_queue.extend(data.as_ref());
    }

    /// Queue `reply` for reading as soon as `trigger` is written.
    ///
    /// Scripted exchanges are consumed in order: a second script entry with
    /// the same trigger answers the second matching write.
    pub fn reply_to(&self, trigger: impl AsRef<[u8]>, reply: impl AsRef<[u8]>) {
        self.state
            .lock()
            .script
            .push_back((trigger.as_ref().to_vec(), reply.as_ref().to_vec()));
    }

    /// `Err` listing the triggers that were never written.
    pub fn verify_script(&self) -> Result<(), String> {
        let state = self.state.lock();
        if state.script.is_empty() {
            return Ok(());
        }
        let pending: Vec<String> = state
            .script
            .iter()
            .map(|(trigger, _)| String::from_utf8_lossy(trigger).escape_debug().to_string())
            .collect();
        Err(format!("Scripted writes never happened: {:?}", pending))
    }

    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// All writes, decoded lossily as text.
    pub fn written_text(&self) -> Vec<String> {
        self.state
            .lock()
            .write_log
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    pub fn clear_write_log(&self) {
        self.state.lock().write_log.clear();
    }

    /// Make the next write fail as stalled.
    pub fn set_should_timeout(&self, should_timeout: bool) {
        self.state.lock().should_timeout = should_timeout;
    }

    /// Limit how many bytes a single read returns, to exercise partial lines.
    pub fn set_max_chunk(&self, max_chunk: usize) {
        self.state.lock().max_chunk = max_chunk;
    }

    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }

    /// Current line speed as last configured by the host.
    pub fn baud_rate(&self) -> u32 {
        self.state.lock().baud_rate
    }

    /// Flow control mode last configured by the host, if ever set.
    pub fn flow_control(&self) -> Option<FlowControl> {
        self.state.lock().flow_control
    }

    /// RTS level last driven by the host, if ever driven.
    pub fn rts(&self) -> Option<bool> {
        self.state.lock().rts
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::Stalled(state.timeout));
        }

        state.write_log.push(data.to_vec());

        if let Some(pos) = state.script.iter().position(|(t, _)| t == data) {
            if let Some((_, reply)) = state.script.remove(pos) {
                state.read_queue.extend(reply);
            }
        }

        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        let limit = match state.max_chunk {
            0 => buffer.len(),
            n => n.min(buffer.len()),
        };

        let mut bytes_read = 0;
        for byte in buffer.iter_mut().take(limit) {
            match state.read_queue.pop_front() {
                Some(queued_byte) => {
                    *byte = queued_byte;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read == 0 {
            let idle = state.timeout.min(IDLE_READ_SLEEP);
            drop(state);
            std::thread::sleep(idle);
            // Same shape as a real port whose read timed out with no data
            Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "No data available",
            )))
        } else {
            Ok(bytes_read)
        }
    }

    fn flush(&mut self) -> Result<(), PortError> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.state.lock().timeout = timeout;
        Ok(())
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), PortError> {
        self.state.lock().baud_rate = baud_rate;
        Ok(())
    }

    fn set_flow_control(&mut self, flow_control: FlowControl) -> Result<(), PortError> {
        self.state.lock().flow_control = Some(flow_control);
        Ok(())
    }

    fn write_request_to_send(&mut self, level: bool) -> Result<(), PortError> {
        self.state.lock().rts = Some(level);
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        self.state.lock().read_queue.clear();
        Ok(())
    }

    fn try_clone_adapter(&self) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        Ok(Box::new(self.clone()))
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
