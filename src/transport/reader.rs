//! Background reader feeding the receive buffer.

use super::buffer::TransportBuffer;
use crate::port::{is_idle_read, PortError, SerialPortAdapter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Owns the thread that drains one serial port into a [`TransportBuffer`].
///
/// The stop flag is checked once per read cycle, so shutdown latency is
/// bounded by the port's read timeout.
#[derive(Debug)]
pub struct BackgroundReader {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundReader {
    pub fn spawn(
        port: Box<dyn SerialPortAdapter>,
        buffer: Arc<TransportBuffer>,
        chunk_size: usize,
    ) -> Result<Self, PortError> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_name = format!("rx-{}", port.name());
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn({
                let stop = stop.clone();
                move || read_loop(port, buffer, stop, chunk_size.max(1))
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Whether the reader thread is still draining the port.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("background reader panicked");
            }
        }
    }
}

impl Drop for BackgroundReader {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_loop(
    mut port: Box<dyn SerialPortAdapter>,
    buffer: Arc<TransportBuffer>,
    stop: Arc<AtomicBool>,
    chunk_size: usize,
) {
    let name = port.name().to_owned();
    let mut chunk = vec![0u8; chunk_size];
    debug!(port = %name, "background reader started");

    while !stop.load(Ordering::Acquire) {
        match port.read_bytes(&mut chunk) {
            Ok(0) => continue,
            Ok(n) => {
                for line in buffer.append(&chunk[..n]) {
                    debug!(target: "blehil::rx", port = %name, "< {}", line.trim_end().escape_debug());
                }
            }
            Err(e) if is_idle_read(&e) => continue,
            Err(e) => {
                error!(port = %name, error = %e, "serial read failed, stopping reader");
                break;
            }
        }
    }

    debug!(port = %name, "background reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockSerialPort;
    use std::time::{Duration, Instant};

    fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    #[test]
    fn test_reader_feeds_buffer() {
        let mock = MockSerialPort::new("MOCK0");
        let buffer = Arc::new(TransportBuffer::new());
        let mut reader = BackgroundReader::spawn(Box::new(mock.clone()), buffer.clone(), 64).unwrap();

        mock.enqueue_read(b"+SRBLE_IND: 1,1\r\n");
        assert!(wait_until(Duration::from_secs(1), || buffer.snapshot()
            == "+SRBLE_IND: 1,1\r\n"));

        reader.stop();
        assert!(!reader.is_running());
    }

    #[test]
    fn test_reader_reassembles_small_chunks() {
        let mock = MockSerialPort::new("MOCK0");
        mock.set_max_chunk(2);
        let buffer = Arc::new(TransportBuffer::new());
        let _reader = BackgroundReader::spawn(Box::new(mock.clone()), buffer.clone(), 64).unwrap();

        mock.enqueue_read(b"READY\r\nOK\r\n");
        assert!(wait_until(Duration::from_secs(1), || buffer.len() == 2));
        assert_eq!(buffer.lines(), vec!["READY\r\n", "OK\r\n"]);
    }

    #[test]
    fn test_reader_survives_idle_reads() {
        let mock = MockSerialPort::new("MOCK0");
        let buffer = Arc::new(TransportBuffer::new());
        let reader = BackgroundReader::spawn(Box::new(mock.clone()), buffer.clone(), 64).unwrap();

        thread::sleep(Duration::from_millis(30));
        assert!(reader.is_running());
        mock.enqueue_read(b"OK\r\n");
        assert!(wait_until(Duration::from_secs(1), || !buffer.is_empty()));
    }
}
