//! Serial channel
//!
//! A synchronous byte-oriented duplex channel over a real serial port, with
//! blocking reads of variable-length responses terminated by an idle
//! timeout.

use crate::error::Error;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;

/// Default baud rate when none is given on the command line.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Overall read timeout for a single blocking read.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Inter-character idle timeout: `read_until_idle` stops once a poll yields
/// no further bytes within this window.
const IDLE_TIMEOUT: Duration = Duration::from_millis(500);

/// What the command framer needs from the byte channel underneath it. A
/// real [`SerialChannel`] and, in tests, an in-memory mock both implement
/// this so the framer can be exercised without hardware.
pub trait Transport {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Error>;
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error>;
    fn read_until_idle(&mut self) -> Result<Vec<u8>, Error>;
}

pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Open `device` with the settings the bootloader requires: the given
    /// baud rate, no parity, hardware (RTS/CTS) flow control, and the fixed
    /// read/idle timeouts above.
    pub fn open(device: &str, baud: u32) -> Result<Self, Error> {
        let port = serialport::new(device, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::Hardware)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| Error::SerialOpenFailed {
                device: device.to_string(),
                source,
            })?;

        log::info!("opened serial port {} at {} baud", device, baud);

        Ok(Self { port })
    }

    /// Enumerate available serial device paths, for interactive selection.
    pub fn list_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }

    /// Pulse DTR low/high/low with `hold` between transitions, matching the
    /// board's logical reset sequence.
    pub fn pulse_dtr(&mut self, hold: Duration) -> Result<(), Error> {
        self.port.write_data_terminal_ready(false)?;
        std::thread::sleep(hold);
        self.port.write_data_terminal_ready(true)?;
        std::thread::sleep(hold);
        self.port.write_data_terminal_ready(false)?;
        std::thread::sleep(hold);
        Ok(())
    }
}

impl Transport for SerialChannel {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Error> {
        self.port.write_all(data)?;
        Ok(())
    }

    /// Block until `buf` is filled or the overall read timeout elapses.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.port
            .read_exact(buf)
            .map_err(|_| Error::SerialReadTimeout)
    }

    /// Read and return all bytes received until the idle timeout expires
    /// with no further data — the response-framing shape every `READ_*`
    /// command and the raw/sync modes rely on.
    fn read_until_idle(&mut self) -> Result<Vec<u8>, Error> {
        let old_timeout = self.port.timeout();
        self.port.set_timeout(IDLE_TIMEOUT)?;

        let mut collected = Vec::new();
        let mut buf = [0u8; 512];
        loop {
            match self.port.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => collected.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => {
                    self.port.set_timeout(old_timeout)?;
                    return Err(Error::SerialReadFailed(e));
                }
            }
        }

        self.port.set_timeout(old_timeout)?;
        Ok(collected)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory fake transport for framer tests, standing in for real
    //! hardware.

    use super::Transport;
    use crate::error::Error;
    use std::collections::VecDeque;

    /// A fake duplex byte stream: `written` records what the framer sent,
    /// `to_read` is drained by the framer's reads.
    pub struct MockChannel {
        pub written: Vec<u8>,
        pub to_read: VecDeque<u8>,
    }

    impl MockChannel {
        pub fn new(to_read: Vec<u8>) -> Self {
            Self {
                written: Vec::new(),
                to_read: to_read.into(),
            }
        }
    }

    impl Transport for MockChannel {
        fn write_bytes(&mut self, data: &[u8]) -> Result<(), Error> {
            self.written.extend_from_slice(data);
            Ok(())
        }

        fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
            if self.to_read.len() < buf.len() {
                return Err(Error::SerialReadTimeout);
            }
            for slot in buf.iter_mut() {
                *slot = self.to_read.pop_front().unwrap();
            }
            Ok(())
        }

        fn read_until_idle(&mut self) -> Result<Vec<u8>, Error> {
            Ok(self.to_read.drain(..).collect())
        }
    }
}
