// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Half-duplex serial transport.
//!
//! The transport owns the hardware adapters and runs one request/response
//! cycle at a time: drain stale input, switch the line driver to transmit,
//! write and flush the request, switch back to receive and poll for the
//! response until it is complete or a timeout expires.

mod config;

pub use self::config::{Config, DataBits, Parity, StopBits};

use core::{convert::Infallible, fmt};

use crate::{
    codec::rtu::{MAX_FRAME_LEN, response_adu_len},
    error::Error,
};

/// Raw bytes of one received response ADU.
pub type Frame = heapless::Vec<u8, MAX_FRAME_LEN>;

/// Upper bound of stale bytes that are discarded before a request.
const MAX_STALE_BYTES: usize = 4 * MAX_FRAME_LEN;

/// Byte oriented serial port.
pub trait SerialPort {
    type Error: fmt::Debug;

    /// Copy the bytes already received into `buf` without blocking.
    ///
    /// Returns the number of bytes copied, `0` if nothing is pending.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Queue all `bytes` for transmission.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Block until the last queued byte has left the transmitter.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Line driver direction of an RS-485 transceiver.
pub trait DirectionControl {
    type Error: fmt::Debug;

    fn set_transmit(&mut self) -> Result<(), Self::Error>;

    fn set_receive(&mut self) -> Result<(), Self::Error>;
}

/// Monotonic millisecond time source.
pub trait Clock {
    /// Current time. The counter is allowed to wrap.
    fn now_ms(&self) -> u32;

    fn delay_ms(&mut self, ms: u32);
}

/// Direction control for links that need none (RS-232, auto-direction transceivers).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FullDuplex;

impl DirectionControl for FullDuplex {
    type Error = Infallible;

    fn set_transmit(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_receive(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Serial transport with optional direction control.
#[derive(Debug)]
pub struct Transport<S, D, C> {
    config: Config,
    serial: S,
    direction: D,
    clock: C,
}

impl<S, C> Transport<S, FullDuplex, C>
where
    S: SerialPort,
    C: Clock,
{
    /// Create a transport without direction control.
    pub fn new(config: Config, serial: S, clock: C) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            serial,
            direction: FullDuplex,
            clock,
        })
    }

    /// Attach a direction control output (e.g. the DE/RE pin of an RS-485 driver).
    pub fn with_direction_control<D>(self, direction: D) -> Transport<S, D, C>
    where
        D: DirectionControl,
    {
        let Self {
            config,
            serial,
            direction: FullDuplex,
            clock,
        } = self;
        Transport {
            config,
            serial,
            direction,
            clock,
        }
    }
}

impl<S, D, C> Transport<S, D, C> {
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Give the hardware adapters back.
    pub fn release(self) -> (S, D, C) {
        let Self {
            serial,
            direction,
            clock,
            ..
        } = self;
        (serial, direction, clock)
    }
}

impl<S, D, C> Transport<S, D, C>
where
    S: SerialPort,
    D: DirectionControl,
    C: Clock,
{
    /// Send one request ADU and collect the raw response.
    ///
    /// An empty frame means nothing was received before the response
    /// timeout expired. Partial frames are returned as they are and
    /// left to the validator.
    pub fn send_receive(&mut self, adu: &[u8]) -> Result<Frame, Error> {
        self.drain()?;
        self.transmit(adu)?;
        self.receive()
    }

    fn drain(&mut self) -> Result<(), Error> {
        let mut buf = [0; MAX_FRAME_LEN];
        let mut dropped = 0;
        while dropped < MAX_STALE_BYTES {
            let n = self.serial.read_available(&mut buf).map_err(adapter_error)?;
            if n == 0 {
                break;
            }
            #[cfg(feature = "log")]
            log::debug!("Discarded stale input: {:02X?}", &buf[..n]);
            dropped += n;
        }
        if dropped >= MAX_STALE_BYTES {
            #[cfg(feature = "log")]
            log::warn!("Input still pending after discarding {dropped} bytes");
        }
        Ok(())
    }

    fn transmit(&mut self, adu: &[u8]) -> Result<(), Error> {
        self.direction.set_transmit().map_err(adapter_error)?;
        #[cfg(feature = "log")]
        log::debug!("TX: {adu:02X?}");
        let written = self
            .serial
            .write_all(adu)
            .and_then(|()| self.serial.flush())
            .map_err(adapter_error);
        // The driver must not block the bus, even if writing failed.
        let released = self.direction.set_receive().map_err(adapter_error);
        written.and(released)
    }

    fn receive(&mut self) -> Result<Frame, Error> {
        let mut frame = Frame::new();
        let mut chunk = [0; MAX_FRAME_LEN];
        let started = self.clock.now_ms();
        let mut last_rx = started;
        loop {
            let room = frame.capacity() - frame.len();
            let n = self
                .serial
                .read_available(&mut chunk[..room])
                .map_err(adapter_error)?;
            let now = self.clock.now_ms();
            if n > 0 {
                frame
                    .extend_from_slice(&chunk[..n])
                    .map_err(|()| Error::BufferSize)?;
                last_rx = now;
                if let Some(len) = response_adu_len(&frame).filter(|&len| frame.len() >= len) {
                    if frame.len() > len {
                        #[cfg(feature = "log")]
                        log::debug!("Discarded trailing input: {:02X?}", &frame[len..]);
                        frame.truncate(len);
                    }
                    break;
                }
                if frame.is_full() {
                    #[cfg(feature = "log")]
                    log::warn!("Receive buffer full, giving up on {} bytes", frame.len());
                    break;
                }
            } else if frame.is_empty() {
                if now.wrapping_sub(started) >= self.config.response_timeout_ms {
                    #[cfg(feature = "log")]
                    log::warn!(
                        "No response within {} ms",
                        self.config.response_timeout_ms
                    );
                    break;
                }
            } else if now.wrapping_sub(last_rx) >= self.config.idle_timeout_ms() {
                #[cfg(feature = "log")]
                log::warn!(
                    "Line idle after {} bytes of an incomplete frame",
                    frame.len()
                );
                break;
            }
            self.clock.delay_ms(self.config.poll_interval_ms);
        }
        #[cfg(feature = "log")]
        log::debug!("RX: {:02X?}", frame.as_slice());
        Ok(frame)
    }
}

fn adapter_error<E: fmt::Debug>(_err: E) -> Error {
    #[cfg(feature = "log")]
    log::error!("Serial adapter failure: {_err:?}");
    Error::Transport
}
