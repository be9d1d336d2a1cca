// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated hardware for tests.
//!
//! All adapters share one [`Sim`] state: a millisecond clock that only
//! advances on `delay_ms`, an event log and the bytes travelling
//! between master and slave.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{
    codec::rtu::{CRC_LEN, crc16},
    frame::{COIL_ON, Exception, FunctionCode, Request, SlaveId},
    transport::{Clock, DirectionControl, SerialPort},
    util::pack_coils,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Transmit,
    Write(Vec<u8>),
    Flush,
    Receive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

#[derive(Debug, Default)]
struct State {
    now: u32,
    events: Vec<Event>,
    /// Received bytes with the time they become readable.
    rx: VecDeque<(u32, u8)>,
    /// Replies sent after the next flush, delayed relative to it.
    script: Vec<(u32, Vec<u8>)>,
    last_tx: Vec<u8>,
    slave: Option<SimSlave>,
    fail_reads: bool,
    fail_writes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Sim(Rc<RefCell<State>>);

impl Sim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slave(slave: SimSlave) -> Self {
        let sim = Self::new();
        sim.0.borrow_mut().slave = Some(slave);
        sim
    }

    pub fn port(&self) -> SimPort {
        SimPort(self.clone())
    }

    pub fn pin(&self) -> SimPin {
        SimPin(self.clone())
    }

    pub fn clock(&self) -> SimClock {
        SimClock(self.clone())
    }

    pub fn now(&self) -> u32 {
        self.0.borrow().now
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    /// The last request that was flushed.
    pub fn last_request(&self) -> Vec<u8> {
        self.0.borrow().last_tx.clone()
    }

    /// Script a reply `delay` ms after the next flush.
    pub fn reply_after(&self, delay: u32, bytes: &[u8]) {
        self.0.borrow_mut().script.push((delay, bytes.to_vec()));
    }

    /// Bytes that are already waiting before the request goes out.
    pub fn push_stale(&self, bytes: &[u8]) {
        let mut state = self.0.borrow_mut();
        let now = state.now;
        state.rx.extend(bytes.iter().map(|b| (now, *b)));
    }

    pub fn fail_reads(&self) {
        self.0.borrow_mut().fail_reads = true;
    }

    pub fn fail_writes(&self) {
        self.0.borrow_mut().fail_writes = true;
    }

    pub fn slave(&self) -> std::cell::RefMut<'_, SimSlave> {
        std::cell::RefMut::map(self.0.borrow_mut(), |state| {
            state.slave.as_mut().expect("no simulated slave")
        })
    }
}

impl State {
    fn schedule(&mut self, delay: u32, bytes: &[u8]) {
        let at = self.now.wrapping_add(delay);
        self.rx.extend(bytes.iter().map(|b| (at, *b)));
    }
}

#[derive(Debug)]
pub struct SimPort(Sim);

impl SerialPort for SimPort {
    type Error = SimError;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut state = self.0.0.borrow_mut();
        if state.fail_reads {
            return Err(SimError);
        }
        let now = state.now;
        let mut n = 0;
        while n < buf.len() {
            match state.rx.front() {
                Some(&(at, byte)) if at <= now => {
                    buf[n] = byte;
                    state.rx.pop_front();
                    n += 1;
                }
                _ => break,
            }
        }
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut state = self.0.0.borrow_mut();
        if state.fail_writes {
            return Err(SimError);
        }
        state.events.push(Event::Write(bytes.to_vec()));
        state.last_tx = bytes.to_vec();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.0.borrow_mut();
        state.events.push(Event::Flush);
        let request = state.last_tx.clone();
        let reply = state.slave.as_mut().and_then(|slave| {
            slave
                .answer(&request)
                .map(|reply| (slave.delay_ms, reply))
        });
        if let Some((delay, reply)) = reply {
            state.schedule(delay, &reply);
        }
        for (delay, bytes) in core::mem::take(&mut state.script) {
            state.schedule(delay, &bytes);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct SimPin(Sim);

impl DirectionControl for SimPin {
    type Error = SimError;

    fn set_transmit(&mut self) -> Result<(), Self::Error> {
        self.0.0.borrow_mut().events.push(Event::Transmit);
        Ok(())
    }

    fn set_receive(&mut self) -> Result<(), Self::Error> {
        self.0.0.borrow_mut().events.push(Event::Receive);
        Ok(())
    }
}

#[derive(Debug)]
pub struct SimClock(Sim);

impl Clock for SimClock {
    fn now_ms(&self) -> u32 {
        self.0.now()
    }

    fn delay_ms(&mut self, ms: u32) {
        let mut state = self.0.0.borrow_mut();
        state.now = state.now.wrapping_add(ms);
    }
}

/// A slave answering from its register and coil banks.
#[derive(Debug, Clone)]
pub struct SimSlave {
    pub address: SlaveId,
    pub coils: Vec<bool>,
    pub discrete_inputs: Vec<bool>,
    pub holding_registers: Vec<u16>,
    pub input_registers: Vec<u16>,
    pub delay_ms: u32,
    /// Answer every request with this exception.
    pub exception: Option<Exception>,
    /// Reply from another address.
    pub reply_address: Option<SlaveId>,
    /// Echo this value for single coil writes instead of the requested one.
    pub coil_echo: Option<u16>,
    pub corrupt_crc: bool,
    pub mute: bool,
    pub requests: usize,
}

impl SimSlave {
    pub fn new(address: SlaveId) -> Self {
        Self {
            address,
            coils: vec![false; 64],
            discrete_inputs: vec![false; 64],
            holding_registers: vec![0; 0x200],
            input_registers: vec![0; 0x200],
            delay_ms: 10,
            exception: None,
            reply_address: None,
            coil_echo: None,
            corrupt_crc: false,
            mute: false,
            requests: 0,
        }
    }

    fn answer(&mut self, adu: &[u8]) -> Option<Vec<u8>> {
        if self.mute || adu.len() < 1 + 1 + CRC_LEN {
            return None;
        }
        let (frame, crc) = adu.split_at(adu.len() - CRC_LEN);
        if crc16(frame) != LittleEndian::read_u16(crc) || frame[0] != self.address {
            return None;
        }
        self.requests += 1;
        let request = Request::try_from(&frame[1..]).ok()?;
        let function = FunctionCode::from(request);
        let mut rsp = vec![self.reply_address.unwrap_or(self.address)];
        match self.exception.map_or_else(|| self.process(request), Err) {
            Ok(pdu) => {
                rsp.push(function.value());
                rsp.extend_from_slice(&pdu);
            }
            Err(exception) => {
                rsp.push(function.exception_value());
                rsp.push(exception.value());
            }
        }
        let mut crc = [0; CRC_LEN];
        LittleEndian::write_u16(&mut crc, crc16(&rsp));
        if self.corrupt_crc {
            crc[0] ^= 0xFF;
        }
        rsp.extend_from_slice(&crc);
        Some(rsp)
    }

    fn process(&mut self, request: Request<'_>) -> Result<Vec<u8>, Exception> {
        let mut pdu = Vec::new();
        match request {
            Request::ReadCoils(addr, quantity) => {
                read_bits(&self.coils, addr, quantity, &mut pdu)?;
            }
            Request::ReadDiscreteInputs(addr, quantity) => {
                read_bits(&self.discrete_inputs, addr, quantity, &mut pdu)?;
            }
            Request::ReadHoldingRegisters(addr, quantity) => {
                read_words(&self.holding_registers, addr, quantity, &mut pdu)?;
            }
            Request::ReadInputRegisters(addr, quantity) => {
                read_words(&self.input_registers, addr, quantity, &mut pdu)?;
            }
            Request::WriteSingleCoil(addr, value) => {
                let coil = self
                    .coils
                    .get_mut(usize::from(addr))
                    .ok_or(Exception::IllegalDataAddress)?;
                *coil = value == COIL_ON;
                push_u16(&mut pdu, addr);
                push_u16(&mut pdu, self.coil_echo.unwrap_or(value));
            }
            Request::WriteSingleRegister(addr, word) => {
                let register = self
                    .holding_registers
                    .get_mut(usize::from(addr))
                    .ok_or(Exception::IllegalDataAddress)?;
                *register = word;
                push_u16(&mut pdu, addr);
                push_u16(&mut pdu, word);
            }
            Request::WriteMultipleCoils(addr, coils) => {
                let start = usize::from(addr);
                let bank = self
                    .coils
                    .get_mut(start..start + coils.len())
                    .ok_or(Exception::IllegalDataAddress)?;
                for (slot, coil) in bank.iter_mut().zip(coils) {
                    *slot = coil;
                }
                push_u16(&mut pdu, addr);
                push_u16(&mut pdu, coils.len() as u16);
            }
            Request::WriteMultipleRegisters(addr, words) => {
                let start = usize::from(addr);
                let bank = self
                    .holding_registers
                    .get_mut(start..start + words.len())
                    .ok_or(Exception::IllegalDataAddress)?;
                for (slot, word) in bank.iter_mut().zip(words) {
                    *slot = word;
                }
                push_u16(&mut pdu, addr);
                push_u16(&mut pdu, words.len() as u16);
            }
        }
        Ok(pdu)
    }
}

fn push_u16(pdu: &mut Vec<u8>, value: u16) {
    let mut buf = [0; 2];
    BigEndian::write_u16(&mut buf, value);
    pdu.extend_from_slice(&buf);
}

fn read_bits(bank: &[bool], addr: u16, quantity: u16, pdu: &mut Vec<u8>) -> Result<(), Exception> {
    let start = usize::from(addr);
    let bits = bank
        .get(start..start + usize::from(quantity))
        .ok_or(Exception::IllegalDataAddress)?;
    let mut bytes = vec![0; bits.len().div_ceil(8)];
    pack_coils(bits, &mut bytes).map_err(|_| Exception::ServerDeviceFailure)?;
    pdu.push(bytes.len() as u8);
    pdu.extend_from_slice(&bytes);
    Ok(())
}

fn read_words(bank: &[u16], addr: u16, quantity: u16, pdu: &mut Vec<u8>) -> Result<(), Exception> {
    let start = usize::from(addr);
    let words = bank
        .get(start..start + usize::from(quantity))
        .ok_or(Exception::IllegalDataAddress)?;
    pdu.push((words.len() * 2) as u8);
    for word in words {
        push_u16(pdu, *word);
    }
    Ok(())
}
