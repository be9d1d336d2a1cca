// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU master (client).
//!
//! Every operation runs one complete transaction: the request is
//! validated and encoded, sent over the [`Transport`], and the response
//! is validated against the request before it is decoded.

use crate::{
    codec::{
        check_quantity,
        rtu::{Header, MAX_FRAME_LEN, RequestAdu, ResponseAdu, client},
    },
    error::Error,
    frame::{
        Address, Coil, Coils, Data, FunctionCode, MAX_READ_COILS, MAX_READ_REGISTERS,
        MAX_WRITE_COILS, MAX_WRITE_REGISTERS, Quantity, Register, Request, Response, SlaveId,
    },
    transport::{Clock, DirectionControl, SerialPort, Transport},
    util::packed_coils_len,
};

type Result<T> = core::result::Result<T, Error>;

/// Coil or discrete input states of one read.
pub type Bits = heapless::Vec<Coil, MAX_READ_COILS>;

/// Register values of one read.
pub type Registers<R> = heapless::Vec<R, MAX_READ_REGISTERS>;

/// Progress of the last transaction.
///
/// Every operation borrows the master mutably, so [`Master::state`] only
/// ever observes `Idle`, `Completed` or `Failed`. The intermediate states
/// are visible through `trace` logs.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    Sending,
    AwaitingResponse,
    Validating,
    Completed,
    Failed,
}

/// A Modbus RTU master.
///
/// The master owns its transport, so only one transaction can be in
/// flight at a time.
#[derive(Debug)]
pub struct Master<S, D, C> {
    transport: Transport<S, D, C>,
    state: TransactionState,
}

impl<S, D, C> Master<S, D, C> {
    #[must_use]
    pub const fn new(transport: Transport<S, D, C>) -> Self {
        Self {
            transport,
            state: TransactionState::Idle,
        }
    }

    /// State of the last (or current) transaction.
    #[must_use]
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    pub fn into_transport(self) -> Transport<S, D, C> {
        self.transport
    }

    fn set_state(&mut self, state: TransactionState) {
        #[cfg(feature = "log")]
        log::trace!("Transaction {:?} -> {state:?}", self.state);
        self.state = state;
    }

    fn reject<T>(&mut self, err: Error) -> Result<T> {
        self.set_state(TransactionState::Failed);
        Err(err)
    }
}

impl<S, D, C> Master<S, D, C>
where
    S: SerialPort,
    D: DirectionControl,
    C: Clock,
{
    /// Read `quantity` coils starting at `addr`.
    pub fn read_coils(
        &mut self,
        slave: SlaveId,
        addr: Address,
        quantity: Quantity,
    ) -> Result<Bits> {
        self.transact(slave, Request::ReadCoils(addr, quantity), |rsp| match rsp {
            Response::ReadCoils(coils) => collect_bits(coils, quantity),
            rsp => Err(unexpected(rsp)),
        })
    }

    /// Read `quantity` discrete inputs starting at `addr`.
    pub fn read_discrete_inputs(
        &mut self,
        slave: SlaveId,
        addr: Address,
        quantity: Quantity,
    ) -> Result<Bits> {
        self.transact(
            slave,
            Request::ReadDiscreteInputs(addr, quantity),
            |rsp| match rsp {
                Response::ReadDiscreteInputs(coils) => collect_bits(coils, quantity),
                rsp => Err(unexpected(rsp)),
            },
        )
    }

    /// Read `quantity` holding registers starting at `addr`.
    ///
    /// The register type decides whether the values are interpreted
    /// as signed or unsigned:
    ///
    /// ```ignore
    /// let temperature = master.read_holding_registers::<i16>(1, 0x103, 1)?;
    /// ```
    pub fn read_holding_registers<R: Register>(
        &mut self,
        slave: SlaveId,
        addr: Address,
        quantity: Quantity,
    ) -> Result<Registers<R>> {
        self.transact(
            slave,
            Request::ReadHoldingRegisters(addr, quantity),
            |rsp| match rsp {
                Response::ReadHoldingRegisters(data) => collect_registers(data, quantity),
                rsp => Err(unexpected(rsp)),
            },
        )
    }

    /// Read `quantity` input registers starting at `addr`.
    pub fn read_input_registers<R: Register>(
        &mut self,
        slave: SlaveId,
        addr: Address,
        quantity: Quantity,
    ) -> Result<Registers<R>> {
        self.transact(
            slave,
            Request::ReadInputRegisters(addr, quantity),
            |rsp| match rsp {
                Response::ReadInputRegisters(data) => collect_registers(data, quantity),
                rsp => Err(unexpected(rsp)),
            },
        )
    }

    /// Write a single coil.
    ///
    /// `value` is the wire value and must be [`COIL_ON`](crate::COIL_ON)
    /// or [`COIL_OFF`](crate::COIL_OFF). Returns whether the slave echoed
    /// the written address and value.
    pub fn write_single_coil(&mut self, slave: SlaveId, addr: Address, value: u16) -> Result<bool> {
        self.write(slave, Request::WriteSingleCoil(addr, value))
    }

    /// Write a single holding register.
    pub fn write_single_register<R: Register>(
        &mut self,
        slave: SlaveId,
        addr: Address,
        value: R,
    ) -> Result<bool> {
        self.write(slave, Request::WriteSingleRegister(addr, value.to_word()))
    }

    /// Write consecutive coils starting at `addr`.
    pub fn write_multiple_coils(
        &mut self,
        slave: SlaveId,
        addr: Address,
        coils: &[Coil],
    ) -> Result<bool> {
        if let Err(err) = check_quantity(coils.len(), MAX_WRITE_COILS) {
            return self.reject(err);
        }
        let mut packed = [0; packed_coils_len(MAX_WRITE_COILS)];
        let coils = Coils::from_bools(coils, &mut packed)?;
        self.write(slave, Request::WriteMultipleCoils(addr, coils))
    }

    /// Write consecutive holding registers starting at `addr`.
    pub fn write_multiple_registers<R: Register>(
        &mut self,
        slave: SlaveId,
        addr: Address,
        values: &[R],
    ) -> Result<bool> {
        if let Err(err) = check_quantity(values.len(), MAX_WRITE_REGISTERS) {
            return self.reject(err);
        }
        let mut words = [0; MAX_WRITE_REGISTERS * 2];
        let data = Data::from_registers(values, &mut words)?;
        self.write(slave, Request::WriteMultipleRegisters(addr, data))
    }

    fn write(&mut self, slave: SlaveId, request: Request<'_>) -> Result<bool> {
        self.transact(slave, request, |rsp| {
            let acknowledged = rsp.acknowledges(&request);
            if !acknowledged {
                #[cfg(feature = "log")]
                log::warn!("Slave {slave} did not acknowledge {request:?}: {rsp:?}");
            }
            Ok(acknowledged)
        })
    }

    fn transact<T, F>(&mut self, slave: SlaveId, request: Request<'_>, decode: F) -> Result<T>
    where
        F: FnOnce(Response<'_>) -> Result<T>,
    {
        let result = self.try_transact(slave, request, decode);
        self.set_state(if result.is_ok() {
            TransactionState::Completed
        } else {
            TransactionState::Failed
        });
        result
    }

    fn try_transact<T, F>(&mut self, slave: SlaveId, request: Request<'_>, decode: F) -> Result<T>
    where
        F: FnOnce(Response<'_>) -> Result<T>,
    {
        self.set_state(TransactionState::Sending);
        let adu = RequestAdu {
            hdr: Header { slave },
            pdu: request,
        };
        let mut buf = [0; MAX_FRAME_LEN];
        let len = client::encode_request(adu, &mut buf)?;
        self.set_state(TransactionState::AwaitingResponse);
        let frame = self.transport.send_receive(&buf[..len])?;
        self.set_state(TransactionState::Validating);
        let ResponseAdu { pdu, .. } = client::decode_response(&frame, &adu)?;
        decode(pdu)
    }
}

fn unexpected(rsp: Response<'_>) -> Error {
    Error::FnCode(FunctionCode::from(rsp).value())
}

fn collect_bits(coils: Coils<'_>, quantity: Quantity) -> Result<Bits> {
    let quantity = usize::from(quantity);
    if coils.packed_len() != packed_coils_len(quantity) {
        return Err(Error::UnexpectedLength(coils.packed_len()));
    }
    let mut bits = Bits::new();
    for coil in coils.into_iter().take(quantity) {
        bits.push(coil).map_err(|_| Error::BufferSize)?;
    }
    Ok(bits)
}

fn collect_registers<R: Register>(data: Data<'_>, quantity: Quantity) -> Result<Registers<R>> {
    if data.len() != usize::from(quantity) {
        return Err(Error::UnexpectedLength(data.payload().len()));
    }
    let mut registers = Registers::<R>::new();
    for word in data {
        registers
            .push(R::from_word(word))
            .map_err(|_| Error::BufferSize)?;
    }
    Ok(registers)
}
