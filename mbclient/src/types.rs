use std::fmt::{Display, Formatter};

use crate::address;
use crate::common::frame::Pdu;
use crate::common::function::FunctionCode;
use crate::error::InvalidRequest;

/// address of a device on the bus (the MBAP "unit identifier")
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UnitId {
    pub value: u8,
}

impl UnitId {
    pub fn new(value: u8) -> Self {
        UnitId { value }
    }
}

impl Display for UnitId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:#04X}", self.value)
    }
}

/// A read request, expressed in wire terms: function code plus a relative
/// address. Construct from an absolute register number with
/// [`Request::from_absolute`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Request {
    pub function: FunctionCode,
    pub address: u16,
    pub quantity: u16,
}

impl Request {
    pub fn new(function: FunctionCode, address: u16, quantity: u16) -> Self {
        Request {
            function,
            address,
            quantity,
        }
    }

    /// resolve an absolute register number to its function code and relative
    /// address, then build the request
    pub fn from_absolute(absolute: u64, quantity: u16) -> Result<Self, InvalidRequest> {
        let (function, address) = address::relative(absolute)?;
        Ok(Request {
            function,
            address,
            quantity,
        })
    }

    /// build the request PDU
    ///
    /// All four read codes encode identically: relative address then quantity,
    /// both big-endian. Report Server ID carries no data.
    pub fn encode(&self) -> Pdu {
        let mut pdu = Pdu::new(self.function);
        match self.function {
            FunctionCode::ReportServerId => {}
            FunctionCode::ReadCoils
            | FunctionCode::ReadDiscreteInputs
            | FunctionCode::ReadHoldingRegisters
            | FunctionCode::ReadInputRegisters => {
                pdu.data.extend_from_slice(&self.address.to_be_bytes());
                pdu.data.extend_from_slice(&self.quantity.to_be_bytes());
            }
        }
        pdu
    }
}
