use std::fmt::{Display, Formatter};

mod constants {
    pub(crate) const READ_COILS: u8 = 0x01;
    pub(crate) const READ_DISCRETE_INPUTS: u8 = 0x02;
    pub(crate) const READ_HOLDING_REGISTERS: u8 = 0x03;
    pub(crate) const READ_INPUT_REGISTERS: u8 = 0x04;
    pub(crate) const REPORT_SERVER_ID: u8 = 0x11;
}

/// Function codes the client can place in a request
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum FunctionCode {
    ReadCoils = constants::READ_COILS,
    ReadDiscreteInputs = constants::READ_DISCRETE_INPUTS,
    ReadHoldingRegisters = constants::READ_HOLDING_REGISTERS,
    ReadInputRegisters = constants::READ_INPUT_REGISTERS,
    /// serial-line diagnostic, carries no request data
    ReportServerId = constants::REPORT_SERVER_ID,
}

impl FunctionCode {
    pub const fn get_value(self) -> u8 {
        self as u8
    }

    /// the value this code takes in an exception response
    pub const fn as_error(self) -> u8 {
        self.get_value() | 0x80
    }

    pub fn get(value: u8) -> Option<Self> {
        match value {
            constants::READ_COILS => Some(FunctionCode::ReadCoils),
            constants::READ_DISCRETE_INPUTS => Some(FunctionCode::ReadDiscreteInputs),
            constants::READ_HOLDING_REGISTERS => Some(FunctionCode::ReadHoldingRegisters),
            constants::READ_INPUT_REGISTERS => Some(FunctionCode::ReadInputRegisters),
            constants::REPORT_SERVER_ID => Some(FunctionCode::ReportServerId),

            _ => None,
        }
    }

    /// true for the four read codes that may appear in a decoded response
    pub(crate) fn is_read(value: u8) -> bool {
        matches!(
            value,
            constants::READ_COILS
                | constants::READ_DISCRETE_INPUTS
                | constants::READ_HOLDING_REGISTERS
                | constants::READ_INPUT_REGISTERS
        )
    }
}

impl Display for FunctionCode {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            FunctionCode::ReadCoils => write!(f, "READ COILS ({:#04X})", self.get_value()),
            FunctionCode::ReadDiscreteInputs => {
                write!(f, "READ DISCRETE INPUTS ({:#04X})", self.get_value())
            }
            FunctionCode::ReadHoldingRegisters => {
                write!(f, "READ HOLDING REGISTERS ({:#04X})", self.get_value())
            }
            FunctionCode::ReadInputRegisters => {
                write!(f, "READ INPUT REGISTERS ({:#04X})", self.get_value())
            }
            FunctionCode::ReportServerId => {
                write!(f, "REPORT SERVER ID ({:#04X})", self.get_value())
            }
        }
    }
}
