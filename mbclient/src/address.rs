//! Translation between the six-digit absolute register numbers used by
//! operators and the zero-based relative addresses sent on the wire.
//!
//! Each absolute range selects the function code that reads it:
//!
//! | Absolute range    | Function code | Relative offset      |
//! |-------------------|---------------|----------------------|
//! | 0 – 65535         | 0x01          | absolute             |
//! | 100000 – 165535   | 0x02          | absolute − 100000    |
//! | 300000 – 365535   | 0x04          | absolute − 300000    |
//! | 400000 – 465535   | 0x03          | absolute − 400000    |

use crate::common::function::FunctionCode;
use crate::error::InvalidRequest;

const DISCRETE_INPUT_BASE: u64 = 100_000;
const INPUT_REGISTER_BASE: u64 = 300_000;
const HOLDING_REGISTER_BASE: u64 = 400_000;

/// map an absolute register number to a function code and relative address
pub fn relative(absolute: u64) -> Result<(FunctionCode, u16), InvalidRequest> {
    match absolute {
        0..=65_535 => Ok((FunctionCode::ReadCoils, absolute as u16)),
        100_000..=165_535 => Ok((
            FunctionCode::ReadDiscreteInputs,
            (absolute - DISCRETE_INPUT_BASE) as u16,
        )),
        300_000..=365_535 => Ok((
            FunctionCode::ReadInputRegisters,
            (absolute - INPUT_REGISTER_BASE) as u16,
        )),
        400_000..=465_535 => Ok((
            FunctionCode::ReadHoldingRegisters,
            (absolute - HOLDING_REGISTER_BASE) as u16,
        )),
        _ => Err(InvalidRequest::AddressOutOfRange(absolute)),
    }
}

/// inverse of [`relative`]: add the function code's base back
pub fn absolute(function: FunctionCode, relative: u16) -> Result<u64, InvalidRequest> {
    let relative = relative as u64;
    match function {
        FunctionCode::ReadCoils => Ok(relative),
        FunctionCode::ReadDiscreteInputs => Ok(relative + DISCRETE_INPUT_BASE),
        FunctionCode::ReadInputRegisters => Ok(relative + INPUT_REGISTER_BASE),
        FunctionCode::ReadHoldingRegisters => Ok(relative + HOLDING_REGISTER_BASE),
        other => Err(InvalidRequest::UnsupportedFunction(other.get_value())),
    }
}
