//! Request descriptor URL:
//! `<scheme>://<host>:<port>/<slave>-<timeout>/<address>-<quantity>`
//!
//! One URL names everything a single read needs: where the device lives, how
//! long to wait for it, and which registers to fetch.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use crate::error::UrlError;

/// Client type tag: pairs a framing variant with a transport
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scheme {
    /// `TCPP`: MBAP over TCP
    Tcp,
    /// `AOTP`: ASCII framing over TCP (recognized, not supported)
    AsciiOverTcp,
    /// `ROTP`: RTU framing over TCP
    RtuOverTcp,
    /// `RTUP`: RTU over a serial line (recognized, not supported)
    Rtu,
    /// `ASCP`: ASCII over a serial line (recognized, not supported)
    Ascii,
}

impl FromStr for Scheme {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TCPP" => Ok(Scheme::Tcp),
            "AOTP" => Ok(Scheme::AsciiOverTcp),
            "ROTP" => Ok(Scheme::RtuOverTcp),
            "RTUP" => Ok(Scheme::Rtu),
            "ASCP" => Ok(Scheme::Ascii),
            _ => Err(UrlError::UnknownScheme),
        }
    }
}

impl Display for Scheme {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let tag = match self {
            Scheme::Tcp => "TCPP",
            Scheme::AsciiOverTcp => "AOTP",
            Scheme::RtuOverTcp => "ROTP",
            Scheme::Rtu => "RTUP",
            Scheme::Ascii => "ASCP",
        };
        f.write_str(tag)
    }
}

/// Parsed request descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub slave_id: u8,
    pub timeout: Duration,
    /// absolute register number, translated by the engine
    pub address: u64,
    pub quantity: u16,
}

impl FromStr for Url {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s.split_once("://").ok_or(UrlError::Malformed)?;
        let scheme = scheme.parse::<Scheme>()?;

        let mut parts = rest.split('/');
        let endpoint = parts.next().ok_or(UrlError::Malformed)?;
        let device = parts.next().ok_or(UrlError::Malformed)?;
        let registers = parts.next().ok_or(UrlError::Malformed)?;
        if parts.next().is_some() {
            return Err(UrlError::Malformed);
        }

        let (host, port) = endpoint.split_once(':').ok_or(UrlError::Malformed)?;
        let (slave_id, timeout) = device.split_once('-').ok_or(UrlError::Malformed)?;
        let (address, quantity) = registers.split_once('-').ok_or(UrlError::Malformed)?;

        Ok(Url {
            scheme,
            host: host.to_string(),
            port: port.parse().map_err(|_| UrlError::BadField("port"))?,
            slave_id: slave_id
                .parse()
                .map_err(|_| UrlError::BadField("slave id"))?,
            timeout: Duration::from_secs(
                timeout
                    .parse::<u32>()
                    .map_err(|_| UrlError::BadField("timeout"))? as u64,
            ),
            address: address
                .parse()
                .map_err(|_| UrlError::BadField("address"))?,
            quantity: quantity
                .parse()
                .map_err(|_| UrlError::BadField("quantity"))?,
        })
    }
}
