//! Command-line Modbus client console

use std::fmt::Formatter;
use std::num::ParseIntError;
use std::str::FromStr;
use std::time::Duration;

use clap::{App, Arg};

use mbclient::client::{Client, Url};
use mbclient::decode::{DecodeLevel, FrameDecodeLevel, PhysDecodeLevel};
use mbclient::error::{RequestError, UrlError};
use mbclient::Adu;

#[derive(Debug)]
enum Error {
    BadUrl(UrlError),
    BadInt(ParseIntError),
    Request(RequestError),
}

struct Args {
    url: Url,
    period: Option<Duration>,
    decode: DecodeLevel,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    if let Err(ref e) = run().await {
        println!("error: {e}");
    }

    Ok(())
}

async fn run() -> Result<(), Error> {
    let args = parse_args()?;
    let mut client = Client::new(&args.url, args.decode)?;

    match args.period {
        None => {
            let response = client.request(&args.url).await?;
            print_response(&response);
            Ok(())
        }
        Some(period) => loop {
            let response = client.request(&args.url).await?;
            print_response(&response);
            tokio::time::sleep(period).await;
        },
    }
}

fn print_response(response: &Adu) {
    if response.timeout {
        println!("device did not respond before the deadline");
        return;
    }
    if let Some(text) = response.exception_text() {
        println!(
            "device exception {}: {}",
            response.exception_code().unwrap_or_default(),
            text
        );
        return;
    }
    match response.function_code() {
        // register reads come back as big-endian u16 pairs
        0x03 | 0x04 => {
            for (index, pair) in response.payload().chunks_exact(2).enumerate() {
                let value = u16::from_be_bytes([pair[0], pair[1]]);
                println!("index: {index} value: {value}");
            }
        }
        // bit reads come back packed, least significant bit first
        0x01 | 0x02 => {
            for (index, byte) in response.payload().iter().enumerate() {
                for bit in 0..8 {
                    println!("index: {} value: {}", index * 8 + bit, byte >> bit & 1);
                }
            }
        }
        _ => println!("payload: {:02X?}", response.payload()),
    }
}

fn get_period_ms(value: &str) -> Result<Duration, ParseIntError> {
    let num = usize::from_str(value)?;
    Ok(Duration::from_millis(num as u64))
}

fn parse_args() -> Result<Args, Error> {
    let matches = App::new("Modbus Client Console")
        .version("0.1.0")
        .about("Reads registers from a device named by a request URL")
        .arg(
            Arg::with_name("url")
                .required(true)
                .takes_value(true)
                .help("request URL: <scheme>://<host>:<port>/<slave>-<timeout>/<address>-<quantity>"),
        )
        .arg(
            Arg::with_name("period")
                .short("p")
                .long("period")
                .takes_value(true)
                .required(false)
                .help("Optional polling period in milliseconds"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("-v decodes frames, -vv also dumps raw bytes"),
        )
        .get_matches();

    let url = Url::from_str(matches.value_of("url").unwrap())?;
    let period = match matches.value_of("period") {
        Some(s) => Some(get_period_ms(s)?),
        None => None,
    };
    let decode = match matches.occurrences_of("verbose") {
        0 => DecodeLevel::nothing(),
        1 => DecodeLevel::new(FrameDecodeLevel::Header, PhysDecodeLevel::Length),
        _ => DecodeLevel::new(FrameDecodeLevel::Payload, PhysDecodeLevel::Data),
    };

    Ok(Args {
        url,
        period,
        decode,
    })
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Error::BadUrl(err) => write!(f, "{err}"),
            Error::BadInt(err) => err.fmt(f),
            Error::Request(err) => err.fmt(f),
        }
    }
}

impl From<UrlError> for Error {
    fn from(err: UrlError) -> Self {
        Error::BadUrl(err)
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Error::BadInt(err)
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Error::Request(err)
    }
}
