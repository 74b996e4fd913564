use std::io::ErrorKind;

use mbclient::client::{Client, Url};
use mbclient::codec::{MbapCodec, RtuCodec};
use mbclient::decode::{DecodeLevel, FrameDecodeLevel};
use mbclient::error::{FrameParseError, RequestError, UrlError};
use mbclient::mock::MockTransport;
use mbclient::types::UnitId;

fn mbap_client(transport: MockTransport) -> Client {
    Client::from_parts(
        Box::new(MbapCodec::new(UnitId::new(1), FrameDecodeLevel::Nothing)),
        Box::new(transport),
    )
}

fn rtu_client(transport: MockTransport) -> Client {
    Client::from_parts(
        Box::new(RtuCodec::new(UnitId::new(0x11), FrameDecodeLevel::Nothing)),
        Box::new(transport),
    )
}

#[tokio::test]
async fn reads_holding_registers_over_mbap() {
    let url: Url = "tcpp://127.0.0.1:502/1-1/400000-2".parse().unwrap();
    let transport = MockTransport::new().respond(&[
        0x00, 0x00, 0x00, 0x00, 0x00, 0x07, 0x01, 0x03, 0x04, 0x00, 0x0A, 0x00, 0x14,
    ]);
    let mut client = mbap_client(transport);

    let response = client.request(&url).await.unwrap();
    assert!(!response.timeout);
    assert_eq!(response.function_code(), 0x03);
    assert_eq!(response.byte_count(), Some(4));
    assert_eq!(response.payload(), &[0x00, 0x0A, 0x00, 0x14]);
}

#[tokio::test]
async fn sends_the_translated_request_on_the_wire() {
    // absolute 400010 maps to holding register 10
    let url: Url = "tcpp://127.0.0.1:502/1-1/400010-2".parse().unwrap();
    let transport = MockTransport::new().respond(&[
        0x00, 0x00, 0x00, 0x00, 0x00, 0x07, 0x01, 0x03, 0x04, 0x00, 0x00, 0x00, 0x00,
    ]);
    let handle = transport.handle();
    let mut client = mbap_client(transport);
    client.request(&url).await.unwrap();

    assert_eq!(
        handle.sent(),
        vec![vec![
            0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x0A, 0x00, 0x02,
        ]]
    );
    // decode flushed the response buffer and the connection was released
    assert!(handle.buffered().await.is_empty());
    assert_eq!(handle.connect_count(), 1);
    assert_eq!(handle.close_count(), 1);
}

#[tokio::test]
async fn exception_responses_decode_without_error() {
    let url: Url = "tcpp://127.0.0.1:502/1-1/400000-1".parse().unwrap();
    let transport = MockTransport::new()
        .respond(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x01, 0x83, 0x02]);
    let mut client = mbap_client(transport);

    let response = client.request(&url).await.unwrap();
    assert_eq!(response.function_code(), 0x83);
    assert_eq!(response.exception_code(), Some(2));
    assert_eq!(response.exception_text(), Some("Illegal data address"));
}

#[tokio::test]
async fn a_silent_device_yields_a_timeout_frame_not_an_error() {
    let url: Url = "tcpp://127.0.0.1:502/1-1/400000-1".parse().unwrap();
    let transport = MockTransport::new().fail_listen(RequestError::ResponseTimeout);
    let mut client = mbap_client(transport);

    let response = client.request(&url).await.unwrap();
    assert!(response.timeout);
    assert_eq!(response.function_code(), 0x80);
}

#[tokio::test]
async fn rtu_checksum_mismatch_surfaces_as_an_error() {
    let url: Url = "rotp://127.0.0.1:502/17-1/0-13".parse().unwrap();
    // valid response body with the final CRC byte flipped
    let transport =
        MockTransport::new().respond(&[0x11, 0x01, 0x02, 0xCD, 0x6B, 0x40, 0x6C]);
    let handle = transport.handle();
    let mut client = rtu_client(transport);

    match client.request(&url).await {
        Err(RequestError::BadFrame(FrameParseError::ChecksumMismatch(received, computed))) => {
            assert_eq!(received, 0x406C);
            assert_eq!(computed, 0x406D);
        }
        other => panic!("expected a checksum mismatch, got {other:?}"),
    }
    // the bad response was flushed and the connection still released
    assert!(handle.buffered().await.is_empty());
    assert_eq!(handle.close_count(), 1);
}

#[tokio::test]
async fn send_failures_surface_as_errors() {
    let url: Url = "tcpp://127.0.0.1:502/1-1/400000-1".parse().unwrap();
    let transport =
        MockTransport::new().fail_send(RequestError::SendFailed(ErrorKind::BrokenPipe));
    let handle = transport.handle();
    let mut client = mbap_client(transport);

    assert_eq!(
        client.request(&url).await,
        Err(RequestError::SendFailed(ErrorKind::BrokenPipe))
    );
    assert_eq!(handle.close_count(), 1);
}

#[tokio::test]
async fn rtu_round_trip_over_the_engine() {
    let url: Url = "rotp://127.0.0.1:502/17-1/0-13".parse().unwrap();
    let transport =
        MockTransport::new().respond(&[0x11, 0x01, 0x02, 0xCD, 0x6B, 0x40, 0x6D]);
    let mut client = rtu_client(transport);

    let response = client.request(&url).await.unwrap();
    assert_eq!(response.slave_id, 0x11);
    assert_eq!(response.function_code(), 0x01);
    assert_eq!(response.payload(), &[0xCD, 0x6B]);
}

#[tokio::test]
async fn connect_failures_surface_and_release_nothing() {
    let url: Url = "tcpp://127.0.0.1:502/1-1/400000-1".parse().unwrap();
    let transport =
        MockTransport::new().fail_connect(RequestError::ConnectFailed(ErrorKind::TimedOut));
    let mut client = mbap_client(transport);

    assert_eq!(
        client.request(&url).await,
        Err(RequestError::ConnectFailed(ErrorKind::TimedOut))
    );
}

#[tokio::test]
async fn receive_failures_other_than_timeout_are_errors() {
    let url: Url = "tcpp://127.0.0.1:502/1-1/400000-1".parse().unwrap();
    let transport = MockTransport::new()
        .fail_listen(RequestError::ReceiveFailed(ErrorKind::ConnectionReset));
    let mut client = mbap_client(transport);

    assert_eq!(
        client.request(&url).await,
        Err(RequestError::ReceiveFailed(ErrorKind::ConnectionReset))
    );
}

#[tokio::test]
async fn out_of_range_addresses_fail_before_any_io() {
    let url: Url = "tcpp://127.0.0.1:502/1-1/70000-1".parse().unwrap();
    let mut client = mbap_client(MockTransport::new());

    match client.request(&url).await {
        Err(RequestError::BadRequest(_)) => {}
        other => panic!("expected a bad request, got {other:?}"),
    }
}

#[tokio::test]
async fn serial_client_types_are_rejected() {
    let url: Url = "rtup://127.0.0.1:502/1-1/0-1".parse().unwrap();
    assert_eq!(
        Client::new(&url, DecodeLevel::nothing()).err(),
        Some(RequestError::BadUrl(UrlError::UnsupportedScheme(
            mbclient::client::Scheme::Rtu
        )))
    );
}
