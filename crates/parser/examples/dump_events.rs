//! Logs the parse events of every request sent to 127.0.0.1:8080.
//!
//! Try it with `curl -v http://127.0.0.1:8080/ -d 'hello'`.

use futures::StreamExt;
use http::StatusCode;
use micro_http_parser::codec::EventDecoder;
use micro_http_parser::protocol::{ParseError, ParseEvent};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_util::codec::FramedRead;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const EMPTY_RESPONSE: &[u8] = b"HTTP/1.1 204 No Content\r\n\r\n";

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!(port = 8080, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        tokio::spawn(async move {
            let (reader, mut writer) = tcp_stream.into_split();
            let mut events = FramedRead::new(reader, EventDecoder::request());

            while let Some(event) = events.next().await {
                match event {
                    Ok(ParseEvent::Content(bytes)) => info!(%remote_addr, len = bytes.len(), "content"),
                    Ok(ParseEvent::MessageComplete) => {
                        info!(%remote_addr, "message complete");
                        if let Err(e) = writer.write_all(EMPTY_RESPONSE).await {
                            warn!(cause = %e, "failed to write response");
                            return;
                        }
                    }
                    Ok(event) => info!(%remote_addr, ?event, "event"),
                    Err(e) => {
                        warn!(%remote_addr, cause = %e, "bad request, connection shutdown");
                        let status = e.as_parse_error().map_or(StatusCode::BAD_REQUEST, ParseError::status);
                        let response = format!("HTTP/1.1 {status}\r\nConnection: close\r\nContent-Length: 0\r\n\r\n");
                        let _ = writer.write_all(response.as_bytes()).await;
                        return;
                    }
                }
            }
            info!(%remote_addr, "finished process, connection shutdown");
        });
    }
}
