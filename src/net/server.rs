//! HTTP front end for the dispatch layer.
//!
//! This module only deals with networking:
//! - accepting TCP connections,
//! - reading raw bytes from the network,
//! - writing the serialized response back to the client.
//!
//! Request parsing and validation live in [`http`](crate::http); what to
//! answer is decided by the application the server was created with, usually
//! a [`Router`](crate::handler::router::Router), possibly behind an
//! [`IpFilter`](crate::ip_filter::IpFilter).
//!
//! ## Request handling flow
//!
//! 1. Accept a TCP connection
//! 2. Read raw data from the stream
//! 3. Incrementally parse it into a [`Request`]
//!    (delegated to [`Parser`](crate::http::parser::Parser))
//! 4. Validate the request head
//!    (delegated to [`Validator`](crate::http::validator::Validator))
//! 5. Dispatch the request into the application
//! 6. Serialize and write the response, then close the connection
//!
//! Parse and validation failures are answered with the matching error
//! status. The application is shared read-only between connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use async_std::io;
use async_std::net::{TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::task;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::handler::{Dispatch, middleware, responses};
use crate::http::Method;
use crate::http::parser::{Parser, ParserError, ParserLimits, ParserOk};
use crate::http::request::Request;
use crate::http::response::{Body, Response, ResponseHeader};
use crate::http::status::Status;
use crate::http::validator::{Validator, ValidatorError};

pub struct Server {
    config: Arc<ServerConfig>,
    app: Arc<dyn Dispatch>,
}

/// Errors that can occur while reading and parsing an HTTP request from the stream
/// used to interrupt the flow and return appropriate responses.
enum ReadError {
    Io(std::io::Error),
    ConnectionClosed,
    Parser(ParserError),
    Validator(ValidatorError),
}

impl Server {
    pub fn new(config: ServerConfig, app: impl Dispatch + 'static) -> Self {
        Self {
            config: Arc::new(config),
            app: Arc::new(app),
        }
    }

    /// Binds to the configured address and port and serves forever.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind((self.config.address, self.config.port)).await?;
        info!(
            address = %self.config.address,
            port = self.config.port,
            server = self.config.server_name.as_str(),
            "listening"
        );
        self.serve(listener).await
    }

    /// Accepts connections from `listener`, one task per client.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                    continue;
                }
            };

            let config = Arc::clone(&self.config);
            let app = Arc::clone(&self.app);
            task::spawn(async move {
                if let Err(err) = Self::handle_client(stream, peer, config, app).await {
                    debug!(%peer, error = %err, "connection ended with an error");
                }
            });
        }
    }

    /// Reads and incrementally parses an HTTP request from the TCP stream.
    ///
    /// Once all headers are read the request head is validated; a body
    /// announced by `Content-Length` is then read to completion.
    async fn read_request(
        stream: &mut TcpStream,
        peer: SocketAddr,
        config: &ServerConfig,
    ) -> Result<Request, ReadError> {
        let mut parser = Parser::new(ParserLimits::from(config));
        let mut req = Request::new();
        req.client_ip = peer.ip().to_canonical();
        let mut buffer = vec![0u8; config.buffer_size.max(1)];

        loop {
            match parser.advance(&mut req).map_err(ReadError::Parser)? {
                ParserOk::Done => break,
                ParserOk::HeadersDone => {
                    Validator::validate_request(&req, config).map_err(ReadError::Validator)?;
                }
                ParserOk::Incomplete => {
                    let n = match stream.read(&mut buffer).await {
                        Ok(0) => return Err(ReadError::ConnectionClosed),
                        Ok(n) => n,
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(ReadError::Io(e)),
                    };
                    parser.feed(&buffer[..n]);
                }
            }
        }

        Ok(req)
    }

    /// Writes the status line and headers, then the body unless `head_only`.
    /// File bodies are streamed.
    async fn write_response(
        stream: &mut TcpStream,
        response: Response,
        head_only: bool,
    ) -> std::io::Result<()> {
        stream.write_all(response.head().as_bytes()).await?;
        if !head_only {
            match response.body {
                Body::Bytes(bytes) => stream.write_all(&bytes).await?,
                Body::File { file, .. } => {
                    let mut file = async_std::fs::File::from(file);
                    io::copy(&mut file, stream).await?;
                }
            }
        }
        stream.flush().await
    }

    /// Headers every response carries regardless of the handler.
    fn finish(response: &mut Response, config: &ServerConfig) {
        if !response.headers.contains(ResponseHeader::ContentLength.as_str()) {
            let len = response.body.len().to_string();
            response.set_header(ResponseHeader::ContentLength, &len);
        }
        response.set_header(ResponseHeader::Date, &httpdate::fmt_http_date(SystemTime::now()));
        response.set_header(ResponseHeader::Server, &config.server_name);
        response.set_header(ResponseHeader::Connection, "close");
    }

    /// Handles a single client connection.
    /// Reads the request, dispatches it into the application and writes back the response.
    async fn handle_client(
        mut stream: TcpStream,
        peer: SocketAddr,
        config: Arc<ServerConfig>,
        app: Arc<dyn Dispatch>,
    ) -> std::io::Result<()> {
        let read = io::timeout(config.read_timeout, async {
            Ok(Self::read_request(&mut stream, peer, &config).await)
        })
        .await;

        let mut head_only = false;
        let mut response = match read {
            Ok(Ok(req)) => {
                head_only = req.method == Method::Head;
                let mut res = app.call(&req);
                if config.compression {
                    middleware::apply(&req, &mut res);
                }
                debug!(
                    %peer,
                    method = req.method.as_str(),
                    host = req.host.as_deref().unwrap_or("-"),
                    path = req.path.as_deref().unwrap_or("-"),
                    status = res.status.code(),
                    "request dispatched"
                );
                res
            }
            Ok(Err(ReadError::ConnectionClosed)) => return Ok(()),
            Ok(Err(ReadError::Io(err))) => {
                warn!(%peer, error = %err, "I/O error while reading request");
                return Ok(());
            }
            Ok(Err(ReadError::Parser(err))) => {
                debug!(%peer, error = ?err, "malformed request");
                responses::error(err.into_status())
            }
            Ok(Err(ReadError::Validator(err))) => {
                debug!(%peer, error = ?err, "rejected request");
                responses::error(err.into_status())
            }
            Err(_) => responses::error(Status::RequestTimeout),
        };

        Self::finish(&mut response, &config);
        io::timeout(
            config.write_timeout,
            Self::write_response(&mut stream, response, head_only),
        )
        .await
    }
}
