//! Listening endpoint and upstream connector.
//!
//! Display strings follow the X convention: `:1` is a Unix-domain socket
//! under `/tmp/.X11-unix`, `host:1` is TCP port 6000+1 on `host`, and an
//! explicit path selects a Unix socket directly. Each accepted client gets
//! a fresh connection to the real display and its own session task.

use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpListener, TcpStream, UnixListener, UnixStream};
use tracing::{error, info};

use crate::core::config::Settings;
use crate::proxy::connection::Connection;
use crate::proxy::session::Session;
use crate::trace::TraceSink;
use crate::{Error, Result};

const X_TCP_PORT_BASE: u16 = 6000;
const X_UNIX_SOCKET_DIR: &str = "/tmp/.X11-unix";

/// A resolved display endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayAddr {
    Tcp(String, u16),
    Unix(PathBuf),
}

/// Parse an X display string (`:1`, `host:2`, `/run/x11/socket`,
/// `unix:/path`). A trailing screen number is ignored.
pub fn parse_display(display: &str) -> Result<DisplayAddr> {
    if let Some(path) = display.strip_prefix("unix:") {
        return Ok(DisplayAddr::Unix(PathBuf::from(path)));
    }
    if display.starts_with('/') {
        return Ok(DisplayAddr::Unix(PathBuf::from(display)));
    }
    let (host, number) = display
        .rsplit_once(':')
        .ok_or_else(|| Error::Config(format!("bad display string {:?}", display)))?;
    let number = number.split('.').next().unwrap_or(number);
    let number: u16 = number
        .parse()
        .map_err(|e| Error::Config(format!("bad display number in {:?}: {}", display, e)))?;
    if host.is_empty() {
        Ok(DisplayAddr::Unix(
            PathBuf::from(X_UNIX_SOCKET_DIR).join(format!("X{}", number)),
        ))
    } else {
        Ok(DisplayAddr::Tcp(host.to_string(), X_TCP_PORT_BASE + number))
    }
}

/// Either transport, presented uniformly to the session pump.
pub enum ProxyStream {
    Tcp(TcpStream),
    Unix(UnixStream),
}

impl ProxyStream {
    async fn connect(addr: &DisplayAddr) -> Result<Self> {
        match addr {
            DisplayAddr::Tcp(host, port) => Ok(ProxyStream::Tcp(
                TcpStream::connect((host.as_str(), *port)).await?,
            )),
            DisplayAddr::Unix(path) => Ok(ProxyStream::Unix(UnixStream::connect(path).await?)),
        }
    }

    fn describe(&self) -> String {
        match self {
            ProxyStream::Tcp(s) => s
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "tcp peer".to_string()),
            ProxyStream::Unix(_) => "unix peer".to_string(),
        }
    }
}

impl AsyncRead for ProxyStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ProxyStream::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            ProxyStream::Unix(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for ProxyStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            ProxyStream::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            ProxyStream::Unix(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ProxyStream::Tcp(s) => Pin::new(s).poll_flush(cx),
            ProxyStream::Unix(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ProxyStream::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            ProxyStream::Unix(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

enum Listener {
    Tcp(TcpListener),
    Unix(UnixListener),
}

impl Listener {
    async fn accept(&self) -> Result<ProxyStream> {
        match self {
            Listener::Tcp(l) => Ok(ProxyStream::Tcp(l.accept().await?.0)),
            Listener::Unix(l) => Ok(ProxyStream::Unix(l.accept().await?.0)),
        }
    }
}

/// The intercepting proxy: accepts clients on the listen display and pairs
/// each with a fresh connection to the real display.
pub struct TraceProxy {
    listener: Listener,
    upstream: DisplayAddr,
    settings: Arc<Settings>,
    sink: Arc<TraceSink>,
}

impl TraceProxy {
    pub async fn bind(listen: &str, display_name: &str, settings: Settings) -> Result<Self> {
        let sink = Arc::new(TraceSink::from_settings(&settings)?);
        let upstream = parse_display(display_name)?;
        let listener = match parse_display(listen)? {
            DisplayAddr::Tcp(host, port) => {
                let l = TcpListener::bind((host.as_str(), port)).await?;
                info!("listening on {}:{} for display {}", host, port, display_name);
                Listener::Tcp(l)
            }
            DisplayAddr::Unix(path) => {
                // a stale socket from a previous run blocks the bind
                let _ = std::fs::remove_file(&path);
                let l = UnixListener::bind(&path)?;
                info!("listening on {} for display {}", path.display(), display_name);
                Listener::Unix(l)
            }
        };
        Ok(Self {
            listener,
            upstream,
            settings: Arc::new(settings),
            sink,
        })
    }

    /// Accept clients forever. Session failures are logged and contained;
    /// only listener failure ends the proxy.
    pub async fn run(self) -> Result<()> {
        loop {
            let client = self.listener.accept().await?;
            let upstream = self.upstream.clone();
            let settings = Arc::clone(&self.settings);
            let sink = Arc::clone(&self.sink);

            tokio::spawn(async move {
                let server = match ProxyStream::connect(&upstream).await {
                    Ok(server) => server,
                    Err(e) => {
                        error!("cannot reach display {:?}: {}", upstream, e);
                        return;
                    }
                };
                let conn = Connection::new(client.describe(), server.describe());
                let session = Session::new(settings, sink, conn);
                // failures are contained to this session and logged there
                let _ = session.run(client, server).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_variants() {
        assert_eq!(
            parse_display(":0").unwrap(),
            DisplayAddr::Unix(PathBuf::from("/tmp/.X11-unix/X0"))
        );
        assert_eq!(
            parse_display(":9.0").unwrap(),
            DisplayAddr::Unix(PathBuf::from("/tmp/.X11-unix/X9"))
        );
        assert_eq!(
            parse_display("remote:2").unwrap(),
            DisplayAddr::Tcp("remote".to_string(), 6002)
        );
        assert_eq!(
            parse_display("unix:/run/x11/socket").unwrap(),
            DisplayAddr::Unix(PathBuf::from("/run/x11/socket"))
        );
        assert_eq!(
            parse_display("/tmp/custom").unwrap(),
            DisplayAddr::Unix(PathBuf::from("/tmp/custom"))
        );
        assert!(parse_display("nonsense").is_err());
        assert!(parse_display("host:notanumber").is_err());
    }
}
