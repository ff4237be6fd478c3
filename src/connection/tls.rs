//! TLS client setup.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use super::ConnectionError;

/// A connector trusting the Mozilla root set shipped in `webpki-roots`.
pub(crate) fn connector() -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

/// Run the handshake over an established TCP stream. Certificate problems
/// fail the attempt.
pub(crate) async fn handshake(
    host: &str,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>, ConnectionError> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| ConnectionError::InvalidServerName(host.to_string()))?;
    connector()
        .connect(server_name, stream)
        .await
        .map_err(ConnectionError::Tls)
}
