//! TLS client setup for SNI probing.
//!
//! The probe only needs to know whether a peer completes a TLS 1.2 handshake
//! for a given server name, so the certificate chain is accepted as-is.
//! Handshake signatures are still checked against the presented key.

use std::io;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{self, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio_rustls::TlsConnector;
use tracing::trace;

/// How a failed handshake should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeFailure {
    /// The TLS layer itself refused: an alert, a protocol violation, a bad
    /// signature. Repeating the attempt gives the same answer.
    Rejected,
    /// The transport broke underneath the handshake (reset, EOF, I/O error).
    Transport,
}

/// Builds a TLS 1.2-only client config that skips chain validation.
pub fn client_config() -> Result<ClientConfig, rustls::Error> {
    let provider = Arc::new(crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider.clone())
        .with_protocol_versions(&[&rustls::version::TLS12])?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyChain { provider }))
        .with_no_client_auth();
    Ok(config)
}

pub fn connector() -> Result<TlsConnector, rustls::Error> {
    Ok(TlsConnector::from(Arc::new(client_config()?)))
}

/// tokio-rustls wraps TLS-layer failures as `InvalidData` around a
/// [`rustls::Error`]; anything else came from the socket.
pub fn classify_handshake_error(err: &io::Error) -> HandshakeFailure {
    match err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
    {
        Some(tls_err) => {
            trace!("Handshake rejected: {tls_err}");
            HandshakeFailure::Rejected
        }
        None => {
            trace!("Handshake transport failure: {err}");
            HandshakeFailure::Transport
        }
    }
}

#[derive(Debug)]
struct AcceptAnyChain {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyChain {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use rustls::AlertDescription;

    #[test]
    fn client_config_builds() {
        let config = client_config().unwrap();
        assert!(config.alpn_protocols.is_empty());
        assert!(connector().is_ok());
    }

    #[test]
    fn alert_is_rejected() {
        let err = io::Error::new(
            io::ErrorKind::InvalidData,
            rustls::Error::AlertReceived(AlertDescription::HandshakeFailure),
        );
        assert_eq!(classify_handshake_error(&err), HandshakeFailure::Rejected);
    }

    #[test]
    fn protocol_mismatch_is_rejected() {
        let err = io::Error::new(
            io::ErrorKind::InvalidData,
            rustls::Error::AlertReceived(AlertDescription::ProtocolVersion),
        );
        assert_eq!(classify_handshake_error(&err), HandshakeFailure::Rejected);
    }

    #[test]
    fn socket_errors_are_transport() {
        for kind in [
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::UnexpectedEof,
            io::ErrorKind::BrokenPipe,
        ] {
            let err = io::Error::from(kind);
            assert_eq!(classify_handshake_error(&err), HandshakeFailure::Transport);
        }
    }

    #[test]
    fn foreign_invalid_data_is_transport() {
        let err = io::Error::new(io::ErrorKind::InvalidData, "garbled stream");
        assert_eq!(classify_handshake_error(&err), HandshakeFailure::Transport);
    }
}
