pub mod dtls_transport;
pub mod ice_transport;
pub mod sctp_transport;
