#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod api;
pub mod constants;
pub mod handlers;
pub mod media_stream;
pub mod messages;
pub mod peer_connection;
pub mod rtp_transceiver;
pub mod stats;
pub mod transport;
