#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod agent;
pub mod attributes;
pub mod candidate;
pub mod connection_state;
pub mod mdns;
pub mod network_type;
pub mod rand;
pub mod stats;
pub mod tcp_type;
pub mod url;
