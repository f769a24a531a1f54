//! Functional-option knobs for [`crate::context::Context`] construction.

use shared::error::Result;

use crate::config::Config;
use crate::context::{Context, DEFAULT_REPLAY_WINDOW};

pub type ContextOption = Box<dyn FnOnce(&mut ContextOptions)>;

#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub replay_window: u64,
}

impl Default for ContextOptions {
    fn default() -> Self {
        ContextOptions {
            replay_window: DEFAULT_REPLAY_WINDOW,
        }
    }
}

/// Overrides the anti-replay sliding window size, in packets, for both SRTP
/// and SRTCP streams opened on the resulting context.
pub fn srtp_replay_protection(window_size: u64) -> ContextOption {
    Box::new(move |opts| opts.replay_window = window_size)
}

/// Disables anti-replay protection entirely by widening the window to
/// cover the full sequence number space. Only meant for interop testing
/// against peers with broken sequence numbering.
pub fn srtcp_no_replay_protection() -> ContextOption {
    Box::new(|opts| opts.replay_window = u32::MAX as u64)
}

pub fn new_context_with_options(config: Config, options: Vec<ContextOption>) -> Result<Context> {
    let mut opts = ContextOptions::default();
    for option in options {
        option(&mut opts);
    }
    Context::with_replay_window(config, opts.replay_window)
}
