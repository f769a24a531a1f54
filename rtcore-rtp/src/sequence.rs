use rand::Rng;

/// Sequencer generates sequential sequence numbers for building RTP packets.
pub trait Sequencer: Send + Sync {
    fn next_sequence_number(&mut self) -> u16;
}

#[derive(Debug, Clone, Copy, Default)]
struct FixedSequencer(u16);

impl Sequencer for FixedSequencer {
    fn next_sequence_number(&mut self) -> u16 {
        let n = self.0;
        self.0 = self.0.wrapping_add(1);
        n
    }
}

/// Returns a [`Sequencer`] seeded with a random starting sequence number, as
/// recommended by RFC3550 section 5.1 to make known-plaintext attacks harder.
pub fn new_random_sequencer() -> impl Sequencer {
    FixedSequencer(rand::rng().random::<u16>())
}

/// Returns a [`Sequencer`] starting from a fixed sequence number, useful for
/// deterministic tests.
pub fn new_fixed_sequencer(start: u16) -> impl Sequencer {
    FixedSequencer(start)
}
