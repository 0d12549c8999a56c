//! Canned auto-responder used to simulate the remote side of a thread.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

pub const CANNED_RESPONSES: [&str; 8] = [
    "That's interesting!",
    "I understand what you mean.",
    "Thanks for sharing that with me.",
    "Could you tell me more about that?",
    "That sounds great!",
    "I agree with you on that.",
    "Let me think about that for a moment.",
    "That's a good point!",
];

/// Source of reply bodies for simulated peers.
pub trait ResponseSource: Send {
    fn next_response(&mut self) -> String;
}

/// Picks uniformly from [`CANNED_RESPONSES`].
pub struct CannedResponder<R: RngCore> {
    rng: R,
}

impl CannedResponder<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        CannedResponder { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        CannedResponder { rng: StdRng::from_entropy() }
    }
}

impl<R: RngCore> CannedResponder<R> {
    pub fn with_rng(rng: R) -> Self {
        CannedResponder { rng }
    }
}

impl<R: RngCore + Send> ResponseSource for CannedResponder<R> {
    fn next_response(&mut self) -> String {
        CANNED_RESPONSES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(CANNED_RESPONSES[0])
            .to_string()
    }
}
