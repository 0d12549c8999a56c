// Shared helpers for the integration tests

use std::sync::Once;

use log::LevelFilter;
use tokio::sync::mpsc;

use chitchatty::clock::FixedClock;
use chitchatty::responder::CannedResponder;
use chitchatty::seed::SeedContact;
use chitchatty::{ContactId, ConversationController, ConversationEvent, OverlapPolicy, ReplyTiming, TokioReplyScheduler};

pub const DHRUV: ContactId = ContactId(1);
pub const VATSAL: ContactId = ContactId(2);

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

/// Controller wired to real tokio timers with the stock 1s/3s delays.
pub fn timed_controller(
    seed: Vec<SeedContact>,
    overlap: OverlapPolicy,
    rng_seed: u64,
) -> (ConversationController, mpsc::Receiver<ConversationEvent>) {
    setup_logging();
    let (scheduler, rx) = TokioReplyScheduler::new(ReplyTiming::default());
    let controller = ConversationController::new(
        seed,
        Box::new(scheduler),
        Box::new(CannedResponder::from_seed(rng_seed)),
        Box::new(FixedClock("04:20 PM".to_string())),
    )
    .with_overlap(overlap);
    (controller, rx)
}

/// Applies every event already delivered; returns how many changed state.
pub fn drain(controller: &mut ConversationController, rx: &mut mpsc::Receiver<ConversationEvent>) -> usize {
    let mut applied = 0;
    while let Ok(event) = rx.try_recv() {
        if controller.handle_event(event) {
            applied += 1;
        }
    }
    applied
}
