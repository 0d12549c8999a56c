use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc;

mod ui;
mod utils;

use crate::ui::{ChatUI, Intent};
use chitchatty::clock::LocalClock;
use chitchatty::config::{default_config_path, AppConfig};
use chitchatty::responder::CannedResponder;
use chitchatty::seed::{default_seed, empty_seed};
use chitchatty::{ConversationController, ConversationEvent, OverlapPolicy, TokioReplyScheduler};

/// Command line arguments for ChitChatty
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ChitChatty: a terminal chat with simulated contacts.",
    long_about = "ChitChatty is a local, single-session chat simulator. Contacts answer \
    with canned replies after a short typing delay; nothing leaves the machine."
)]
struct Args {
    /// JSON config file (defaults to <config dir>/chitchatty/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where to write the log (defaults to ./chitchatty.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Seed for reply selection, for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Delay before the contact starts typing
    #[arg(long, value_name = "MS")]
    typing_delay_ms: Option<u64>,

    /// Delay before the contact replies, counted from the send
    #[arg(long, value_name = "MS")]
    reply_delay_ms: Option<u64>,

    /// Only answer the latest of several quick messages to one contact
    #[arg(long)]
    coalesce_replies: bool,

    /// Start every conversation empty
    #[arg(long)]
    empty_threads: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Command line values win over the config file.
    fn apply(&self, mut config: AppConfig) -> Result<AppConfig> {
        if let Some(seed) = self.seed {
            config.rng_seed = Some(seed);
        }
        if let Some(ms) = self.typing_delay_ms {
            config.typing_delay_ms = ms;
        }
        if let Some(ms) = self.reply_delay_ms {
            config.reply_delay_ms = ms;
        }
        if self.coalesce_replies {
            config.overlap = OverlapPolicy::Coalesce;
        }
        if self.empty_threads {
            config.seed_history = false;
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match args.config.clone().or_else(default_config_path) {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };
    let config = args.apply(config)?;

    let log_file_path = config
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from("chitchatty.log"));
    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    utils::setup_logging(&log_file_path, level)
        .with_context(|| format!("Failed to open log file {}", log_file_path.display()))?;

    info!("ChitChatty starting up");
    info!("Logging to file: {}", log_file_path.display());
    info!("Config: {:?}", config);

    let (scheduler, mut events) = TokioReplyScheduler::new(config.reply_timing());
    let responder = match config.rng_seed {
        Some(seed) => CannedResponder::from_seed(seed),
        None => CannedResponder::from_entropy(),
    };
    let seed = if config.seed_history { default_seed() } else { empty_seed() };

    let mut controller = ConversationController::new(
        seed,
        Box::new(scheduler),
        Box::new(responder),
        Box::new(LocalClock),
    )
    .with_overlap(config.overlap);

    // Open the first conversation on launch
    if let Some(first) = controller.list_contacts().first().map(|c| c.id) {
        controller.select_contact(first);
    }

    let mut terminal = ui::setup_terminal()?;
    let mut chat_ui = ChatUI::new(&config.user_name);

    let result = run_main_loop(&mut chat_ui, &mut terminal, &mut controller, &mut events);

    // Restore the terminal even if the loop failed
    ui::restore_terminal(terminal)?;
    result?;

    info!("Session ended");
    println!("Chat session ended.");
    Ok(())
}

fn run_main_loop(
    chat_ui: &mut ChatUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
    controller: &mut ConversationController,
    events: &mut mpsc::Receiver<ConversationEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| chat_ui.draw(f, controller))?;

        match chat_ui.handle_input(controller)? {
            Some(Intent::Quit) => return Ok(()),
            Some(intent) => apply_intent(controller, intent),
            None => {}
        }

        // Timer events are applied one at a time between input polls
        while let Ok(event) = events.try_recv() {
            controller.handle_event(event);
        }
    }
}

fn apply_intent(controller: &mut ConversationController, intent: Intent) {
    match intent {
        Intent::SelectContact(id) => controller.select_contact(id),
        Intent::SendMessage(text) => {
            controller.send_message(&text);
        }
        Intent::ToggleSidebar => controller.toggle_sidebar(),
        Intent::Quit => {}
    }
}
