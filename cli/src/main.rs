//! CLI entrypoint for the agora deliberation engine
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use agora_application::{
    CastVoteUseCase, EngineTick, ModerationUseCase, NullEventSink, ParticipationUseCase,
    RoundLifecycleUseCase, run_scheduler,
};
use agora_domain::{ResponseParams, UserId, VoteChoice};
use agora_infrastructure::{
    ConfigLoader, ManualClock, MemoryStore, SharedConfigProvider, SystemClock, TracingEventSink,
};
use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agora", about = "Structured multi-round group deliberation engine")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the engine scheduler against an in-memory store
    Serve,
    /// Simulate a scripted discussion with an accelerated clock
    Demo {
        /// Number of simulated participants besides the initiator
        #[arg(long, default_value_t = 3)]
        members: usize,
    },
    /// Load and validate configuration, printing the effective values
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Command::Serve => serve(cli.config.as_ref()).await,
        Command::Demo { members } => demo(cli.config.as_ref(), members).await,
        Command::CheckConfig => check_config(cli.config.as_ref()),
    }
}

async fn serve(config_path: Option<&PathBuf>) -> Result<()> {
    let file_config = ConfigLoader::load(config_path)?;
    let tick_period = Duration::from_secs(file_config.scheduler.tick_interval_seconds);

    // === Dependency Injection ===
    let store = Arc::new(MemoryStore::new());
    let config = Arc::new(SharedConfigProvider::new(file_config.engine));
    let events = Arc::new(TracingEventSink);
    let clock = Arc::new(SystemClock);

    let lifecycle = Arc::new(RoundLifecycleUseCase::new(
        store.clone(),
        config,
        events,
        clock,
    ));
    let tick = EngineTick::new(store, lifecycle);

    info!("engine scheduler starting, tick every {tick_period:?}");
    let shutdown = CancellationToken::new();
    let scheduler = tokio::spawn(run_scheduler(tick, tick_period, shutdown.clone()));

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    shutdown.cancel();
    scheduler.await?;
    Ok(())
}

/// Scripted simulation: one discussion, two full rounds, a join request,
/// a mutual removal, driven by a hand-advanced clock
async fn demo(config_path: Option<&PathBuf>, members: usize) -> Result<()> {
    let file_config = ConfigLoader::load(config_path)?;

    let store = Arc::new(MemoryStore::new());
    let config = Arc::new(SharedConfigProvider::new(file_config.engine.clone()));
    let events = Arc::new(TracingEventSink);
    let clock = Arc::new(ManualClock::starting_at(Utc::now()));

    let participation =
        ParticipationUseCase::new(store.clone(), config.clone(), clock.clone());
    let votes = CastVoteUseCase::new(store.clone(), config.clone(), clock.clone());
    let moderation = ModerationUseCase::new(store.clone(), Arc::new(NullEventSink), clock.clone());
    let lifecycle = Arc::new(RoundLifecycleUseCase::new(
        store.clone(),
        config,
        events,
        clock.clone(),
    ));
    let tick = EngineTick::new(store.clone(), lifecycle);

    let members = members.max(2);
    let initiator = UserId::new();
    let roster: Vec<UserId> = std::iter::once(initiator)
        .chain((0..members).map(|_| UserId::new()))
        .collect();

    println!("opening discussion with {} participants", roster.len());
    let id = participation
        .open_discussion(
            "should the group adopt longer response windows?",
            initiator,
            ResponseParams {
                max_response_length_chars: 1000,
                response_time_multiplier: 1.0,
                min_response_time_minutes: file_config.engine.mrm_min_minutes.max(30),
            },
        )
        .await?;

    // The engine only admits further members by vote; the demo seeds them
    // directly through the store to keep the script short.
    {
        use agora_application::DiscussionStore;
        use agora_application::ports::clock::Clock;
        use agora_domain::{Participant, Role};
        let mut state = store.load(id).await?;
        for user in &roster[1..] {
            state
                .participants
                .push(Participant::new(*user, Role::Active, clock.now()));
        }
        store.save(state).await?;
    }

    let outsider = UserId::new();
    let request = participation.file_join_request(id, outsider).await?;
    println!("outsider {outsider} filed join request");

    // Round 1: everyone posts ten minutes apart.
    for user in &roster {
        participation.submit_response(id, *user, 400).await?;
        clock.advance_minutes(10);
    }
    let summary = tick.tick().await?;
    println!("round 1 ended (rounds expired this tick: {})", summary.rounds_expired);

    // Voting window: raise MRL, admit the outsider.
    for user in &roster[1..] {
        votes
            .cast_parameter_vote(id, *user, VoteChoice::Increase, VoteChoice::NoChange)
            .await?;
        votes.cast_join_request_vote(id, *user, request, true).await?;
    }
    clock.advance_minutes(file_config.engine.mrm_min_minutes.max(30) as i64 + 1);
    tick.tick().await?;

    let state = store_snapshot(&store, id).await?;
    println!(
        "round 2 open: mrl={} chars, {} participants",
        state.discussion.params.max_response_length_chars,
        state.participants.len(),
    );

    // Round 2: everyone posts, then tempers flare.
    let mut round_two = roster.clone();
    round_two.push(outsider);
    for user in &round_two {
        participation.submit_response(id, *user, 400).await?;
        clock.advance_minutes(10);
    }
    moderation
        .initiate_mutual_removal(id, roster[1], roster[2])
        .await?;
    println!("{} and {} removed each other", roster[1], roster[2]);

    tick.tick().await?;
    clock.advance_minutes(31);
    tick.tick().await?;

    let state = store_snapshot(&store, id).await?;
    println!(
        "round {} open: {} active, {} observers, status={:?}",
        state.current_round().number,
        state.active_count(),
        state.participants.len() - state.active_count(),
        state.discussion.status,
    );
    Ok(())
}

async fn store_snapshot(
    store: &Arc<MemoryStore>,
    id: agora_domain::DiscussionId,
) -> Result<agora_domain::DiscussionState> {
    use agora_application::DiscussionStore;
    Ok(store.load(id).await?)
}

fn check_config(config_path: Option<&PathBuf>) -> Result<()> {
    if let Some(path) = ConfigLoader::project_config_path() {
        println!("project config: {}", path.display());
    } else {
        println!("project config: none (defaults apply)");
    }

    let config = ConfigLoader::load(config_path)?;
    println!("configuration is valid");
    println!(
        "engine: increment={}% removal_threshold={} mrp_scope={:?}",
        config.engine.vote_increment_pct,
        config.engine.removal_vote_threshold,
        config.engine.mrp_scope,
    );
    println!(
        "bounds: mrl=[{}, {}] rtm=[{}, {}] mrm=[{}, {}]",
        config.engine.mrl_min_chars,
        config.engine.mrl_max_chars,
        config.engine.rtm_min,
        config.engine.rtm_max,
        config.engine.mrm_min_minutes,
        config.engine.mrm_max_minutes,
    );
    println!(
        "caps: duration={}d rounds={} responses={}",
        config.engine.max_discussion_duration_days,
        config.engine.max_discussion_rounds,
        config.engine.max_discussion_responses,
    );
    println!(
        "scheduler: tick every {}s",
        config.scheduler.tick_interval_seconds
    );
    Ok(())
}
