mod app;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use serenpaths_common::{ChallengeLevel, ExperienceId, Feedback, UserPreferences};
use serenpaths_input::{Action, Interaction, PointerEvent};
use serenpaths_kernel::JournalEntry;
use serenpaths_persist::{FileBlobStore, keys};
use serenpaths_scene::{DebugTextRenderer, Renderer, SceneCamera};
use serenpaths_sync::{ApiConfig, HttpBackend, Session, SyncClient};
use serenpaths_tools::{JournalInspector, UserStats};

use crate::app::App;

#[derive(Parser)]
#[command(name = "serenpaths-cli", about = "Track missions and explore them as a scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the saved experiences and preferences
    #[arg(long, env = "SERENPATHS_DATA_DIR", default_value = ".serenpaths", global = true)]
    data_dir: PathBuf,

    /// Recommendation service base URL
    #[arg(long, env = "SERENPATHS_API_URL", default_value = ApiConfig::DEFAULT_BASE_URL, global = true)]
    api_url: String,

    /// Never contact the recommendation service
    #[arg(long, global = true)]
    offline: bool,

    /// Access token of a signed-in session
    #[arg(long, env = "SERENPATHS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Save onboarding answers
    Onboard {
        /// Preferred challenge level (1-3)
        #[arg(short, long, default_value = "2", value_parser = clap::value_parser!(u8).range(1..=3))]
        level: u8,
        #[arg(long = "interest")]
        interests: Vec<String>,
        /// Category to never suggest
        #[arg(long = "avoid")]
        avoid: Vec<String>,
        #[arg(long = "prefer")]
        prefer: Vec<String>,
        #[arg(long = "goal")]
        goals: Vec<String>,
        #[arg(long, default_value = "weekend")]
        time: String,
        #[arg(long, default_value = "daily")]
        frequency: String,
    },
    /// Get a challenge, then optionally accept or skip it
    Challenge {
        /// Level (1-3); defaults to the onboarding level
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
        level: Option<u8>,
        #[arg(long, conflicts_with = "skip")]
        accept: bool,
        /// Skip with a reason, which is sent as feedback
        #[arg(long)]
        skip: Option<String>,
    },
    /// Record something you already did
    Journal {
        title: String,
        #[arg(short, long)]
        category: String,
        #[arg(short, long)]
        emotion: Option<String>,
    },
    /// List all experiences
    List,
    /// Show one experience
    Show { id: u64 },
    /// Summary statistics over all experiences
    Stats,
    /// Mark an ongoing mission as done
    Complete { id: u64 },
    /// Attach feedback (positive, neutral, negative)
    Feedback { id: u64, value: Feedback },
    /// Rename an ongoing mission
    Edit {
        id: u64,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Drop an ongoing mission
    Abandon { id: u64 },
    /// Dump the scene built from the journal
    Scene {
        #[arg(long, default_value = "800")]
        width: f32,
        #[arg(long, default_value = "600")]
        height: f32,
        /// Hide the threads between completed nodes
        #[arg(long)]
        no_edges: bool,
    },
    /// Click the scene at a pixel and report what was hit
    Pick {
        x: f32,
        y: f32,
        #[arg(long, default_value = "800")]
        width: f32,
        #[arg(long, default_value = "600")]
        height: f32,
    },
    /// Check the service and retry queued feedback and preferences
    Sync,
    /// Show or change feature toggles
    Config {
        /// Use the recommendation service
        #[arg(long)]
        ai: Option<bool>,
        /// Push the experience list after every change
        #[arg(long)]
        auto_save: Option<bool>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    if let Commands::Info = cli.command {
        println!("serenpaths-cli v{}", env!("CARGO_PKG_VERSION"));
        println!("persist: {}", serenpaths_persist::crate_info());
        println!("sync: {}", serenpaths_sync::crate_info());
        println!("scene: {}", serenpaths_scene::crate_info());
        println!("input: {}", serenpaths_input::crate_info());
        println!("tools: {}", serenpaths_tools::crate_info());
        println!("data dir: {}", cli.data_dir.display());
        println!("api: {}", cli.api_url);
        return Ok(());
    }

    let store = FileBlobStore::open(&cli.data_dir)
        .with_context(|| format!("opening data dir {}", cli.data_dir.display()))?;
    let config = ApiConfig::new(&cli.api_url).offline(cli.offline);
    let backend = HttpBackend::new(&config)?;
    let mut client = SyncClient::new(config, backend);
    if let Some(token) = cli.token {
        client.auth_mut().set_session(Some(Session {
            user_id: "cli".to_string(),
            email: String::new(),
            access_token: token,
        }));
    }
    let mut app = App::open(store, client)?;

    match cli.command {
        Commands::Info => {}
        Commands::Onboard {
            level,
            interests,
            avoid,
            prefer,
            goals,
            time,
            frequency,
        } => {
            app.onboard(UserPreferences {
                interests,
                challenge_level: ChallengeLevel::from_u8_lossy(level),
                avoid_categories: avoid,
                time_preference: time,
                goals,
                preferred_categories: prefer,
                challenge_frequency: frequency,
            })?;
            println!("Preferences saved.");
        }
        Commands::Challenge {
            level,
            accept,
            skip,
        } => {
            let level = level.map(ChallengeLevel::from_u8_lossy);
            let rec = app.recommend(level)?;
            let c = &rec.challenge;
            println!("{} [{:?}]", c.level, rec.source);
            println!("  {} ({}, {})", c.title, c.category, c.kind);
            if let Some(description) = &c.description {
                println!("  {description}");
            }
            if let Some(time) = &c.estimated_time {
                println!("  about {time}");
            }
            if accept {
                let id = app.accept(c)?;
                println!("Accepted as mission #{id}.");
            } else if let Some(reason) = skip {
                let outcome = app.skip(c, &reason)?;
                println!("Skipped ({outcome:?}).");
            }
        }
        Commands::Journal {
            title,
            category,
            emotion,
        } => {
            let id = app.record(JournalEntry {
                title,
                category,
                emotion,
            })?;
            println!("Recorded #{id}.");
        }
        Commands::List => {
            println!("{}", JournalInspector::summary(app.journal()));
            for id in JournalInspector::list(app.journal()) {
                if let Some(info) = JournalInspector::inspect(app.journal(), id) {
                    println!("  {info}");
                }
            }
        }
        Commands::Show { id } => match JournalInspector::inspect(app.journal(), ExperienceId(id)) {
            Some(info) => println!("{info}"),
            None => anyhow::bail!("no experience #{id}"),
        },
        Commands::Stats => {
            println!("{}", UserStats::from_experiences(&app.journal().to_vec()));
        }
        Commands::Complete { id } => {
            app.complete(ExperienceId(id))?;
            println!("Mission #{id} completed.");
        }
        Commands::Feedback { id, value } => {
            let outcome = app.feedback(ExperienceId(id), value)?;
            println!("Feedback {value} for #{id} ({outcome:?}).");
        }
        Commands::Edit {
            id,
            title,
            description,
        } => {
            app.edit(ExperienceId(id), title, description)?;
            println!("Mission #{id} updated.");
        }
        Commands::Abandon { id } => {
            app.abandon(ExperienceId(id))?;
            println!("Mission #{id} abandoned.");
        }
        Commands::Scene {
            width,
            height,
            no_edges,
        } => {
            let (scene, diff) = app.scene();
            let mut camera = SceneCamera::default();
            camera.set_viewport(width, height);
            let renderer = DebugTextRenderer {
                show_edges: !no_edges,
            };
            print!("{}", renderer.render(&scene, &camera));
            println!("Built with {} changes.", diff.change_count());
        }
        Commands::Pick {
            x,
            y,
            width,
            height,
        } => {
            let (scene, _) = app.scene();
            let mut camera = SceneCamera::default();
            camera.set_viewport(width, height);
            let mut interaction = Interaction::new(width, height);
            match interaction.handle(PointerEvent::Click { x, y }, &scene, &camera, Duration::ZERO) {
                Some(Action::OpenExperience(id)) => {
                    match JournalInspector::inspect(app.journal(), id) {
                        Some(info) => println!("{info}"),
                        None => println!("Hit #{id}"),
                    }
                }
                _ => println!("Nothing at ({x}, {y})."),
            }
        }
        Commands::Sync => {
            let report = app.sync()?;
            println!(
                "healthy={} authenticated={}",
                report.healthy, report.authenticated
            );
            if let Some(sync) = report.sync {
                println!(
                    "feedback sent={} remaining={} preferences sent={}",
                    sync.feedback_sent, sync.feedback_remaining, sync.preferences_sent
                );
            }
        }
        Commands::Config { ai, auto_save } => {
            if let Some(enabled) = ai {
                app.set_flag(keys::AI_ENABLED, enabled)?;
            }
            if let Some(enabled) = auto_save {
                app.set_flag(keys::AUTO_SAVE, enabled)?;
            }
            println!("aiEnabled={}", app.flag(keys::AI_ENABLED)?);
            println!("autoSaveExperiences={}", app.flag(keys::AUTO_SAVE)?);
            match app.preferences() {
                Some(p) => println!("level={} avoid={:?}", p.challenge_level, p.avoid_categories),
                None => println!("not onboarded"),
            }
        }
    }

    Ok(())
}
