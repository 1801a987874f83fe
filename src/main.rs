use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::debug;

use podcastr::view::{EpisodeDetail, episode_route};
use podcastr::{
    ApiConfig, ClockDevice, Command, DEFAULT_API_URL, Fallback, NoopReporter, PageCache,
    PlaybackPhase, PlaybackSpeed, PlayerEvent, PlayerReporter, ReqwestClient, Session,
    SessionOptions, SharedPlayerReporter, duration_to_time_string,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static PLAY: Emoji<'_, '_> = Emoji("▶️  ", "> ");
static PAUSE: Emoji<'_, '_> = Emoji("⏸️  ", "|| ");
static LOADING: Emoji<'_, '_> = Emoji("⏳ ", "... ");
static SPEED: Emoji<'_, '_> = Emoji("⏩ ", ">> ");
static DONE: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static LINK: Emoji<'_, '_> = Emoji("🔗 ", "- ");

/// Listen to podcast episodes from the terminal
#[derive(Parser, Debug)]
#[command(name = "podcastr")]
#[command(about = "Listen to podcast episodes from the terminal")]
#[command(version)]
struct Args {
    /// Base URL of the episodes API
    #[arg(long, env = "PODCASTR_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Quiet mode - suppress player output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the latest episode pages ahead of time and list their routes
    Paths,

    /// Show the detail page of an episode
    Episode {
        /// Episode slug
        slug: String,

        /// Press the play button after showing the page
        #[arg(long)]
        play: bool,
    },

    /// Play one or more episodes in order
    Play {
        /// Episode slugs
        #[arg(required = true)]
        slugs: Vec<String>,

        /// Index of the episode to start with
        #[arg(long, default_value = "0")]
        start: usize,

        /// Shuffle the list
        #[arg(short, long)]
        shuffle: bool,

        /// Loop the list
        #[arg(short = 'l', long = "loop")]
        looping: bool,

        /// Playback speed: 0.5, 1, 1.5 or 2
        #[arg(long, default_value = "1")]
        speed: PlaybackSpeed,

        /// Milliseconds between player clock ticks
        #[arg(long, default_value = "250")]
        tick_ms: u64,
    },
}

/// Player reporter using indicatif for terminal output
struct IndicatifReporter {
    bar: ProgressBar,
    title: Mutex<String>,
}

impl IndicatifReporter {
    fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("{prefix} [{bar:40.green/magenta}] {wide_msg}")
            .unwrap()
            .progress_chars("█▓░");

        let bar = ProgressBar::new(0);
        bar.set_style(style);

        Self {
            bar,
            title: Mutex::new(String::new()),
        }
    }

    fn set_time(&self, position: u64, duration: u64) {
        let title = self.title.lock().unwrap();
        self.bar.set_message(format!(
            "{} / {}  {}",
            duration_to_time_string(position).cyan(),
            duration_to_time_string(duration),
            title.bold()
        ));
    }
}

impl PlayerReporter for IndicatifReporter {
    fn report(&self, event: PlayerEvent) {
        match event {
            PlayerEvent::EpisodeLoaded {
                title,
                members,
                episode_index,
                total_episodes,
                duration,
            } => {
                self.bar.println(format!(
                    "{HEADPHONES}[{}/{}] {} {}",
                    (episode_index + 1).to_string().cyan(),
                    total_episodes.to_string().cyan(),
                    title.bold().green(),
                    format!("({members})").dimmed()
                ));
                *self.title.lock().unwrap() = title;
                self.bar.set_length(duration);
                self.bar.set_position(0);
                self.set_time(0, duration);
            }

            PlayerEvent::PhaseChanged { phase } => {
                let prefix = match phase {
                    PlaybackPhase::Playing => PLAY.to_string(),
                    PlaybackPhase::Loading => LOADING.to_string(),
                    _ => PAUSE.to_string(),
                };
                self.bar.set_prefix(prefix);
            }

            PlayerEvent::ProgressUpdated { position, duration } => {
                self.bar.set_position(position);
                self.set_time(position, duration);
            }

            PlayerEvent::Seeked { position } => {
                self.bar.set_position(position);
                let duration = self.bar.length().unwrap_or(0);
                self.set_time(position, duration);
            }

            PlayerEvent::SpeedChanged { speed } => {
                self.bar
                    .println(format!("{SPEED}Speed {}", speed.label().yellow().bold()));
            }

            PlayerEvent::PlayerCleared => {
                self.bar.finish_and_clear();
                println!("{DONE}{}", "Selecione um podcast para ouvir".dimmed());
            }
        }
    }
}

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_detail(detail: &EpisodeDetail) {
    println!("{}\n", detail.document_title.dimmed());
    println!("{}", detail.title.bold().green());
    println!(
        "{} • {} • {}",
        detail.members,
        detail.published_at.cyan(),
        detail.duration.yellow()
    );
    println!("{LINK}{}\n", detail.thumbnail.dimmed());
    println!("{}\n", detail.description);
}

/// Map a line typed by the user to a transport command
fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    match line {
        "" | "p" => Some(Command::TogglePlay),
        "n" => Some(Command::Next),
        "b" => Some(Command::Previous),
        "l" => Some(Command::ToggleLoop),
        "s" => Some(Command::ToggleShuffle),
        "x" => Some(Command::ChangeSpeed),
        "q" => Some(Command::Clear),
        _ => line.parse().ok().map(Command::Seek),
    }
}

/// Forward stdin lines as commands until the session stops listening
fn spawn_stdin_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let Some(command) = parse_command(&line) else {
                debug!(line = %line, "ignoring unknown input");
                continue;
            };
            if tx.blocking_send(command).is_err() {
                break;
            }
        }
    });
}

async fn run_session(session: &mut Session<ClockDevice>, quiet: bool) {
    if !quiet {
        println!(
            "{}",
            "[enter/p] play/pause  [n] next  [b] previous  [l] loop  [s] shuffle  [x] speed  [<secs>] seek  [q] quit"
                .dimmed()
        );
    }

    let (tx, rx) = mpsc::channel(16);
    spawn_stdin_reader(tx);
    session.run(rx).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();
    let args = Args::parse();

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "podcastr".bold().magenta(),
            "- Tocando agora".dimmed()
        );
    }

    let client = ReqwestClient::new();
    let config = ApiConfig::from_url(&args.api_url).context("Invalid API URL")?;

    let reporter: SharedPlayerReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    match args.command {
        Commands::Paths => {
            let cache = PageCache::build(&client, config)
                .await
                .context("Failed to pre-generate episode pages")?;
            if cache.is_empty() {
                println!("{}", "No episodes published yet".dimmed());
            }
            for slug in cache.slugs() {
                println!("{}", episode_route(slug).cyan());
            }
            if !args.quiet {
                println!("\n{DONE}{} pages generated", cache.len().to_string().cyan());
            }
        }

        Commands::Episode { slug, play } => {
            let mut cache = PageCache::new(config, Fallback::Blocking);
            let (page, _) = cache
                .get(&client, &slug)
                .await
                .with_context(|| format!("Failed to load episode '{slug}'"))?;
            print_detail(&page.render());

            if play {
                let mut session =
                    Session::new(ClockDevice::new(), reporter, SessionOptions::default());
                session.update(|store| page.play(store));
                run_session(&mut session, args.quiet).await;
            }
        }

        Commands::Play {
            slugs,
            start,
            shuffle,
            looping,
            speed,
            tick_ms,
        } => {
            let mut cache = PageCache::new(config, Fallback::Blocking);
            let mut episodes = Vec::with_capacity(slugs.len());
            for slug in &slugs {
                let (page, _) = cache
                    .get(&client, slug)
                    .await
                    .with_context(|| format!("Failed to load episode '{slug}'"))?;
                episodes.push(page.episode().clone());
            }

            let options = SessionOptions {
                tick_interval: Duration::from_millis(tick_ms.max(10)),
                ..Default::default()
            };
            let mut session = Session::new(ClockDevice::new(), reporter, options);

            if shuffle {
                session.dispatch(Command::ToggleShuffle);
            }
            if looping {
                session.dispatch(Command::ToggleLoop);
            }
            session.dispatch(Command::SetSpeed(speed));
            session.dispatch(Command::PlayList(episodes, start));

            if session.store().current_episode().is_none() {
                anyhow::bail!("Start index {start} is out of range for {} episodes", slugs.len());
            }

            run_session(&mut session, args.quiet).await;
        }
    }

    Ok(())
}
