/// TuneStream - interactive player console
use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tunestream_cli::{parse, CliConfig, ConsoleBackend, Reply, Session};
use tunestream_core::{InMemoryCatalog, Track};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tunestream")]
#[command(about = "Drive the TuneStream player from the console", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON catalog (array of tracks); overrides the configured one
    #[arg(long, env = "TUNESTREAM_CATALOG")]
    catalog: Option<PathBuf>,

    /// Make the backend refuse media URLs with this scheme (repeatable)
    #[arg(long = "refuse-scheme", value_name = "SCHEME")]
    refuse_schemes: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tunestream_cli=info,tunestream_playback=info,tunestream_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if cli.catalog.is_some() {
        config.catalog_path = cli.catalog;
    }
    config.validate()?;

    let catalog = match &config.catalog_path {
        Some(path) => InMemoryCatalog::from_json_file(path)
            .with_context(|| format!("Failed to load catalog from {:?}", path))?,
        None => {
            tracing::info!("No catalog configured, using the demo catalog");
            demo_catalog()?
        }
    };
    tracing::info!("Catalog loaded: {} tracks", catalog.len());

    let (backend, log) = ConsoleBackend::with_log();
    log.borrow_mut().refused_schemes = cli.refuse_schemes;
    let mut session = Session::with_backend(config.playback, catalog, backend, log);

    repl(&mut session)
}

fn repl(session: &mut Session) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "TuneStream console, type 'help' for commands")?;
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                continue;
            }
        };

        match session.execute(command) {
            Ok(Reply::Text(text)) => writeln!(stdout, "{}", text)?,
            Ok(Reply::Quit) => break,
            Err(e) => writeln!(stdout, "error: {}", e)?,
        }
    }

    Ok(())
}

fn demo_catalog() -> anyhow::Result<InMemoryCatalog> {
    let tracks = [
        ("s1", "Harbor Lights", "The Quiet Coast"),
        ("s2", "Paper Satellites", "The Quiet Coast"),
        ("s3", "Lowland", "Mira Vale"),
        ("s4", "Night Ferry", "Mira Vale"),
    ]
    .into_iter()
    .map(|(id, title, author)| {
        Track::new(
            id,
            title,
            author,
            format!("https://cdn.tunestream.example/songs/{}.mp3", id),
        )
        .with_artwork(format!("https://cdn.tunestream.example/art/{}.jpg", id))
    });

    Ok(InMemoryCatalog::from_tracks(tracks)?)
}
