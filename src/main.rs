use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use inkstrip::build::build_site;
use inkstrip::config::{Config, Stage};
use inkstrip::publish::{mirror_tree, MirrorStore, OutboxAnnouncer, RecordPersister, Release};
use inkstrip::source::{new_images, PageSource, Prompt, RecordSource};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "inkstrip", version, about)]
struct Cli {
    /// The project directory, or any directory below it.
    #[arg(long, default_value = ".")]
    project: PathBuf,

    /// Log progress even if `RUST_LOG` isn't set.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into the output directory.
    Build {
        #[arg(long, value_enum, default_value_t = Stage::Dev)]
        stage: Stage,
    },

    /// Describe new images interactively, release them, and rebuild.
    Add {
        #[arg(long, value_enum, default_value_t = Stage::Dev)]
        stage: Stage,

        /// Image file names. Defaults to every image no page refers to yet.
        images: Vec<String>,
    },

    /// List the images no page refers to yet.
    NewImages,

    /// Copy the built site into the mirror directory.
    Publish {
        #[arg(long, value_enum, default_value_t = Stage::Dev)]
        stage: Stage,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build { stage } => {
            let config = Config::from_directory(&cli.project, stage)?;
            build_site(&config)?;
        }
        Command::Add { stage, images } => {
            let config = Config::from_directory(&cli.project, stage)?;
            add(&config, images)?;
            build_site(&config)?;
        }
        Command::NewImages => {
            let config = Config::from_directory(&cli.project, Stage::Dev)?;
            let known = RecordSource::new(&config.project_file).pages()?;
            for filename in new_images(&config.image_directory, &known)? {
                println!("{}", filename);
            }
        }
        Command::Publish { stage } => {
            let config = Config::from_directory(&cli.project, stage)?;
            let store = MirrorStore::new(&config.mirror_directory);
            let stored = mirror_tree(&store, &config.output_directory)?;
            info!(files = stored, mirror = %config.mirror_directory.display(), "Published site");
        }
    }
    Ok(())
}

fn add(config: &Config, images: Vec<String>) -> Result<()> {
    let filenames = if images.is_empty() {
        let known = RecordSource::new(&config.project_file).pages()?;
        new_images(&config.image_directory, &known)?
    } else {
        images
    };
    if filenames.is_empty() {
        info!("No new images");
        return Ok(());
    }

    let prompt = Prompt::new(
        io::stdin().lock(),
        io::stdout(),
        filenames,
        &config.site.image_root,
        config.site.url.as_str(),
        Local::now().date_naive(),
    );
    let pages = prompt.pages()?;

    let persister = RecordPersister::new(&config.project_file);
    let store = MirrorStore::new(&config.mirror_directory);
    let announcer = OutboxAnnouncer::new(&config.outbox_directory);
    let release = Release {
        site: &config.site,
        image_directory: &config.image_directory,
        persist: &persister,
        store: &store,
        announce: &announcer,
    };
    for page in &pages {
        release.release(page)?;
    }
    Ok(())
}
