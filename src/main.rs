use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use outfit_tunes::config::{AppConfig, CliConfig, FileConfig};
use outfit_tunes::server::{run_server, RequestsLoggingLevel};
use outfit_tunes::{OutfitPipeline, Recommendation};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[clap(version, about = "Suggests Spotify tracks that match an outfit photo")]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// API key for the vision model endpoint.
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Spotify application client id.
    #[clap(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub spotify_client_id: Option<String>,

    /// Spotify application client secret.
    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    /// Vision model name.
    #[clap(long)]
    pub model: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one photo and print the matching tracks.
    Analyze {
        /// Path to the outfit photo.
        #[clap(value_parser = parse_path)]
        image: PathBuf,

        /// Print the whole recommendation as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Run the HTTP upload server.
    Serve {
        /// The port to listen on.
        #[clap(short, long, default_value_t = 3001)]
        port: u16,

        /// The level of logging to perform on each request.
        #[clap(long, default_value = "path")]
        logging_level: RequestsLoggingLevel,
    },
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        let mut cli_config = CliConfig {
            openai_api_key: self.openai_api_key.clone(),
            spotify_client_id: self.spotify_client_id.clone(),
            spotify_client_secret: self.spotify_client_secret.clone(),
            model: self.model.clone(),
            ..Default::default()
        };
        if let Command::Serve {
            port,
            logging_level,
        } = &self.command
        {
            cli_config.port = *port;
            cli_config.logging_level = logging_level.clone();
        }
        cli_config
    }
}

fn print_recommendation(recommendation: &Recommendation) {
    let analysis = &recommendation.analysis;

    println!("Outfit analysis");
    println!("  Description: {}", analysis.image_description);
    println!("  Main character: {}", analysis.main_character);
    if !analysis.outfit_characteristics.is_empty() {
        println!("  Outfit: {}", analysis.outfit_characteristics.join(", "));
    }
    if !analysis.background_aesthetics.is_empty() {
        println!("  Aesthetic: {}", analysis.background_aesthetics.join(", "));
    }
    println!("  Predicted genres: {}", analysis.music_genre.join(", "));

    if recommendation.genres.used_fallback {
        println!(
            "No matching genres found! Defaulting to {}.",
            recommendation
                .genres
                .genres
                .first()
                .map(|g| g.as_tag())
                .unwrap_or_default()
        );
    }
    let tags: Vec<&str> = recommendation
        .genres
        .genres
        .iter()
        .map(|g| g.as_tag())
        .collect();
    println!("Searching genres: {}", tags.join(", "));
    println!();

    if !recommendation.has_tracks() {
        println!("No songs found matching the outfit style.");
        return;
    }

    println!("Recommended songs");
    for (index, track) in recommendation.tracks.iter().enumerate() {
        println!("{:>2}. {} - {} ({})", index + 1, track.name, track.artist, track.url);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Logs go to stderr so `analyze --json` output stays machine readable.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;
    let pipeline = OutfitPipeline::from_config(&app_config)?;

    match cli_args.command {
        Command::Analyze { image, json } => {
            let recommendation = pipeline.recommend_file(&image).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&recommendation)?);
            } else {
                print_recommendation(&recommendation);
            }
            Ok(())
        }
        Command::Serve { .. } => {
            info!(
                "Starting server on port {} (request logging: {})",
                app_config.server.port, app_config.server.requests_logging_level
            );
            run_server(app_config.server, Arc::new(pipeline)).await
        }
    }
}
