use clap::{Parser, Subcommand};
use log::{error, warn};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use recipe_cleaner::{
    fetch_recipe_with_settings, load_settings, parse_images, parse_text_with_config,
    GoogleVisionEngine, ImageSource, RecipeError, RecipeResponse,
};

#[derive(Parser)]
#[command(name = "recipe-cleaner")]
#[command(about = "Turn recipe pages, text and photos into clean structured recipes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a recipe page and extract its recipe
    Url {
        /// http:// or https:// address of the page
        url: String,
    },
    /// Parse pasted recipe text
    Text {
        /// Text file to read (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Recognise photographed recipe pages and parse them
    Images {
        /// Image files, in page order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()).await {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), RecipeError> {
    let settings = load_settings()?;

    let output = match cli.command {
        Commands::Url { url } => {
            let recipe = fetch_recipe_with_settings(&url, &settings).await?;
            serde_json::to_string_pretty(&RecipeResponse::from(recipe))?
        }
        Commands::Text { file } => {
            let text = match file {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => {
                    let mut text = String::new();
                    tokio::io::stdin().read_to_string(&mut text).await?;
                    text
                }
            };
            serde_json::to_string_pretty(&parse_text_with_config(&text, &settings.classifier))?
        }
        Commands::Images { files } => {
            let engine = GoogleVisionEngine::from_config(&settings.ocr)?;
            let sources: Vec<ImageSource> = files.into_iter().map(ImageSource::Path).collect();
            let (recipe, batch) = parse_images(&engine, &sources, &settings.classifier).await;
            if batch.failures() > 0 {
                warn!(
                    "{} of {} images could not be read (confidence {:.0})",
                    batch.failures(),
                    sources.len(),
                    batch.confidence
                );
            }
            serde_json::to_string_pretty(&recipe)?
        }
    };

    println!("{output}");
    Ok(())
}
