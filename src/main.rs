//! The `cables` command line tool.

use cables_cli::{AssetMode, CONFIG_FILENAME, CablesClient, ExportOptions, Result};
use clap::Parser;
use dialoguer::Password;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cables", author, version, about, long_about = None)]
struct Cli {
    /// Export the patch with this id
    #[arg(short = 'e', long, value_name = "PATCH_ID")]
    export: Option<String>,

    /// Fetch only the compiled code of one or more patches (comma separated)
    /// and write it as ops.js
    #[arg(short = 'C', long, value_name = "PATCH_IDS")]
    code: Option<String>,

    /// Deploy an exported directory to this site
    #[arg(long, value_name = "SITE_ID")]
    deploy: Option<String>,

    /// Directory to deploy, defaults to the current directory
    #[arg(short = 's', long, value_name = "DIR")]
    src: Option<PathBuf>,

    /// Where to put the export; a bare flag puts it into "patch"
    #[arg(short = 'd', long, value_name = "DIR", num_args = 0..=1, default_missing_value = "")]
    destination: Option<String>,

    /// Leave out the index.html
    #[arg(short = 'i', long = "no-index")]
    no_index: bool,

    /// Keep the downloaded archive instead of extracting it
    #[arg(short = 'x', long = "no-extract")]
    no_extract: bool,

    /// Name the patch config json inside the export
    #[arg(short = 'j', long = "json-filename", value_name = "NAME")]
    json_filename: Option<String>,

    /// Combine the patch code into a single js file
    #[arg(short = 'c', long = "combine-js")]
    combine_js: bool,

    /// Talk to the dev server instead of production
    #[arg(short = 'D', long)]
    dev: bool,

    /// Hide the "made with cables" badge
    #[arg(short = 'H', long = "hideMadeWithCables")]
    hide_made_with_cables: bool,

    /// Which assets to include: auto, all or none
    #[arg(short = 'a', long, value_name = "MODE")]
    assets: Option<String>,

    /// Leave out backup files
    #[arg(short = 'b', long = "skip-backups")]
    skip_backups: bool,

    /// Flatten the asset directory structure
    #[arg(short = 'f', long = "no-subdirs")]
    no_subdirs: bool,

    /// Skip code minification
    #[arg(short = 'm', long = "no-minify")]
    no_minify: bool,

    /// Ask the server for sourcemaps
    #[arg(long)]
    sourcemaps: bool,

    /// Minify shader code
    #[arg(long = "minify-glsl")]
    minify_glsl: bool,

    /// Override the cables server url
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Use this api key instead of the stored one and remember it
    #[arg(long = "api-key", value_name = "KEY")]
    api_key: Option<String>,
}

impl Cli {
    fn to_options(&self, patch_id: String) -> ExportOptions {
        let mut options = ExportOptions::new(patch_id);
        options.destination = self.destination.clone();
        options.no_index = self.no_index;
        options.no_extract = self.no_extract;
        options.json_filename = self.json_filename.clone();
        options.combine_js = self.combine_js;
        options.dev = self.dev;
        options.hide_made_with_cables = self.hide_made_with_cables;
        options.assets = self
            .assets
            .as_deref()
            .map(AssetMode::from)
            .unwrap_or_default();
        options.skip_backups = self.skip_backups;
        options.no_subdirs = self.no_subdirs;
        options.no_minify = self.no_minify;
        options.sourcemaps = self.sourcemaps;
        options.minify_glsl = self.minify_glsl;
        options.url = self.url.clone();
        options.api_key = self.api_key.clone();
        options
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli).await {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let mut client = CablesClient::new()?;

    if let Some(patch_id) = &cli.export {
        let options = cli.to_options(patch_id.clone());
        ensure_api_key(&mut client, &options)?;
        let final_path = client.export(&options).await?;
        println!("{}", final_path.display());
        return Ok(());
    }

    if let Some(patch_ids) = &cli.code {
        let options = cli.to_options(patch_ids.clone());
        ensure_api_key(&mut client, &options)?;
        let final_path = client.export_code(&options).await?;
        println!("{}", final_path.display());
        return Ok(());
    }

    if let Some(site_id) = &cli.deploy {
        ensure_netlify_token(&mut client)?;
        let url = client.deploy(site_id, cli.src.as_deref()).await?;
        println!("{url}");
        return Ok(());
    }

    eprintln!("neither --export, --code nor --deploy defined with correct parameters");
    std::process::exit(2);
}

/// Prompts for and stores an API key when neither the options nor the
/// config file carry one.
fn ensure_api_key(client: &mut CablesClient, options: &ExportOptions) -> Result<()> {
    let explicit = options.api_key.as_deref().is_some_and(|k| !k.is_empty());
    if explicit || client.store().api_key().is_some() {
        return Ok(());
    }

    println!("NO CONFIG FOUND!");
    let key = Password::new().with_prompt("paste your apikey").interact()?;
    client.store_mut().set_api_key(key);
    client.store_mut().save()?;
    println!("api key saved in ~/{CONFIG_FILENAME}");
    Ok(())
}

/// Prompts for and stores a Netlify access token when the config file has
/// none.
fn ensure_netlify_token(client: &mut CablesClient) -> Result<()> {
    if client.store().netlify_token().is_some() {
        return Ok(());
    }

    println!("NO CONFIG FOUND!");
    let token = Password::new()
        .with_prompt("paste your netlify access token")
        .interact()?;
    client.store_mut().set_netlify_token(token);
    client.store_mut().save()?;
    println!("netlify access token saved in ~/{CONFIG_FILENAME}");
    Ok(())
}
