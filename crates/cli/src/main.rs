//! Vitrine CLI - browse and edit a remote product catalog.
//!
//! # Usage
//!
//! ```bash
//! # First page of the unfiltered catalog
//! vitrine list
//!
//! # Search, then page through the results
//! vitrine list --search phone --page 2
//!
//! # Create a product
//! vitrine create --title "Phone X" --price 199.99 --category smartphones
//!
//! # Run several commands against one catalog session
//! vitrine shell
//! ```
//!
//! # Commands
//!
//! - `list` - Show a page of products for a search or category
//! - `categories` - Show the category listing
//! - `show` - Show one product
//! - `create` / `update` / `delete` - Edit the catalog
//! - `shell` - Read commands from stdin, one per line, sharing one store
//!
//! # Environment Variables
//!
//! See [`vitrine_client::config`]; `--api-url` overrides `CATALOG_API_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_client::{CatalogClient, CatalogConfig, CatalogStore};
use vitrine_core::ProductId;

mod commands;

use commands::{CommandError, Output};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Browse and edit a remote product catalog")]
struct Cli {
    /// Catalog service base URL (overrides `CATALOG_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a page of products
    List(ListArgs),
    /// Show the category listing
    Categories,
    /// Show one product
    Show {
        /// Product ID
        id: ProductId,
    },
    /// Create a product
    Create(ProductFields),
    /// Update a product; omitted fields keep their current values
    Update {
        /// Product ID
        id: ProductId,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Delete {
        /// Product ID
        id: ProductId,
    },
    /// Read commands from stdin, one per line, against one catalog session
    Shell,
}

#[derive(Args, Debug, Default)]
struct ListArgs {
    /// 1-based page number
    #[arg(short, long)]
    page: Option<u32>,

    /// Free-text search term (empty clears it)
    #[arg(short, long)]
    search: Option<String>,

    /// Category slug (empty for all categories)
    #[arg(short, long)]
    category: Option<String>,
}

/// Product form fields. Required on create, optional on update.
#[derive(Args, Debug, Default)]
struct ProductFields {
    /// Product title
    #[arg(short, long)]
    title: Option<String>,

    /// Unit price, e.g. 12.50
    #[arg(short, long)]
    price: Option<String>,

    /// Category slug
    #[arg(short, long)]
    category: Option<String>,

    /// Description
    #[arg(short, long)]
    description: Option<String>,

    /// Image URL
    #[arg(short, long)]
    image: Option<String>,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CatalogConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry
                .environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry.sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitrine_client=info,vitrine_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.api_url.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn load_config(api_url: Option<&str>) -> Result<CatalogConfig, vitrine_client::ConfigError> {
    let mut config = CatalogConfig::from_env()?;
    if let Some(url) = api_url {
        config.api_url = CatalogConfig::for_url(url)?.api_url;
    }
    Ok(config)
}

async fn run(cli: Cli, config: &CatalogConfig) -> Result<(), CommandError> {
    let client = CatalogClient::new(config)?;
    let store = CatalogStore::new(client, config.page_size);
    let output = Output { json: cli.json };

    match cli.command {
        Commands::Shell => commands::shell::run(&store, output).await,
        command => execute(&store, command, output).await,
    }
}

/// Run one command against the store.
async fn execute(
    store: &CatalogStore,
    command: Commands,
    output: Output,
) -> Result<(), CommandError> {
    match command {
        Commands::List(args) => {
            commands::products::list(store, args.search, args.category, args.page, output).await
        }
        Commands::Categories => commands::categories::list(store, output).await,
        Commands::Show { id } => commands::products::show(store, id, output).await,
        Commands::Create(fields) => {
            commands::products::create(store, fields.into_form(), output).await
        }
        Commands::Update { id, fields } => {
            commands::products::update(store, id, fields.into_patch(), output).await
        }
        Commands::Delete { id } => commands::products::delete(store, id, output).await,
        Commands::Shell => Err(CommandError::Usage(
            "already reading commands from stdin".to_string(),
        )),
    }
}

impl ProductFields {
    /// Form input for a new product; omitted fields are blank.
    fn into_form(self) -> vitrine_core::ProductForm {
        vitrine_core::ProductForm {
            title: self.title.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            image_url: self.image.unwrap_or_default(),
        }
    }

    fn into_patch(self) -> commands::products::FormPatch {
        commands::products::FormPatch {
            title: self.title,
            price: self.price,
            description: self.description,
            category: self.category,
            image_url: self.image,
        }
    }
}
