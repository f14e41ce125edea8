use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use paybot::application::workflow::ApprovalWorkflow;
use paybot::config::{BotConfig, BotToken};
use paybot::domain::chat::UserId;
use paybot::domain::order::TransitionPolicy;
use paybot::domain::ports::{NotifierBox, OrderStoreBox};
use paybot::domain::price::Price;
use paybot::error::BotError;
use paybot::infrastructure::in_memory::InMemoryOrderStore;
use paybot::infrastructure::sqlite::SqliteOrderStore;
use paybot::interfaces::jsonl::notifier::JsonLinesNotifier;
use paybot::interfaces::jsonl::update_reader::UpdateReader;
use rust_decimal::Decimal;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncRead, BufReader};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Sqlite,
    Rocksdb,
    Memory,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bot authentication token for the chat transport
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    token: BotToken,

    /// User id of the administrator who resolves payments
    #[arg(long, env = "ADMIN_ID")]
    admin_id: i64,

    /// Link delivered to users once their payment is approved
    #[arg(long, env = "CONTENT_LINK")]
    content_link: String,

    /// Unit price shown in the payment instructions
    #[arg(long, env = "PRICE", default_value = "20")]
    price: Decimal,

    /// QR code image users pay through
    #[arg(long = "qr-image", env = "QR_IMAGE_PATH", default_value = "payment_qr.jpg")]
    qr_image_path: PathBuf,

    /// Location of the order store
    #[arg(long, env = "DB_PATH", default_value = "orders.db")]
    db_path: PathBuf,

    /// Storage engine for orders
    #[arg(long, env = "STORE_BACKEND", value_enum, default_value_t = Backend::Sqlite)]
    backend: Backend,

    /// Whether a decision may overwrite an already resolved order ("lenient")
    /// or only resolve pending ones ("strict")
    #[arg(long, env = "TRANSITION_POLICY", default_value = "lenient")]
    transition_policy: TransitionPolicy,

    /// JSON-lines file of inbound updates. Reads stdin when omitted.
    #[arg(long)]
    updates: Option<PathBuf>,
}

impl Cli {
    fn bot_config(&self) -> Result<BotConfig> {
        let config = BotConfig {
            token: self.token.clone(),
            admin_id: UserId(self.admin_id),
            price: Price::new(self.price).into_diagnostic()?,
            content_link: self.content_link.trim().to_string(),
            qr_image_path: self.qr_image_path.clone(),
            transition_policy: self.transition_policy,
        };
        config.validate().into_diagnostic()?;
        Ok(config)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paybot=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

async fn open_sqlite(path: &Path) -> Result<OrderStoreBox> {
    let store = SqliteOrderStore::open(path).await.into_diagnostic()?;
    info!(path = %path.display(), "using SQLite order store");
    Ok(Box::new(store))
}

#[cfg(feature = "storage-rocksdb")]
async fn open_rocksdb(path: &Path) -> Result<OrderStoreBox> {
    let store = paybot::infrastructure::rocksdb::RocksDBOrderStore::open(path).into_diagnostic()?;
    info!(path = %path.display(), "using RocksDB order store");
    Ok(Box::new(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
async fn open_rocksdb(path: &Path) -> Result<OrderStoreBox> {
    warn!(
        "RocksDB storage requested via --backend, but 'storage-rocksdb' feature is not enabled. Falling back to SQLite storage."
    );
    open_sqlite(path).await
}

async fn open_store(backend: Backend, path: &Path) -> Result<OrderStoreBox> {
    match backend {
        Backend::Sqlite => open_sqlite(path).await,
        Backend::Rocksdb => open_rocksdb(path).await,
        Backend::Memory => {
            info!("using in-memory order store; orders are lost on exit");
            Ok(Box::new(InMemoryOrderStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Arc::new(cli.bot_config()?);
    if !config.qr_image_path.is_file() {
        warn!(path = %config.qr_image_path.display(), "QR image not found; /get will reference a missing file");
    }

    let orders = open_store(cli.backend, &cli.db_path).await?;
    let notifier: NotifierBox = Box::new(JsonLinesNotifier::new(tokio::io::stdout()));

    info!(
        bot = %config.token,
        admin = %config.admin_id,
        price = %config.price,
        policy = %config.transition_policy,
        "Bot started"
    );
    let workflow = ApprovalWorkflow::new(config, orders, notifier);

    let source: Box<dyn AsyncRead + Unpin + Send> = match &cli.updates {
        Some(path) => Box::new(tokio::fs::File::open(path).await.into_diagnostic()?),
        None => Box::new(tokio::io::stdin()),
    };
    let mut updates = UpdateReader::new(BufReader::new(source));

    while let Some(next) = updates.next_update().await {
        match next {
            Ok(update) => {
                if let Err(e) = workflow.handle(update).await {
                    error!(error = %e, "Error handling update");
                }
            }
            Err(BotError::IoError(e)) => {
                error!(error = %e, "Update source failed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Error reading update");
            }
        }
    }

    info!("Update stream closed, shutting down");
    Ok(())
}
