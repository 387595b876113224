use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use metrics_core::{Builder, Drain, Observe};
use metrics_observer_yaml::{YamlBuilder, YamlObserver};
use metrics_runtime::{Controller, Receiver};
use structopt::StructOpt;
use tracing::info;
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use bookshelf_backend::database::Database;
use bookshelf_backend::password::PasswordHasher;
use bookshelf_server::api::SearchScopeKind;
use bookshelf_server::serve::serve;

#[derive(Debug, StructOpt)]
#[structopt(name = "server", about = "Bookshelf server")]
struct Opt {
  /// Database file to use. Relative paths are resolved relative to the current directory
  #[structopt(long, env = "BOOKSHELF_DATABASE_URL", parse(from_os_str))]
  database_file: PathBuf,

  /// Address (IP:port) to bind the HTTP server to
  #[structopt(long, env = "BOOKSHELF_BIND_ADDRESS", default_value = "127.0.0.1:8088")]
  bind_address: String,
  /// Password hasher secret key to use
  #[structopt(long, env = "BOOKSHELF_PASSWORD_HASHER_SECRET_KEY")]
  password_hasher_secret_key: String,
  /// Cookie identity secret key to use, at least 32 bytes long
  #[structopt(long, env = "BOOKSHELF_COOKIE_IDENTITY_SECRET_KEY")]
  cookie_identity_secret_key: String,
  /// Number of hours after which a login session expires. Sessions do not expire when not set
  #[structopt(long, env = "BOOKSHELF_SESSION_MAX_AGE_HOURS")]
  session_max_age_hours: Option<i64>,

  /// Books found by searching: those of all users ('global'), or only those of the searching user ('owned')
  #[structopt(long, env = "BOOKSHELF_SEARCH_SCOPE", default_value = "global")]
  search_scope: SearchScopeKind,

  /// Minimum level at which tracing events will be printed to stderr
  #[structopt(long, env = "BOOKSHELF_TRACING_LEVEL", default_value = "WARN")]
  tracing_level: tracing::Level,
  /// Whether to print metrics to stderr before the program exits
  #[structopt(long, env = "BOOKSHELF_PRINT_METRICS")]
  print_metrics: bool,
}

const MIN_COOKIE_IDENTITY_SECRET_KEY_LENGTH: usize = 32;

fn main() -> Result<()> {
  // Load environment variables from .env file, before parsing command-line arguments, as some options can use
  // environment variables as defaults.
  dotenv::dotenv().ok();
  // Parse command-line arguments.
  let opt: Opt = Opt::from_args();
  if opt.cookie_identity_secret_key.len() < MIN_COOKIE_IDENTITY_SECRET_KEY_LENGTH {
    bail!("Cookie identity secret key must be at least {} bytes long", MIN_COOKIE_IDENTITY_SECRET_KEY_LENGTH);
  }
  // Setup tracing
  let subscriber = FmtSubscriber::builder()
    .with_writer(std::io::stderr)
    .with_max_level(opt.tracing_level.clone())
    .finish();
  tracing::subscriber::set_global_default(subscriber)
    .with_context(|| "Failed to initialize global tracing subscriber")?;
  // Setup log to forward to tracing.
  LogTracer::init()
    .with_context(|| "Failed to initialize log to tracing forwarder")?;
  // Setup metrics
  let metrics_receiver: Receiver = Receiver::builder().build()
    .with_context(|| "Failed to initialize metrics receiver")?;
  let controller: Controller = metrics_receiver.controller();
  let mut observer: YamlObserver = YamlBuilder::new().build();
  metrics_receiver.install();
  // Create database
  let database = Database::new(
    opt.database_file.to_string_lossy(),
    PasswordHasher::new(opt.password_hasher_secret_key.as_bytes()),
    opt.session_max_age_hours.map(chrono::Duration::hours),
  ).with_context(|| "Failed to create database")?;
  // Run HTTP server
  let search_scope = opt.search_scope;
  let bind_address = opt.bind_address.clone();
  let cookie_identity_secret_key = opt.cookie_identity_secret_key.clone().into_bytes();
  info!(%bind_address, ?search_scope, "Starting server");
  actix_rt::System::new()
    .block_on(async move { serve(database, search_scope, bind_address, cookie_identity_secret_key).await })
    .with_context(|| "HTTP server failed")?;
  // Print metrics
  if opt.print_metrics {
    controller.observe(&mut observer);
    let output = observer.drain();
    info!(metrics = %output);
  }
  Ok(())
}
