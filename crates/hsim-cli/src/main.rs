//! hsim: two-phase key agreement and message exchange simulator
//!
//! Commands:
//!   run                       - interactive PART I / PART II flow
//!   keygen [--reuse|--fresh]  - Phase 1: private exponent `a` and `AA = g^a mod p`
//!   derive-key [--peer HEX]   - session key `S` from `a` and the peer's public value
//!   reverse [--message HEX]   - Phase 2: decrypt, reverse and re-encrypt the message
//!   config show               - display current configuration
//!
//! Slot files live in the configured directory (`--dir` overrides it). Secret
//! values are printed only with `--echo`.

mod prompt;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use hsim_core::config::HsimConfig;
use hsim_core::{HsimError, Slot};
use hsim_crypto::DomainParameters;
use hsim_sim::{
    keygen::has_key_material, run_derive_key, run_exchange, run_keygen, DirStore, Echo, EchoFn,
    KeyPolicy, MessageSource, SlotStore,
};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "hsim",
    version,
    about = "Diffie-Hellman + AES-128-CBC exchange simulator",
    long_about = "hsim: agree on a session key and answer an encrypted message with its reversal"
)]
struct Cli {
    /// Path to hsim.toml configuration file
    #[arg(long, short = 'c', env = "HSIM_CONFIG", default_value = "hsim.toml")]
    config: PathBuf,

    /// Directory holding the slot files (overrides config)
    #[arg(long, short = 'd', env = "HSIM_DIR", global = true)]
    dir: Option<PathBuf>,

    /// Log level (overrides config; RUST_LOG takes precedence)
    #[arg(long, env = "HSIM_LOG", global = true)]
    log: Option<String>,

    /// Log format (overrides config)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    /// Print secret values (exponent, session key, plaintexts) to stdout
    #[arg(long, global = true)]
    echo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive flow: asks whether to run PART I and PART II
    Run,

    /// Phase 1: generate or reuse the Diffie-Hellman key material
    Keygen(KeygenArgs),

    /// Derive the AES session key from `a` and the peer's public value
    #[command(name = "derive-key")]
    DeriveKey {
        /// Peer public value as hex (replaces the stored one)
        #[arg(long)]
        peer: Option<String>,
    },

    /// Phase 2: decrypt the message, reverse it and re-encrypt it
    Reverse {
        /// Encrypted message as hex, `IV || ciphertext` (replaces the stored one)
        #[arg(long, short = 'm')]
        message: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct KeygenArgs {
    /// Reuse the stored pair when present
    #[arg(long)]
    reuse: bool,
    /// Always generate a new pair
    #[arg(long)]
    fresh: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    fn from_config(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

/// 2 when the operator's input or stored slots are at fault, 1 otherwise.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<HsimError>() {
        Some(e) if e.is_input_error() => 2,
        _ => 1,
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_found = cli.config.exists();
    let mut config = HsimConfig::load(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;
    if let Some(dir) = &cli.dir {
        config.slots.dir = dir.clone();
    }

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli
        .log_format
        .unwrap_or_else(|| LogFormat::from_config(&config.log.format));
    init_logging(&level, format);
    if !config_found {
        debug!(path = %cli.config.display(), "no config file, using defaults");
    }

    let store = DirStore::new(config.slots.clone());
    let params = DomainParameters::standard();
    let hook = cli.echo.then(console_echo);
    let hook = hook.as_ref();

    match cli.command {
        Commands::Run => {
            let stdin = std::io::stdin();
            cmd_run(&store, params, hook, &mut stdin.lock(), &mut std::io::stdout()).await
        }
        Commands::Keygen(args) => cmd_keygen(&store, params, &args, hook).await,
        Commands::DeriveKey { peer } => cmd_derive_key(&store, params, peer.as_deref(), hook).await,
        Commands::Reverse { message } => {
            let source = message.map_or(MessageSource::Stored, MessageSource::Provided);
            cmd_reverse(&store, source, hook, &mut std::io::stdout()).await
        }
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout is reserved for prompts and results
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn console_echo() -> EchoFn {
    Box::new(|value| match value {
        Echo::Plaintext(text) => println!("Decrypted message: {text}"),
        Echo::Reversed(text) => println!("Reversed message: {text}"),
        other => println!("Value of '{}': {}", other.label(), other.value()),
    })
}

// ── `hsim run` ────────────────────────────────────────────────────────────────

async fn cmd_run<R: BufRead, W: Write>(
    store: &DirStore,
    params: &DomainParameters,
    hook: Option<&EchoFn>,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    if prompt::confirm(input, output, "Execute PART I?")? {
        let policy = if has_key_material(store).await? {
            choose_policy(store, input, output)?
        } else {
            KeyPolicy::Regenerate
        };
        keygen(store, params, policy, hook, output).await?;
    }

    if prompt::confirm(input, output, "Execute PART II?")? {
        let source = choose_message(store, input, output).await?;
        cmd_reverse(store, source, hook, output).await?;
    }

    Ok(())
}

fn choose_policy<R: BufRead, W: Write>(
    store: &DirStore,
    input: &mut R,
    output: &mut W,
) -> Result<KeyPolicy> {
    let question = format!(
        "Files '{}' and '{}' with values found! Use existing values?",
        file_name(store, Slot::PrivateExponent),
        file_name(store, Slot::PublicValue),
    );
    Ok(if prompt::confirm(input, output, &question)? {
        KeyPolicy::ReuseExisting
    } else {
        KeyPolicy::Regenerate
    })
}

async fn choose_message<R: BufRead, W: Write>(
    store: &DirStore,
    input: &mut R,
    output: &mut W,
) -> Result<MessageSource> {
    if store.exists(Slot::Message).await? {
        let question = format!(
            "The file '{}' exists. Do you want to use the existing message?",
            file_name(store, Slot::Message)
        );
        if prompt::confirm(input, output, &question)? {
            return Ok(MessageSource::Stored);
        }
    }

    let hex = prompt::ask(input, output, "Enter the encrypted message (in hexadecimal):")?
        .context("no message entered")?;
    Ok(MessageSource::Provided(hex))
}

// ── `hsim keygen` ─────────────────────────────────────────────────────────────

async fn cmd_keygen(
    store: &DirStore,
    params: &DomainParameters,
    args: &KeygenArgs,
    hook: Option<&EchoFn>,
) -> Result<()> {
    let policy = if args.fresh {
        KeyPolicy::Regenerate
    } else if args.reuse || !has_key_material(store).await? {
        KeyPolicy::ReuseExisting
    } else {
        let stdin = std::io::stdin();
        choose_policy(store, &mut stdin.lock(), &mut std::io::stdout())?
    };

    keygen(store, params, policy, hook, &mut std::io::stdout()).await
}

async fn keygen<W: Write>(
    store: &DirStore,
    params: &DomainParameters,
    policy: KeyPolicy,
    hook: Option<&EchoFn>,
    out: &mut W,
) -> Result<()> {
    let outcome = run_keygen(store, params, policy, hook)
        .await
        .context("Phase 1 failed")?;

    // AA is public: always shown, unlike `a`
    writeln!(out, "Value of 'AA': {}", outcome.public_value.to_hex())?;
    let verb = if outcome.reused { "Reusing" } else { "Saved" };
    writeln!(
        out,
        "{verb} key material in '{}' and '{}'.",
        store.path(Slot::PrivateExponent).display(),
        store.path(Slot::PublicValue).display(),
    )?;
    writeln!(
        out,
        "Send the file '{}' to the professor.",
        file_name(store, Slot::PublicValue)
    )?;
    Ok(())
}

// ── `hsim derive-key` ─────────────────────────────────────────────────────────

async fn cmd_derive_key(
    store: &DirStore,
    params: &DomainParameters,
    peer: Option<&str>,
    hook: Option<&EchoFn>,
) -> Result<()> {
    run_derive_key(store, params, peer, hook)
        .await
        .context("session key derivation failed")?;

    println!(
        "Session key saved in '{}'.",
        store.path(Slot::SessionKey).display()
    );
    Ok(())
}

// ── `hsim reverse` ────────────────────────────────────────────────────────────

async fn cmd_reverse<W: Write>(
    store: &DirStore,
    source: MessageSource,
    hook: Option<&EchoFn>,
    out: &mut W,
) -> Result<()> {
    run_exchange(store, source, hook)
        .await
        .context("Phase 2 failed")?;

    let name = file_name(store, Slot::MessageInverted);
    writeln!(out, "Reversed encrypted message saved in '{name}'.")?;
    writeln!(out, "Send the file '{name}' to the professor.")?;
    Ok(())
}

// ── `hsim config show` ────────────────────────────────────────────────────────

fn cmd_config_show(config: &HsimConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

fn file_name(store: &DirStore, slot: Slot) -> String {
    store
        .path(slot)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| slot.to_string())
}
