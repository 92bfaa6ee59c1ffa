//! deployconf CLI
//!
//! Loads the project's deployment configuration and prints what the external
//! toolchain needs: network bindings, compiler settings, test-runner options
//! and the contract-size report.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use deployconf::{
    compiler::CompilerInvocation,
    config::{LogFormat, LoggingConfig, ProjectConfig, TestRunnerConfig, load_config},
    env::EnvSnapshot,
    network::resolve_network,
    plugins::{EIP170_LIMIT_KIB, SizeOptions, run_contract_size},
};
use std::collections::BTreeMap;
use std::fs;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::Layered, prelude::*, reload,
};

const DEFAULT_LOG_LEVEL: &str = "info";

/// Smart-contract deployment configuration
#[derive(Parser, Debug)]
#[command(name = "deployconf")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "DEPLOYCONF_CONFIG", global = true)]
    config: Option<String>,

    /// Path to a .env file layered under the process environment
    #[arg(long, env = "DEPLOYCONF_ENV_FILE", default_value = ".env", global = true)]
    env_file: String,

    /// Log level (trace, debug, info, warn, error); overrides logging.level
    #[arg(long, env = "DEPLOYCONF_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format; overrides logging.format
    #[arg(long, env = "DEPLOYCONF_LOG_FORMAT", global = true)]
    log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the loaded configuration
    Show {
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Resolve one network and print its redacted provider binding
    Resolve {
        /// Network name as declared under [networks]
        #[arg(short, long)]
        network: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Print solc settings, or a full standard-JSON input when sources are given
    Compiler {
        /// Solidity source files to embed
        #[arg(long, num_args = 1..)]
        sources: Vec<String>,
    },

    /// Report deployed bytecode sizes from the build directory
    Size {
        /// Only report these contracts
        #[arg(long, value_delimiter = ',')]
        contracts: Vec<String>,

        /// Skip contracts whose name ends in "Mock"
        #[arg(long)]
        ignore_mocks: bool,

        /// Show sizes in bytes instead of KiB
        #[arg(long)]
        size_in_bytes: bool,

        /// Fail if any contract exceeds this many KiB (24 if no value is given)
        #[arg(long, num_args = 0..=1, default_missing_value = "24")]
        check_max_size: Option<f64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Print the effective test-runner options
    TestOptions,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
    Toml,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type BoxedFmtLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Handles for swapping in the `[logging]` section once the config is loaded
struct LogHandles {
    filter: reload::Handle<EnvFilter, Registry>,
    format: reload::Handle<BoxedFmtLayer, FilteredRegistry>,
    /// RUST_LOG was set and wins over any configured level
    filter_from_env: bool,
}

// Logs go to stderr so stdout stays machine-readable.
fn fmt_layer(format: LogFormat) -> BoxedFmtLayer {
    match format {
        LogFormat::Pretty => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    }
}

fn cli_log_format(args: &Args) -> Option<LogFormat> {
    args.log_format.map(|f| match f {
        LogFormatArg::Json => LogFormat::Json,
        LogFormatArg::Pretty => LogFormat::Pretty,
    })
}

type LogSubscriber = Layered<reload::Layer<BoxedFmtLayer, FilteredRegistry>, FilteredRegistry>;

/// Build the bootstrap subscriber from CLI arguments, or from `env_filter`
/// (RUST_LOG) when it is set.
fn build_subscriber(args: &Args, env_filter: Option<EnvFilter>) -> (LogSubscriber, LogHandles) {
    let filter_from_env = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| {
        EnvFilter::new(args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
    });

    let (filter, filter_handle) = reload::Layer::new(filter);
    let (format, format_handle) =
        reload::Layer::new(fmt_layer(cli_log_format(args).unwrap_or_default()));

    let subscriber = tracing_subscriber::registry().with(filter).with(format);
    let handles = LogHandles {
        filter: filter_handle,
        format: format_handle,
        filter_from_env,
    };
    (subscriber, handles)
}

/// Install the subscriber before anything is loaded, so source selection
/// is logged.
fn init_tracing(args: &Args) -> LogHandles {
    let (subscriber, handles) = build_subscriber(args, EnvFilter::try_from_default_env().ok());
    subscriber.init();
    handles
}

/// Apply `[logging]` where neither RUST_LOG nor the CLI already decided.
fn apply_logging_config(args: &Args, handles: &LogHandles, logging: &LoggingConfig) {
    if !handles.filter_from_env && args.log_level.is_none() {
        if let Err(e) = handles.filter.reload(EnvFilter::new(&logging.level)) {
            warn!(error = %e, "Failed to apply logging.level");
        }
    }

    if cli_log_format(args).is_none() && logging.format != LogFormat::default() {
        if let Err(e) = handles.format.reload(fmt_layer(logging.format)) {
            warn!(error = %e, "Failed to apply logging.format");
        }
    }
}

// Logs the configured u64 directly; `Duration::as_millis` is u128.
fn log_test_timeouts(runner: &TestRunnerConfig) {
    match runner.effective_timeout() {
        Some(_) => info!(timeout_ms = runner.timeout_ms, "Test timeouts enabled"),
        None => info!("Test timeouts disabled"),
    }
}

fn print_config(config: &ProjectConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Toml => print!("{}", toml::to_string_pretty(config)?),
        OutputFormat::Pretty => {
            println!("build output: {}", config.build_output_directory.display());
            println!(
                "compiler:     solc {} (optimizer {}, {} runs)",
                config.compiler.version,
                if config.compiler.optimizer.enabled { "on" } else { "off" },
                config.compiler.optimizer.runs
            );
            println!(
                "test runner:  timeouts {}",
                if config.test_runner.enable_timeouts { "enabled" } else { "disabled" }
            );
            println!("plugins:      {}", config.plugins.join(", "));
            println!("networks:");
            for (name, n) in &config.networks {
                println!(
                    "  {:<10} chain {:<8} gas {} @ {}  timeout {} blocks{}  [{} / {}]",
                    name,
                    n.chain_id,
                    n.gas_limit,
                    n.gas_price,
                    n.timeout_blocks,
                    if n.skip_dry_run { ", no dry run" } else { "" },
                    n.secret_env,
                    n.rpc_endpoint_env
                );
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_handles = init_tracing(&args);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting deployconf");

    // Capture the environment once; nothing below reads std::env directly.
    let env = EnvSnapshot::from_process_with_dotenv(&args.env_file)
        .inspect_err(|e| error!(error = %e, "Failed to read environment"))?;

    let config = load_config(args.config.as_deref(), &env)
        .inspect_err(|e| error!(error = %e, "Failed to load configuration"))?;

    apply_logging_config(&args, &log_handles, &config.logging);
    debug!(
        networks = config.networks.len(),
        plugins = config.plugins.len(),
        "Configuration loaded"
    );

    match args.command {
        Command::Show { format } => print_config(&config, format)?,

        Command::Resolve { network, format } => {
            let binding = resolve_network(&config, &network, &env)
                .inspect_err(|e| error!(error = %e, "Failed to resolve network"))?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&binding)?),
                OutputFormat::Toml => print!("{}", toml::to_string_pretty(&binding)?),
                OutputFormat::Pretty => {
                    println!("network:      {}", binding.network);
                    println!("chain id:     {}", binding.chain_id);
                    println!("endpoint:     {}", binding.endpoint);
                    println!("credential:   {}", binding.credential);
                    println!("gas limit:    {}", binding.gas_limit);
                    println!(
                        "gas price:    {} ({} wei)",
                        binding.gas_price,
                        binding.gas_price.wei()
                    );
                    println!("timeout:      {} blocks", binding.timeout_blocks);
                    println!("skip dry run: {}", binding.skip_dry_run);
                }
            }
        }

        Command::Compiler { sources } => {
            let invocation = CompilerInvocation::from_config(&config);
            if sources.is_empty() {
                println!("{}", serde_json::to_string_pretty(&invocation)?);
            } else {
                let mut contents = BTreeMap::new();
                for path in sources {
                    let content = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read source {}", path))?;
                    contents.insert(path, content);
                }
                let input = invocation.standard_json_input(&contents);
                println!("{}", serde_json::to_string_pretty(&input)?);
            }
        }

        Command::Size {
            contracts,
            ignore_mocks,
            size_in_bytes,
            check_max_size,
            format,
        } => {
            let options = SizeOptions {
                contracts,
                ignore_mocks,
                size_in_bytes,
                max_size_kib: check_max_size,
            };
            let report = run_contract_size(&config, &options)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Toml => print!("{}", toml::to_string_pretty(&report)?),
                OutputFormat::Pretty => print!("{}", report),
            }
            if report.has_oversized() {
                bail!(
                    "{} contract(s) exceed {} KiB (EIP-170 limit is {} KiB)",
                    report.oversized().len(),
                    check_max_size.unwrap_or(EIP170_LIMIT_KIB),
                    EIP170_LIMIT_KIB
                );
            }
        }

        Command::TestOptions => {
            let runner = &config.test_runner;
            println!("{}", serde_json::to_string_pretty(runner)?);
            log_test_timeouts(runner);
        }
    }

    Ok(())
}
