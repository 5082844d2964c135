use crate::config::request::{DebugRequest, DEFAULT_PROFILE_DELAY_SECS};
use crate::config::settings::{DebugSettings, DEFAULT_LOG_FILTER};
use crate::config::types::{DebugError, ExitStatus};
use crate::container::registry::FsRegistry;
use crate::container::resolver::ProcProbe;
use crate::control::UnixConnector;
use crate::exec::orchestrator::DebugOrchestrator;
use crate::kernel::signal::KillSender;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root directory holding container state (default: $SANDBOXCTL_ROOT or a per-user runtime dir)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Log filter for this command, in RUST_LOG syntax
    #[arg(long, global = true)]
    log_filter: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shows a variety of debug information
    Debug(DebugArgs),
}

#[derive(Args, Debug)]
pub struct DebugArgs {
    /// Sandbox process ID. Container ID is not necessary if this is set
    #[arg(long, default_value_t = 0)]
    pub pid: i32,
    /// Dumps all sandbox stacks to the log
    #[arg(long)]
    pub stacks: bool,
    /// Sends signal to the sandbox
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub signal: i32,
    /// Writes heap profile to the given file
    #[arg(long, value_name = "FILE")]
    pub profile_heap: Option<PathBuf>,
    /// Writes CPU profile to the given file
    #[arg(long, value_name = "FILE")]
    pub profile_cpu: Option<PathBuf>,
    /// Seconds to wait before stopping the CPU profile and trace
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_PROFILE_DELAY_SECS)]
    pub profile_delay: u64,
    /// Writes an execution trace to the given file
    #[arg(long, value_name = "FILE")]
    pub trace: Option<PathBuf>,
    /// Comma separated list of syscalls to trace. "all" enables all traces, "off" disables all
    #[arg(long)]
    pub strace: Option<String>,
    /// The log level to set: warning (0), info (1), or debug (2)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Enable or disable packet logging: true or false
    #[arg(long)]
    pub log_packets: Option<String>,
    /// Container ID (omit when --pid is given)
    #[arg(value_name = "CONTAINER_ID")]
    pub positional: Vec<String>,
}

impl DebugArgs {
    /// Capture the parsed flags once into an immutable request.
    pub fn into_request(self) -> crate::config::types::Result<DebugRequest> {
        let target = DebugRequest::select_target(self.pid, &self.positional)?;
        let non_empty = |value: Option<PathBuf>| value.filter(|p| !p.as_os_str().is_empty());

        Ok(DebugRequest {
            target,
            stacks: self.stacks,
            signal: Some(self.signal),
            heap_profile: non_empty(self.profile_heap),
            cpu_profile: non_empty(self.profile_cpu),
            trace: non_empty(self.trace),
            profile_delay: Duration::from_secs(self.profile_delay),
            strace: self.strace,
            log_level: self.log_level,
            log_packets: self.log_packets,
        })
    }
}

const DEBUG_USAGE: &str = "sandboxctl debug [flags] <container id>";

fn init_logging(settings: &DebugSettings) {
    let env = env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filter) = &settings.log_filter {
        builder.parse_filters(filter);
    }
    // A second init (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}

/// Run the debug command and return the status the process should exit with.
///
/// Stop-phase failures never return: the process is terminated on the spot.
pub fn run_debug(settings: &DebugSettings, args: DebugArgs) -> ExitStatus {
    let request = match args.into_request() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: {}", DEBUG_USAGE);
            return e.exit_status();
        }
    };

    let registry = FsRegistry::new(&settings.root_dir);
    let mut orchestrator =
        DebugOrchestrator::new(&registry, &ProcProbe, &KillSender, &UnixConnector);

    match orchestrator.execute(&request) {
        Ok(_) => ExitStatus::Success,
        Err(e) if e.is_fatal() => terminate(&e),
        Err(e) => {
            error!("{}", e);
            e.exit_status()
        }
    }
}

fn terminate(err: &DebugError) -> ! {
    error!("{}", err);
    std::process::exit(ExitStatus::Fatal.code());
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = DebugSettings::resolve(cli.root, cli.log_filter);
    init_logging(&settings);

    let status = match cli.command {
        Commands::Debug(args) => run_debug(&settings, args),
    };

    std::process::exit(status.code());
}
