use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::{LevelFilter, debug, info};
use serde_json::json;

use facewatch::alert::EventAlertHandler;
use facewatch::config::{APP_NAME, AppConfig, resolve_config_file, write_default_config};
use facewatch::engine::{DirAssets, LocalEngine, ModelCatalog, OutputWindow, TraceTarget};
use facewatch::events::{EventSink, JsonLinesSink, LogEventSink};
use facewatch::protocol::{CameraFacing, ComputeMode};
use facewatch::replay::{self, ReplayOptions};
use facewatch::session::{ReloadPolicy, SessionController, SurfaceEvent, UiEvent};

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = RuntimeContext::new(cli.common.clone())?;
    ctx.init_logging()?;
    debug!("config file: {}", ctx.config_file.display());

    match cli.command {
        Command::Run(cmd) => handle_run(&ctx, cmd),
        Command::Models => handle_models(&ctx),
        Command::Init(cmd) => handle_init(&ctx, cmd),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Completions { shell } => handle_completions(shell),
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Facewatch - camera session shell for face-detection alerts.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Enable debug logging (equivalent to -vv)
    #[arg(long, global = true)]
    debug: bool,
    /// Enable trace logging (overrides other levels)
    #[arg(long = "trace-log", global = true)]
    trace: bool,
    /// Output machine readable JSON
    #[arg(long, global = true, conflicts_with = "yaml")]
    json: bool,
    /// Output machine readable YAML
    #[arg(long, global = true)]
    yaml: bool,
    /// Disable ANSI colors in output
    #[arg(long = "no-color", global = true, conflicts_with = "color")]
    no_color: bool,
    /// Control color output (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    color: ColorOption,
    /// Do not change anything on disk
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    /// Assume "yes" for interactive prompts
    #[arg(short = 'y', long = "yes", alias = "force-all", global = true)]
    assume_yes: bool,
    /// Emit additional diagnostics for troubleshooting
    #[arg(long = "diagnostics", global = true)]
    diagnostics: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorOption {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Drive a camera session over a recorded frame trace
    Run(RunCommand),
    /// List the detector models that can be selected
    Models,
    /// Create the config directory and default file
    Init(InitCommand),
    /// Inspect and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Args)]
struct RunCommand {
    /// JSON-lines frame trace to replay through the camera
    #[arg(long, value_name = "FILE")]
    trace: PathBuf,
    /// Model index to start with
    #[arg(long, value_name = "N")]
    model: Option<usize>,
    /// Compute mode (cpu, gpu)
    #[arg(long)]
    compute: Option<ComputeMode>,
    /// Camera facing (front, back)
    #[arg(long)]
    facing: Option<CameraFacing>,
    /// Reload policy (in_place, close_and_reopen)
    #[arg(long)]
    reload: Option<ReloadPolicy>,
    /// Directory containing model assets
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,
    /// Switch to this model index halfway through the trace
    #[arg(long, value_name = "N")]
    switch_model: Option<usize>,
    /// Replay as fast as possible instead of at trace pace
    #[arg(long)]
    fast: bool,
    /// Playback speed multiplier
    #[arg(long, default_value = "1.0")]
    speed: f32,
}

#[derive(Debug, Clone, Args)]
struct InitCommand {
    /// Recreate configuration even if it already exists
    #[arg(long = "force")]
    force: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Output the effective configuration
    Show,
    /// Print the resolved config file path
    Path,
    /// Regenerate the default configuration file
    Reset,
}

#[derive(Debug, Clone)]
struct RuntimeContext {
    common: CommonOpts,
    config_file: PathBuf,
    config: AppConfig,
}

impl RuntimeContext {
    fn new(common: CommonOpts) -> Result<Self> {
        let config_file = resolve_config_file(common.config.clone())?;
        if !config_file.exists() && !common.dry_run {
            write_default_config(&config_file)?;
        }
        let config = AppConfig::load(&config_file)?;
        Ok(Self {
            common,
            config_file,
            config,
        })
    }

    fn init_logging(&self) -> Result<()> {
        use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

        if self.common.quiet {
            log::set_max_level(LevelFilter::Off);
            return Ok(());
        }

        let level = match self.effective_log_level() {
            LevelFilter::Off => "off",
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
        };

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("facewatch={level}")));

        // Logs go to stderr so JSON events on stdout stay parseable.
        if self.common.json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
                .try_init()
                .ok();
        } else {
            let force_color = matches!(self.common.color, ColorOption::Always)
                || env::var_os("FORCE_COLOR").is_some();
            let disable_color = self.common.no_color
                || matches!(self.common.color, ColorOption::Never)
                || env::var_os("NO_COLOR").is_some()
                || (!force_color && !io::stderr().is_terminal());

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(io::stderr)
                        .with_ansi(!disable_color)
                        .with_target(self.common.diagnostics)
                        .with_file(self.common.diagnostics)
                        .with_line_number(self.common.diagnostics),
                )
                .try_init()
                .ok();
        }

        // Also init env_logger for the log facade used by the library
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        builder.filter_level(self.effective_log_level());
        builder.try_init().ok();

        Ok(())
    }

    fn effective_log_level(&self) -> LevelFilter {
        if self.common.trace {
            LevelFilter::Trace
        } else if self.common.debug {
            LevelFilter::Debug
        } else {
            match self.common.verbose {
                0 => self
                    .config
                    .logging
                    .level
                    .parse()
                    .unwrap_or(LevelFilter::Info),
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }
}

fn handle_run(ctx: &RuntimeContext, cmd: RunCommand) -> Result<()> {
    let frames = replay::load_trace(&cmd.trace)
        .with_context(|| format!("loading trace {}", cmd.trace.display()))?;

    let mut session_config = ctx.config.session.clone();
    if let Some(model) = cmd.model {
        session_config.selection = session_config.selection.with_model(model);
    }
    if let Some(compute) = cmd.compute {
        session_config.selection = session_config.selection.with_compute(compute);
    }
    if let Some(facing) = cmd.facing {
        session_config.facing = facing;
    }
    if let Some(reload) = cmd.reload {
        session_config.reload = reload;
    }

    let assets_dir = match cmd.assets {
        Some(dir) => dir,
        None => ctx
            .config
            .assets_dir()?
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    info!("model assets from {}", assets_dir.display());

    let engine = Arc::new(LocalEngine::new(
        ctx.config.engine.clone(),
        ModelCatalog::default(),
    ));
    let sink: Arc<dyn EventSink> = if ctx.common.json {
        Arc::new(JsonLinesSink::new(io::stdout()))
    } else {
        Arc::new(LogEventSink)
    };

    let mut controller = SessionController::new(
        engine.clone(),
        Arc::new(DirAssets::new(assets_dir)),
        session_config,
        ctx.config.alert.clone(),
    )
    .with_event_sink(Arc::clone(&sink));
    let handler = EventAlertHandler::new(Arc::clone(&sink), controller.session().id.clone());
    controller = controller.with_alert_handler(Arc::new(handler));

    let (width, height) = frames[0].size;
    controller.handle(UiEvent::HostCreated);
    controller.handle(UiEvent::Surface(SurfaceEvent::Created));
    controller.handle(UiEvent::Surface(SurfaceEvent::Changed(OutputWindow::new(
        width,
        height,
        Arc::new(TraceTarget),
    ))));

    let options = ReplayOptions {
        realtime: !cmd.fast,
        speed: cmd.speed,
    };
    let stats = match cmd.switch_model {
        Some(model) => {
            let (first, second) = frames.split_at(frames.len() / 2);
            let mut stats = replay::replay(&engine, first, options);
            controller.handle(UiEvent::ModelSelected(model));
            let rest = replay::replay(&engine, second, options);
            stats.frames += rest.frames;
            stats.dropped += rest.dropped;
            stats.alert_frames += rest.alert_frames;
            stats.unsupported_frames += rest.unsupported_frames;
            stats.last_fps = rest.last_fps.or(stats.last_fps);
            stats.final_signal = rest.final_signal;
            stats
        }
        None => replay::replay(&engine, &frames, options),
    };

    let session = controller.session().clone();
    controller.handle(UiEvent::Surface(SurfaceEvent::Destroyed));
    controller.handle(UiEvent::HostDestroyed);

    if ctx.common.json {
        println!(
            "{}",
            serde_json::to_string(&json!({ "summary": stats, "session": session }))
                .context("serializing run summary to JSON")?
        );
    } else if ctx.common.yaml {
        println!(
            "{}",
            serde_yaml::to_string(&json!({ "summary": stats, "session": session }))
                .context("serializing run summary to YAML")?
        );
    } else {
        println!(
            "Session {} ({} camera, {}): {} frames, {} with alert, {} without model, {} dropped",
            session.id,
            session.facing,
            session.selection,
            stats.frames,
            stats.alert_frames,
            stats.unsupported_frames,
            stats.dropped
        );
        if let Some(fps) = stats.last_fps {
            println!("Average frame rate: {fps:.2} fps");
        }
    }
    Ok(())
}

fn handle_models(ctx: &RuntimeContext) -> Result<()> {
    let catalog = ModelCatalog::default();
    let rows: Vec<_> = catalog
        .iter()
        .map(|(id, spec)| json!({ "id": id, "spec": spec }))
        .collect();

    if ctx.common.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("serializing models to JSON")?
        );
    } else if ctx.common.yaml {
        println!(
            "{}",
            serde_yaml::to_string(&rows).context("serializing models to YAML")?
        );
    } else {
        for (id, spec) in catalog.iter() {
            println!(
                "{:>2}  {:<16} {:>4}px  {}",
                id, spec.name, spec.target_size, spec.asset_stem
            );
        }
    }
    Ok(())
}

fn handle_init(ctx: &RuntimeContext, cmd: InitCommand) -> Result<()> {
    if ctx.config_file.exists() && !(cmd.force || ctx.common.assume_yes) {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            ctx.config_file.display()
        ));
    }

    if ctx.common.dry_run {
        info!(
            "dry-run: would write default config to {}",
            ctx.config_file.display()
        );
        return Ok(());
    }

    write_default_config(&ctx.config_file)
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if ctx.common.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ctx.config)
                        .context("serializing config to JSON")?
                );
            } else if ctx.common.yaml {
                println!(
                    "{}",
                    serde_yaml::to_string(&ctx.config).context("serializing config to YAML")?
                );
            } else {
                println!("{:#?}", ctx.config);
            }
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", ctx.config_file.display());
            Ok(())
        }
        ConfigCommand::Reset => {
            if ctx.common.dry_run {
                info!(
                    "dry-run: would reset config at {}",
                    ctx.config_file.display()
                );
                return Ok(());
            }
            write_default_config(&ctx.config_file)
        }
    }
}

fn handle_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
    Ok(())
}
