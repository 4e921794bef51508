use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ember_gate::{GateConfig, GlyphSet, RevealOrder};
use tracing::info;

use crate::error::{DemoError, Result};
use crate::logging;
use crate::player::{self, Mode, Player};
use crate::terminal::{self, TerminalGuard};

#[derive(Debug, Parser)]
#[command(
    name = "ember-gate",
    about = "Play the ember gate cinematic in the terminal",
    version
)]
pub struct Cli {
    /// Append logs to this file (filter with EMBER_LOG).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the cinematic.
    Play(PlayArgs),

    /// Type the phrase, then watch the gate open.
    Unlock(UnlockArgs),

    /// Validate a config file and print any problems.
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    Left,
    Right,
    Random,
    Center,
}

impl From<OrderArg> for RevealOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Left => Self::Left,
            OrderArg::Right => Self::Right,
            OrderArg::Random => Self::Random,
            OrderArg::Center => Self::Center,
        }
    }
}

/// Options shared by every command that plays the gate.
#[derive(Debug, Clone, Default, Args)]
pub struct GateArgs {
    /// TOML or JSON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Phrase that flies in.
    #[arg(long)]
    pub scatter: Option<String>,

    /// Phrase that decodes.
    #[arg(long)]
    pub scramble: Option<String>,

    /// Fixed RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Order in which scrambled characters lock.
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Placeholder set: alphanumeric, uppercase, binary, symbols, katakana,
    /// matrix, or any literal characters.
    #[arg(long)]
    pub glyphs: Option<String>,

    /// Playback speed multiplier.
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,
}

impl GateArgs {
    /// Load the config file (if any), apply overrides, validate.
    pub fn resolve(&self) -> Result<GateConfig> {
        let mut config = match &self.config {
            Some(path) if !path.exists() => {
                return Err(DemoError::MissingConfig { path: path.clone() });
            }
            Some(path) => GateConfig::from_file(path)?,
            None => GateConfig::default(),
        };
        if let Some(scatter) = &self.scatter {
            config.phrases.scatter = scatter.clone();
        }
        if let Some(scramble) = &self.scramble {
            config.phrases.scramble = scramble.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(order) = self.order {
            config.scramble.order = order.into();
        }
        if let Some(glyphs) = &self.glyphs {
            config.scramble.glyphs = GlyphSet::named_or_custom(glyphs);
        }
        Ok(config.validated()?)
    }
}

#[derive(Debug, Clone, Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub gate: GateArgs,

    /// Replay forever.
    #[arg(long)]
    pub repeat: bool,

    /// Run on a virtual clock without a terminal and print a summary.
    #[arg(long, conflicts_with = "repeat")]
    pub headless: bool,

    /// Virtual terminal width for --headless.
    #[arg(long, default_value_t = 80)]
    pub cols: u16,

    /// Virtual terminal height for --headless.
    #[arg(long, default_value_t = 24)]
    pub rows: u16,

    /// Frame limit for --headless.
    #[arg(long, default_value_t = 10_000)]
    pub max_frames: usize,
}

#[derive(Debug, Clone, Args)]
pub struct UnlockArgs {
    #[command(flatten)]
    pub gate: GateArgs,

    /// Phrase to type. Defaults to the scramble phrase.
    #[arg(long)]
    pub phrase: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CheckConfigArgs {
    pub path: PathBuf,

    /// Print the effective config as TOML.
    #[arg(long)]
    pub print: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_file.as_deref())?;
    match cli.command {
        Commands::Play(args) => run_play(args),
        Commands::Unlock(args) => run_unlock(args),
        Commands::CheckConfig(args) => run_check_config(args),
    }
}

fn run_play(args: PlayArgs) -> Result<()> {
    let config = args.gate.resolve()?;
    if args.headless {
        let mut player = Player::new(config, Mode::Play { repeat: false }, args.cols, args.rows)?;
        let report = player::run_headless(&mut player, args.max_frames)?;
        for line in &report.last_frame {
            println!("{line}");
        }
        println!(
            "completed in {} frames ({} ms virtual), completions: {}",
            report.frames,
            report.elapsed.as_millis(),
            report.completions
        );
        return Ok(());
    }
    play_in_terminal(
        config,
        Mode::Play {
            repeat: args.repeat,
        },
        args.gate.speed,
    )
}

fn run_unlock(args: UnlockArgs) -> Result<()> {
    let config = args.gate.resolve()?;
    let phrase = args
        .phrase
        .unwrap_or_else(|| config.phrases.scramble.clone());
    play_in_terminal(config, Mode::Unlock { phrase }, args.gate.speed)
}

fn play_in_terminal(config: GateConfig, mode: Mode, speed: f64) -> Result<()> {
    terminal::install_panic_hook();
    let guard = TerminalGuard::enter()?;
    let (cols, rows) = guard.size()?;
    let mut player = Player::new(config, mode, cols, rows)?;
    let result = player::run_terminal(&mut player, &guard, speed);
    drop(guard);
    info!(completions = player.gate().completions(), "player exited");
    result
}

fn run_check_config(args: CheckConfigArgs) -> Result<()> {
    let gate = GateArgs {
        config: Some(args.path.clone()),
        speed: 1.0,
        ..GateArgs::default()
    };
    let config = gate.resolve()?;
    println!(
        "{}: ok ({} + {} characters)",
        args.path.display(),
        ember_gate::factory::unit_count(&config.phrases.scatter),
        ember_gate::factory::unit_count(&config.phrases.scramble)
    );
    if args.print {
        let toml = config
            .to_toml_string()
            .map_err(|e| DemoError::Serialize(e.to_string()))?;
        print!("{toml}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::CommandFactory;
    use tempfile::{Builder, NamedTempFile};

    use super::*;

    fn toml_file() -> NamedTempFile {
        Builder::new().suffix(".toml").tempfile().unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let args = GateArgs {
            scatter: Some("one".into()),
            order: Some(OrderArg::Center),
            glyphs: Some("binary".into()),
            seed: Some(3),
            speed: 1.0,
            ..GateArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.phrases.scatter, "one");
        assert_eq!(config.phrases.scramble, GateConfig::default().phrases.scramble);
        assert_eq!(config.scramble.order, RevealOrder::Center);
        assert_eq!(config.scramble.glyphs, GlyphSet::Binary);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let args = GateArgs {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..GateArgs::default()
        };
        let err = args.resolve().unwrap_err();
        assert!(matches!(err, DemoError::MissingConfig { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn check_config_accepts_partial_files() {
        let mut file = toml_file();
        writeln!(file, "[phrases]\nscatter = \"HELLO\"\n\n[scramble]\norder = \"center\"").unwrap();
        let result = run(Cli {
            log_file: None,
            command: Commands::CheckConfig(CheckConfigArgs {
                path: file.path().to_path_buf(),
                print: true,
            }),
        });
        assert!(result.is_ok());
    }

    #[test]
    fn check_config_rejects_bad_values() {
        let mut file = toml_file();
        writeln!(file, "proximity_threshold = -1.0").unwrap();
        let err = run(Cli {
            log_file: None,
            command: Commands::CheckConfig(CheckConfigArgs {
                path: file.path().to_path_buf(),
                print: false,
            }),
        })
        .unwrap_err();
        assert!(matches!(err, DemoError::Config(_)));
    }

    #[test]
    fn headless_play_runs_to_completion() {
        let result = run(Cli {
            log_file: None,
            command: Commands::Play(PlayArgs {
                gate: GateArgs {
                    scatter: Some("HI".into()),
                    scramble: Some("YO".into()),
                    seed: Some(1),
                    speed: 1.0,
                    ..GateArgs::default()
                },
                repeat: false,
                headless: true,
                cols: 40,
                rows: 12,
                max_frames: 10_000,
            }),
        });
        assert!(result.is_ok());
    }
}
