// rlc: bench for control box logic programs

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rlc::device::ControlBox;
use rlc::interpreter::constants::{port_index, DEADLINE_SYMBOL, PORT_NAMES};
use rlc::interpreter::engine::Logic;
use rlc::snapshot::LogicState;
use rlc::ui::App;

/// Run and inspect redstone logic controller programs
#[derive(Parser)]
#[command(name = "rlc", version)]
#[command(about = "Run and inspect redstone logic controller programs")]
struct Args {
    /// Program file
    file: PathBuf,

    /// Run without the TUI and print the outputs of every logic run
    #[arg(long)]
    headless: bool,

    /// Logic runs to perform in headless mode
    #[arg(long, default_value_t = 20)]
    ticks: u64,

    /// Game tick period in milliseconds while playing in the TUI
    #[arg(long, default_value_t = 50)]
    interval: u64,

    /// Input level applied before the first tick, as `port=level` (repeatable)
    #[arg(short, long = "input", value_name = "PORT=LEVEL")]
    inputs: Vec<String>,

    /// Restore code and memory from a saved state file instead of the program
    #[arg(long, value_name = "JSON")]
    state: Option<PathBuf>,

    /// Write code and memory to this file on exit
    #[arg(long, value_name = "JSON")]
    save: Option<PathBuf>,

    /// Write logs to this file (filter via RUST_LOG, default `warn`)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Only report parse errors; exit status 1 if there are any
    #[arg(long)]
    check: bool,
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file '{}'", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // The TUI owns the terminal
        None if !(args.headless || args.check) => builder.with_writer(io::sink).init(),
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn parse_input(arg: &str) -> Result<(usize, i32)> {
    let Some((name, level)) = arg.split_once('=') else {
        bail!("input '{}' is not of the form port=level", arg);
    };
    let name = name.trim().to_ascii_lowercase();
    let Some(index) = port_index(&name) else {
        bail!("unknown port '{}', expected one of {}", name, PORT_NAMES.join(", "));
    };
    let level = level
        .trim()
        .parse::<i32>()
        .with_context(|| format!("invalid level in '{}'", arg))?;
    Ok((index, level))
}

fn load_logic(args: &Args) -> Result<Logic> {
    let mut logic = Logic::new();
    match &args.state {
        Some(path) => {
            let state = LogicState::load(path)
                .with_context(|| format!("cannot restore state from '{}'", path.display()))?;
            logic.restore(state);
        }
        None => {
            let source = fs::read_to_string(&args.file)
                .with_context(|| format!("cannot read program '{}'", args.file.display()))?;
            logic.set_code(&source);
        }
    }
    Ok(logic)
}

fn report_errors(logic: &Logic, file: &Path) {
    for invalid in &logic.program().invalid_entries {
        eprintln!(
            "{}:{}:{}: {}",
            file.display(),
            invalid.line_index + 1,
            invalid.error.offset + 1,
            invalid.kind()
        );
    }
}

fn run_headless(device: &mut ControlBox, runs: u64) {
    println!("{:>8} {:>6}  {}  {:>16}  deadline", "time", "run", PORT_NAMES.join(" "), "bus");
    while device.runs() < runs {
        if !device.step() {
            continue;
        }
        let logic = device.logic();
        let ports: Vec<String> = (0..PORT_NAMES.len())
            .map(|i| format!("{:x}", device.output(i)))
            .collect();
        println!(
            "{:>8} {:>6}  {}  {:016x}  {}",
            device.game_time(),
            device.runs(),
            ports.join(" "),
            logic.rca_output_data,
            logic.symbol(DEADLINE_SYMBOL)
        );
    }
}

fn run_tui(device: ControlBox, interval: Duration) -> Result<ControlBox> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(device, interval);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal UI failed")?;
    Ok(app.device)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let logic = load_logic(&args)?;
    info!(
        file = %args.file.display(),
        lines = logic.program().entries.len(),
        errors = logic.errors().len(),
        "program loaded"
    );

    if args.check {
        report_errors(&logic, &args.file);
        if !logic.valid() {
            std::process::exit(1);
        }
        println!("{}: ok", args.file.display());
        return Ok(());
    }

    let mut device = ControlBox::with_logic(logic);
    for arg in &args.inputs {
        let (index, level) = parse_input(arg)?;
        device.set_input(index, level);
    }

    let device = if args.headless {
        report_errors(device.logic(), &args.file);
        run_headless(&mut device, args.ticks);
        device
    } else {
        run_tui(device, Duration::from_millis(args.interval.max(1)))?
    };

    if let Some(path) = &args.save {
        device
            .logic()
            .state()
            .save(path)
            .with_context(|| format!("cannot save state to '{}'", path.display()))?;
        info!(path = %path.display(), "state saved");
    }

    Ok(())
}
