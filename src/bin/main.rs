use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Fallback scenario used when no file is given: the canvas game start check.
const DEFAULT_SCENARIO: &str = include_str!("../../scenarios/canvas-start.yaml");

#[derive(Parser)]
#[command(name = "proofshot")]
#[command(about = "Scripted browser verification with screenshot evidence")]
#[command(version)]
struct Cli {
    /// Scenario file to run (built-in canvas-start scenario if omitted)
    scenario: Option<PathBuf>,

    /// Run with a visible browser window (overrides the scenario)
    #[arg(long)]
    headed: bool,

    /// Set a parameter (can be used multiple times)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate the scenario without launching a browser
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> proofshot::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let params = proofshot::Params::from_args(&cli.params)?;

    let mut scenario = match cli.scenario {
        Some(ref path) => proofshot::Scenario::load_with_params(path, &params)?,
        None => proofshot::Scenario::parse_with_params(DEFAULT_SCENARIO, &params)?,
    };

    if cli.check {
        println!("Scenario valid: {}", scenario.name);
        println!("  Target: {}", scenario.target.url);
        println!("  Steps: {}", scenario.steps.len());
        println!("  Evidence dir: {}", scenario.evidence.dir);
        let checkpoints = scenario.checkpoint_names();
        if !checkpoints.is_empty() {
            println!("  Checkpoints: {}", checkpoints.join(", "));
        }
        if !scenario.params.is_empty() {
            println!("  Parameters: {}", scenario.params.len());
            for (name, def) in &scenario.params {
                let req = if def.required { " (required)" } else { "" };
                let desc = def.description.as_deref().unwrap_or("");
                println!("    - {}{}: {}", name, req, desc);
            }
        }
        return Ok(());
    }

    if cli.headed {
        scenario.browser.headless = false;
    }

    println!("Running: {}", scenario.name);

    let mut runner = proofshot::Runner::launch(&scenario.browser).await?;
    let report = runner.run(&scenario).await;

    // The browser is released before the outcome is inspected.
    runner.close().await?;
    let report = report?;

    println!();
    if report.success {
        println!("✓ Passed");
    } else {
        println!("✗ Failed");
        if let Some(ref error) = report.error {
            println!("  Error: {}", error);
        }
    }
    println!("  Steps: {}", report.steps_executed);
    println!("  Duration: {}ms", report.duration_ms);
    for capture in &report.captures {
        println!("  Evidence: {}", capture.display());
    }

    if !report.success {
        std::process::exit(1);
    }

    Ok(())
}
