use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for gsdump")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        #[arg(long)]
        ignored: bool,
        /// Limit the run to these library modules (repeatable)
        #[arg(short = 'm', long = "module", value_enum)]
        modules: Vec<TestModule>,
    },
    /// Run benchmarks
    Bench,
    /// Load a real dump and run info, stats and replay on it
    Smoke {
        /// Path to a GS dump
        dump_path: String,
        /// Frames to replay
        #[arg(short = 'f', long, default_value = "60")]
        frames: u32,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
}

/// Library modules with their own unit test suites
#[derive(Clone, Copy, ValueEnum)]
enum TestModule {
    Bits,
    Gif,
    Dump,
    Replay,
    Stats,
    Config,
}

impl TestModule {
    fn path(self) -> &'static str {
        match self {
            TestModule::Bits => "core::bits",
            TestModule::Gif => "core::gif",
            TestModule::Dump => "core::dump",
            TestModule::Replay => "core::replay",
            TestModule::Stats => "core::stats",
            TestModule::Config => "core::config",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Check { verbose } => run_check(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            ignored,
            modules,
        } => run_test(doc, ignored, &modules),
        Commands::Bench => run_bench(),
        Commands::Smoke {
            dump_path,
            frames,
            release,
        } => run_smoke(&dump_path, frames, release),
    }
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build", || run_build(false), verbose)?;
    run_task("Test", || run_test(false, false, &[]), verbose)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_check(verbose: bool) -> Result<()> {
    println!("{}", "=== Running Quick Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ Checks passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("clippy").arg("--all-targets").arg("--all-features");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("build");

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

fn run_test(doc: bool, ignored: bool, modules: &[TestModule]) -> Result<()> {
    if doc || modules.is_empty() {
        let mut cmd = Command::new("cargo");
        cmd.arg("test").arg("--all-features");
        if doc {
            cmd.arg("--doc");
        }
        if ignored {
            cmd.arg("--").arg("--ignored");
        }
        return execute_command(&mut cmd);
    }

    let mut failed = Vec::new();

    for module in modules {
        println!("{} Running {} tests...", "→".blue(), module.path().bold());

        let mut cmd = Command::new("cargo");
        cmd.arg("test")
            .arg("--all-features")
            .arg("--lib")
            .arg(module.path());
        if ignored {
            cmd.arg("--").arg("--ignored");
        }

        if execute_command(&mut cmd).is_ok() {
            println!("{} {} passed\n", "✓".green(), module.path());
        } else {
            println!("{} {} failed\n", "✗".red(), module.path());
            failed.push(module.path());
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Failed: {}", failed.join(", "))
    }
}

fn run_bench() -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("bench");

    execute_command(&mut cmd)
}

fn run_smoke(dump_path: &str, frames: u32, release: bool) -> Result<()> {
    use std::path::Path;

    println!("{}", "=== Dump Smoke Test ===".bold().blue());

    if !Path::new(dump_path).exists() {
        println!(
            "{} Dump file not found: {}",
            "✗".red().bold(),
            dump_path.yellow()
        );
        println!(
            "\n{} Record one with the emulator's GS dump hotkey and pass its path.",
            "ℹ".blue()
        );
        anyhow::bail!("Dump file not found");
    }

    println!("{} Dump file: {}", "✓".green(), dump_path.cyan());
    println!("{} Frames: {}", "→".blue(), frames.to_string().bold());
    println!(
        "{} Build mode: {}",
        "→".blue(),
        if release {
            "release".green().bold()
        } else {
            "debug".yellow().bold()
        }
    );
    println!();

    let start = Instant::now();
    let frames = frames.to_string();

    for args in [
        vec!["info", dump_path],
        vec!["stats", dump_path],
        vec!["replay", dump_path, "--frames", frames.as_str()],
    ] {
        println!("{} gsdump {}", "→".blue(), args.join(" "));

        let mut cmd = Command::new("cargo");
        cmd.arg("run").arg("--bin").arg("gsdump");
        if release {
            cmd.arg("--release");
        }
        cmd.arg("--").args(&args);

        let status = cmd
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if !status.success() {
            println!("\n{} Smoke test failed", "✗".red().bold());
            anyhow::bail!("gsdump {} failed with exit code: {}", args[0], status);
        }
    }

    let elapsed = start.elapsed();
    println!(
        "\n{} Smoke test completed in {}",
        "✓".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(_) => {
            let elapsed = start.elapsed();
            println!(
                "{} {}",
                "✓".green().bold(),
                if verbose {
                    format!("({:.2}s)", elapsed.as_secs_f64())
                } else {
                    String::new()
                }
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
