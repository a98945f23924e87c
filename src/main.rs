//! xcrunner - run an app on an iOS device or simulator
//!
//! This is the binary entry point. All logic lives in the library
//! crates.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use xcrunner_app::{run, tail, RunFlags};
use xcrunner_core::types::Platform;

/// Resolve a target device and orchestrate the build, install, launch
/// and log pipeline against it
#[derive(Parser, Debug)]
#[command(name = "xcr")]
#[command(about = "Run an app on an iOS device or simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the app and run it on a resolved device
    Run(RunArgs),
    /// Stream logs from a booted simulator
    Log(LogArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the app source directory
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Target platform (ios, tvos, visionos, macos)
    #[arg(long, default_value = "ios")]
    platform: String,

    /// Run on a connected device matching this name
    #[arg(long)]
    device: Option<String>,

    /// Run on the device with this exact identifier
    #[arg(long)]
    udid: Option<String>,

    /// Run on the simulator with this name
    #[arg(long)]
    simulator: Option<String>,

    /// List devices and pick one interactively
    #[arg(long)]
    list_devices: bool,

    /// Same as --list-devices
    #[arg(short, long)]
    interactive: bool,

    /// Use a pre-built .app bundle instead of building
    #[arg(long, value_name = "PATH")]
    binary_path: Option<PathBuf>,

    /// Scheme to build (defaults to the project name)
    #[arg(long)]
    scheme: Option<String>,

    /// Build configuration (defaults to Debug)
    #[arg(long = "mode", value_name = "CONFIGURATION")]
    mode: Option<String>,

    /// Run pod install even when Pods/ looks current
    #[arg(long)]
    pods: bool,

    /// Do not forward the dev-server port to the app
    #[arg(long)]
    no_packager: bool,

    /// Dev-server port forwarded to the app
    #[arg(long, default_value_t = 8081)]
    port: u16,
}

#[derive(Args, Debug)]
struct LogArgs {
    /// Target platform (ios, tvos, visionos)
    #[arg(long, default_value = "ios")]
    platform: String,

    /// Prompt when several simulators are booted
    #[arg(short, long)]
    interactive: bool,
}

fn parse_platform(value: &str) -> color_eyre::Result<Platform> {
    value
        .parse::<Platform>()
        .map_err(|e| color_eyre::eyre::eyre!(e))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    xcrunner_core::logging::init()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let platform = parse_platform(&args.platform)?;
            let source_dir = match args.path {
                Some(path) => path,
                None => std::env::current_dir()?,
            };

            let flags = RunFlags {
                device: args.device,
                udid: args.udid,
                simulator: args.simulator,
                list_devices: args.list_devices,
                interactive: args.interactive,
                binary_path: args.binary_path,
                scheme: args.scheme,
                configuration: args.mode,
                force_pods: args.pods,
                packager: !args.no_packager,
                port: args.port,
            };

            run(&source_dir, platform, flags).await?;
        }
        Command::Log(args) => {
            let platform = parse_platform(&args.platform)?;
            tail(platform, args.interactive).await?;
        }
    }

    Ok(())
}
