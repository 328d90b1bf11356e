//! evloop binary.
//!
//! ```text
//! evloop [CONFIG.toml] [--list]
//! ```
//!
//! Without `--list`: acquire the render surface, enumerate and grab input
//! devices, run the dispatch loop until escape, release everything, exit 0.
//! With `--list`: enumerate without grabbing, print devices and per-node
//! outcomes as JSON, exit 0.
//! Any fatal setup error, an unknown option or a second config path prints one
//! diagnostic line to stdout and exits 1.

#[cfg(not(target_os = "linux"))]
compile_error!("evloop reads Linux evdev nodes and only builds for Linux");

use evloop::backends::linux::{find_nodes, EvdevOpener};
use evloop::handlers::standard_bus;
use evloop::{enumerate_with_report, Config, DeviceRegistry, EventLoop, RenderContext};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "evloop [CONFIG.toml] [--list]";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Cli {
    config: Option<PathBuf>,
    list: bool,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let mut cli = Cli::default();
    for arg in args {
        match arg.as_str() {
            "--list" => cli.list = true,
            "-h" | "--help" => cli.help = true,
            flag if flag.starts_with('-') => return Err(format!("unrecognized option '{flag}'")),
            _ if cli.config.is_some() => return Err(format!("unexpected argument '{arg}'")),
            _ => cli.config = Some(PathBuf::from(&arg)),
        }
    }
    Ok(cli)
}

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            println!("{e}");
            eprintln!("usage: {USAGE}");
            return ExitCode::from(1);
        }
    };
    if cli.help {
        println!("usage: {USAGE}");
        return ExitCode::SUCCESS;
    }

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            println!("{e}");
            return ExitCode::from(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log.level))
        .init();

    let result = if cli.list {
        list_devices(&config)
    } else {
        run(&config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            println!("{e}");
            ExitCode::from(1)
        }
    }
}

fn run(config: &Config) -> evloop::Result<()> {
    // Surface first: without one there is no point grabbing devices.
    let mut ctx = RenderContext::headless(&config.render)?;

    let (registry, _) = DeviceRegistry::discover(&config.discovery, config.enumerate_options())?;
    let bus = standard_bus(config.log.trace_sync);

    let (report, _released) = EventLoop::from_config(registry, bus, config).run(&mut ctx)?;
    info!(
        "exit: {} iteration(s), {} frame(s), {} record(s), {} read error(s), {} lost device(s)",
        report.iterations, report.frames, report.records, report.read_errors, report.lost_devices
    );
    Ok(())
}

/// Print every candidate node and the devices that classified, without grabbing.
///
/// Unlike a run, a listing where nothing opens is still a successful listing:
/// the per-node report says why each node was skipped.
fn list_devices(config: &Config) -> evloop::Result<()> {
    let mut opts = config.enumerate_options();
    opts.grab = false;

    let paths = find_nodes(&config.discovery.directory, &config.discovery.prefix)?;
    let (registry, nodes) = enumerate_with_report(&paths, &mut EvdevOpener, opts);
    let doc = serde_json::json!({
        "devices": registry.report(),
        "nodes": nodes,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, String> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_means_defaults() {
        assert_eq!(parse(&[]).unwrap(), Cli::default());
    }

    #[test]
    fn config_and_list_in_any_order() {
        let expected = Cli {
            config: Some(PathBuf::from("evloop.toml")),
            list: true,
            help: false,
        };
        assert_eq!(parse(&["evloop.toml", "--list"]).unwrap(), expected);
        assert_eq!(parse(&["--list", "evloop.toml"]).unwrap(), expected);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = parse(&["evloop.toml", "--verbose"]).unwrap_err();
        assert_eq!(err, "unrecognized option '--verbose'");
    }

    #[test]
    fn second_config_path_is_rejected() {
        let err = parse(&["a.toml", "b.toml"]).unwrap_err();
        assert_eq!(err, "unexpected argument 'b.toml'");
    }
}
