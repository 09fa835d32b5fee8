//! Binary entrypoint for the echo task plugin bridge.

use std::io::{self, BufReader, Write};
use std::process::ExitCode;

use clap::Parser;
use task_plugin_echo::config::BridgeConfig;
use task_plugin_echo::{run, telemetry};

fn main() -> ExitCode {
    let config = BridgeConfig::parse();
    if let Err(error) = telemetry::initialise(&config) {
        writeln!(io::stderr().lock(), "{error}").ok();
        return ExitCode::FAILURE;
    }

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    match run(&config, &mut reader, &mut writer) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            writeln!(io::stderr().lock(), "{error}").ok();
            ExitCode::FAILURE
        }
    }
}
