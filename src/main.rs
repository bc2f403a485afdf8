//! Binary entry point for the OneProvider CLI.

mod cli;

use std::io::{self, Write};
use std::process;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use oneprovider::ssh::UpdateSshKeyRequest;
use oneprovider::{OneProvider, OneProviderConfig, RetryConfig, SshKeyError, VmError};

use cli::{Cli, RenameArgs};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Vm(#[from] VmError),
    #[error(transparent)]
    Ssh(#[from] SshKeyError),
    #[error("failed to write output: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

fn connect() -> Result<OneProvider, CliError> {
    let config =
        OneProviderConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    OneProvider::from_config(&config).map_err(|err| CliError::Config(err.to_string()))
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let api = connect()?;
    match cli {
        Cli::Templates => print_json(&api.vm.list_templates().await?),
        Cli::Template(args) => print_json(&api.vm.get_template_by_name(&args.name).await?),
        Cli::Locations => print_json(&api.vm.list_locations().await?),
        Cli::Location(args) => print_json(&api.vm.get_location_by_city(&args.city).await?),
        Cli::Sizes => print_json(&api.vm.list_sizes().await?),
        Cli::Size(args) => print_json(&api.vm.get_size_by_name(&args.name).await?),
        Cli::Instance(args) => print_json(&api.vm.get_instance_by_id(&args.id).await?),
        Cli::SshKeys => print_json(&api.ssh.list().await?),
        Cli::SshKey(args) => print_json(&api.ssh.get_by_name(&args.name).await?),
        Cli::RenameSshKey(args) => rename_ssh_key(&api, args).await,
    }
}

async fn rename_ssh_key(api: &OneProvider, args: RenameArgs) -> Result<(), CliError> {
    let current = api.ssh.get_by_id(&args.id).await?;
    let request = UpdateSshKeyRequest {
        uuid: current.uuid,
        name: args.name,
        public_key: current.value,
    };
    let retry = RetryConfig {
        max_retries: args.attempts,
        ..RetryConfig::eventual_consistency()
    };
    let renamed = api
        .ssh
        .update_confirmed(&request, &retry, &CancellationToken::new())
        .await?;
    print_json(&renamed)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    write_json(io::stdout().lock(), value)
}

fn write_json<T: Serialize>(mut target: impl Write, value: &T) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target, "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
