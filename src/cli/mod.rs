//! Command-line interface definitions for the `oneprovider` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `oneprovider` binary.
#[derive(Debug, Parser)]
#[command(
    name = "oneprovider",
    about = "Query and manage OneProvider VMs and SSH keys",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// List every VM template.
    #[command(name = "templates", about = "List every VM template")]
    Templates,
    /// Show a template by name.
    #[command(name = "template", about = "Show a template by name")]
    Template(NameArgs),
    /// List every location grouped by region.
    #[command(name = "locations", about = "List every location grouped by region")]
    Locations,
    /// Show the location in a city.
    #[command(name = "location", about = "Show the location in a city")]
    Location(CityArgs),
    /// List every instance size.
    #[command(name = "sizes", about = "List every instance size")]
    Sizes,
    /// Show an instance size by name.
    #[command(name = "size", about = "Show an instance size by name")]
    Size(NameArgs),
    /// Show the live details of an instance.
    #[command(name = "instance", about = "Show the live details of an instance")]
    Instance(IdArgs),
    /// List every SSH key on the account.
    #[command(name = "ssh-keys", about = "List every SSH key on the account")]
    SshKeys,
    /// Show an SSH key by name.
    #[command(name = "ssh-key", about = "Show an SSH key by name")]
    SshKey(NameArgs),
    /// Rename an SSH key and wait until the new name is visible.
    #[command(
        name = "rename-ssh-key",
        about = "Rename an SSH key and wait until the new name is visible"
    )]
    RenameSshKey(RenameArgs),
}

/// Lookup by name; matching ignores case.
#[derive(Debug, Parser)]
pub(crate) struct NameArgs {
    /// Name to look up.
    pub(crate) name: String,
}

/// Lookup by city; matching is exact.
#[derive(Debug, Parser)]
pub(crate) struct CityArgs {
    /// City to look up, for example `Fez`.
    pub(crate) city: String,
}

/// Lookup by backend identifier.
#[derive(Debug, Parser)]
pub(crate) struct IdArgs {
    /// Backend identifier.
    pub(crate) id: String,
}

/// Arguments for `oneprovider rename-ssh-key`.
#[derive(Debug, Parser)]
pub(crate) struct RenameArgs {
    /// UUID of the key to rename.
    pub(crate) id: String,
    /// New name for the key.
    pub(crate) name: String,
    /// Maximum number of read-backs before giving up.
    #[arg(long, default_value_t = 8)]
    pub(crate) attempts: u32,
}
