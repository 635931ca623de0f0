use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "arkfs",
    about = "arkfs — named archives over a blob-backed virtual filesystem",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root directory holding the registry and all archive working
    /// directories.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new named archive
    Create(ArchiveArgs),
    /// List registered archives
    Archives,
    /// List a directory inside an archive
    Ls(PathArgs),
    /// Create directories inside an archive
    Mkdir(PathArgs),
    /// Write stdin to a file inside an archive
    Write(PathArgs),
    /// Read a file inside an archive to stdout
    Read(PathArgs),
    /// Remove a file inside an archive
    Rm(PathArgs),
    /// Remove an empty directory inside an archive
    Rmdir(PathArgs),
    /// Move an entry (or subtree) inside an archive
    Mv(MvArgs),
    /// Show file metadata
    Stat(PathArgs),
    /// Destroy a named archive and all of its data
    Destroy(ArchiveArgs),
}

#[derive(Args)]
pub struct ArchiveArgs {
    /// Archive name
    pub archive: String,
}

#[derive(Args)]
pub struct PathArgs {
    /// Archive name
    pub archive: String,
    /// Logical path inside the archive
    pub path: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Archive name
    pub archive: String,
    /// Source logical path
    pub from: String,
    /// Destination logical path
    pub to: String,
}
