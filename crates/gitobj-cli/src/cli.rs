use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gitobj",
    about = "Content-addressed object store in git's loose format",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository
    Init(InitArgs),
    /// Show the content, kind, or size of an object
    CatFile(CatFileArgs),
    /// Compute a file's blob ID, optionally storing it
    HashObject(HashObjectArgs),
    /// List the entries of a tree object
    LsTree(LsTreeArgs),
    /// Store the working directory as a tree
    WriteTree(WriteTreeArgs),
    /// Create a commit object for a tree
    CommitTree(CommitTreeArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["pretty", "kind", "size"])))]
pub struct CatFileArgs {
    /// Pretty-print the object's content
    #[arg(short = 'p')]
    pub pretty: bool,
    /// Show the object's kind
    #[arg(short = 't')]
    pub kind: bool,
    /// Show the object's payload size
    #[arg(short = 's')]
    pub size: bool,
    pub object: String,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Write the blob into the object store
    #[arg(short = 'w')]
    pub write: bool,
    pub file: PathBuf,
}

#[derive(Args)]
pub struct LsTreeArgs {
    #[arg(long)]
    pub name_only: bool,
    pub tree: String,
}

#[derive(Args)]
pub struct WriteTreeArgs {}

#[derive(Args)]
pub struct CommitTreeArgs {
    pub tree: String,
    #[arg(short = 'p')]
    pub parent: Option<String>,
    #[arg(short = 'm')]
    pub message: String,
}
