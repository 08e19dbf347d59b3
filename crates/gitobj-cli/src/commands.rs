use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;
use gitobj_sdk::{Blob, Commit, ObjectKind, RepoConfig, Repository, StoredObject, Tree, TreeEntry};
use serde_json::{json, Value};
use tracing::{debug, Level};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(args, format),
        Command::CatFile(args) => cmd_cat_file(args, format),
        Command::HashObject(args) => cmd_hash_object(args, format),
        Command::LsTree(args) => cmd_ls_tree(args, format),
        Command::WriteTree(_) => cmd_write_tree(format),
        Command::CommitTree(args) => cmd_commit_tree(args, format),
    }
}

fn open_repo() -> anyhow::Result<Repository> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Ok(Repository::discover(&cwd)?)
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(args: InitArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    let repo = Repository::init(path, RepoConfig::default())?;
    let metadata = repo.metadata_path();
    match format {
        OutputFormat::Json => print_json(&json!({ "path": metadata.display().to_string() })),
        OutputFormat::Text => {
            println!(
                "{} Initialized empty repository in {}",
                "✓".green().bold(),
                metadata.display().to_string().bold()
            );
            Ok(())
        }
    }
}

fn cmd_cat_file(args: CatFileArgs, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open_repo()?;
    let id = repo.parse_id(&args.object)?;
    let object = repo.cat_file(&id)?;

    if args.kind {
        return match format {
            OutputFormat::Json => print_json(&json!({ "id": id, "kind": object.kind.as_str() })),
            OutputFormat::Text => {
                println!("{}", object.kind);
                Ok(())
            }
        };
    }
    if args.size {
        return match format {
            OutputFormat::Json => print_json(&json!({ "id": id, "size": object.size })),
            OutputFormat::Text => {
                println!("{}", object.size);
                Ok(())
            }
        };
    }

    match format {
        OutputFormat::Json => print_json(&object_json(&object)?),
        OutputFormat::Text => match object.kind {
            ObjectKind::Tree => {
                for entry in &Tree::from_stored_object(&object)?.entries {
                    println!("{}", entry_line(entry));
                }
                Ok(())
            }
            ObjectKind::Blob | ObjectKind::Commit => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(&object.data)?;
                stdout.flush()?;
                Ok(())
            }
        },
    }
}

fn object_json(object: &StoredObject) -> anyhow::Result<Value> {
    let value = match object.kind {
        ObjectKind::Blob => json!({
            "kind": "blob",
            "size": object.size,
            "content": String::from_utf8_lossy(&object.data),
        }),
        ObjectKind::Tree => {
            let tree = Tree::from_stored_object(object)?;
            json!({
                "kind": "tree",
                "entries": tree.entries.iter().map(entry_json).collect::<Vec<_>>(),
            })
        }
        ObjectKind::Commit => {
            let commit = Commit::from_stored_object(object)?;
            json!({
                "kind": "commit",
                "tree": commit.tree,
                "parent": commit.parent,
                "author": commit.author.to_string(),
                "committer": commit.committer.to_string(),
                "message": commit.message,
            })
        }
    };
    Ok(value)
}

fn entry_line(entry: &TreeEntry) -> String {
    format!(
        "{} {} {}\t{}",
        entry.mode,
        entry.mode.object_kind(),
        entry.object_id,
        entry.display_name()
    )
}

fn entry_json(entry: &TreeEntry) -> Value {
    json!({
        "mode": entry.mode.to_string(),
        "kind": entry.mode.object_kind().as_str(),
        "id": entry.object_id,
        "name": entry.display_name(),
    })
}

fn cmd_hash_object(args: HashObjectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id = if args.write {
        open_repo()?.hash_object(&args.file, true)?
    } else {
        let bytes = fs::read(&args.file)
            .with_context(|| format!("cannot read {}", args.file.display()))?;
        Blob::hash(&bytes)
    };
    match format {
        OutputFormat::Json => print_json(&json!({ "id": id, "written": args.write })),
        OutputFormat::Text => {
            println!("{id}");
            Ok(())
        }
    }
}

fn cmd_ls_tree(args: LsTreeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open_repo()?;
    let id = repo.parse_id(&args.tree)?;
    let entries = repo.ls_tree(&id)?;
    match format {
        OutputFormat::Json if args.name_only => {
            print_json(&json!(entries.iter().map(|e| e.display_name()).collect::<Vec<_>>()))
        }
        OutputFormat::Json => print_json(&json!(entries.iter().map(entry_json).collect::<Vec<_>>())),
        OutputFormat::Text => {
            for entry in &entries {
                if args.name_only {
                    println!("{}", entry.display_name());
                } else {
                    println!("{}", entry_line(entry));
                }
            }
            Ok(())
        }
    }
}

fn cmd_write_tree(format: OutputFormat) -> anyhow::Result<()> {
    let repo = open_repo()?;
    let id = repo.write_tree()?;
    if tracing::enabled!(Level::DEBUG) {
        debug!(%id, objects = repo.object_count()?, "object store size");
    }
    match format {
        OutputFormat::Json => print_json(&json!({ "id": id })),
        OutputFormat::Text => {
            println!("{id}");
            Ok(())
        }
    }
}

fn cmd_commit_tree(args: CommitTreeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open_repo()?;
    let tree = repo.parse_id(&args.tree)?;
    let parent = args.parent.as_deref().map(|p| repo.parse_id(p)).transpose()?;
    let id = repo.commit_tree(tree, parent, &args.message)?;
    match format {
        OutputFormat::Json => print_json(&json!({ "id": id, "tree": tree, "parent": parent })),
        OutputFormat::Text => {
            println!("{id}");
            Ok(())
        }
    }
}
