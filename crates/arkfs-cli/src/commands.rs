use std::io::{self, Read, Write};
use std::time::UNIX_EPOCH;

use anyhow::Context;

use arkfs_registry::Registry;
use arkfs_types::NsPath;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let registry = Registry::open(&cli.root)
        .with_context(|| format!("opening registry under {}", cli.root.display()))?;

    match cli.command {
        Command::Create(args) => {
            let archive = registry.create(&args.archive)?;
            println!("created archive {} ({})", args.archive, archive.id());
            Ok(())
        }
        Command::Archives => {
            for name in registry.list()? {
                println!("{name}");
            }
            Ok(())
        }
        Command::Ls(args) => {
            let archive = registry.open_archive(&args.archive)?;
            for entry in archive.list(&parse_path(&args.path)?)? {
                match entry.kind {
                    arkfs_types::EntryKind::Directory => println!("{}/", entry.name),
                    arkfs_types::EntryKind::File => println!("{}", entry.name),
                }
            }
            Ok(())
        }
        Command::Mkdir(args) => {
            let archive = registry.open_archive(&args.archive)?;
            archive.mkdir(&parse_path(&args.path)?)?;
            Ok(())
        }
        Command::Write(args) => {
            let archive = registry.open_archive(&args.archive)?;
            let mut body = Vec::new();
            io::stdin().read_to_end(&mut body).context("reading stdin")?;
            let mut f = archive.open(&parse_path(&args.path)?)?;
            f.write_all(&body)?;
            // Re-open keeps existing bytes; drop any stale tail from a
            // longer previous version.
            f.set_len(body.len() as u64)?;
            f.sync()?;
            Ok(())
        }
        Command::Read(args) => {
            let archive = registry.open_archive(&args.archive)?;
            let mut f = archive.open(&parse_path(&args.path)?)?;
            let mut body = Vec::new();
            f.read_to_end(&mut body)?;
            io::stdout().write_all(&body)?;
            Ok(())
        }
        Command::Rm(args) => {
            let archive = registry.open_archive(&args.archive)?;
            archive.remove(&parse_path(&args.path)?)?;
            Ok(())
        }
        Command::Rmdir(args) => {
            let archive = registry.open_archive(&args.archive)?;
            archive.rmdir(&parse_path(&args.path)?)?;
            Ok(())
        }
        Command::Mv(args) => {
            let archive = registry.open_archive(&args.archive)?;
            archive.rename(&parse_path(&args.from)?, &parse_path(&args.to)?)?;
            Ok(())
        }
        Command::Stat(args) => {
            let archive = registry.open_archive(&args.archive)?;
            let info = archive.stat(&parse_path(&args.path)?)?;
            let mtime = info
                .modified
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            println!("{}\t{} bytes\tmtime {}", info.name, info.len, mtime);
            Ok(())
        }
        Command::Destroy(args) => {
            registry.remove(&args.archive)?;
            println!("destroyed archive {}", args.archive);
            Ok(())
        }
    }
}

fn parse_path(raw: &str) -> anyhow::Result<NsPath> {
    NsPath::new(raw).with_context(|| format!("invalid path {raw:?}"))
}
