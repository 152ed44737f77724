mod cli;

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command};
use tfs::TinyFileSystem;
use tfs_fuse::BlockFile;

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let writable = matches!(cli.command, Command::Rm { .. });
    let fd = OpenOptions::new()
        .read(true)
        .write(writable)
        .open(&cli.image)?;
    log::info!("image={:?} writable={writable}", cli.image);

    let fs = TinyFileSystem::open(Arc::new(BlockFile::new(fd)));

    match cli.command {
        Command::Debug => {
            let report = fs.read().debug_dump().map_err(io::Error::other)?;
            print!("{report}");
        }
        Command::Stat { name } => {
            let fs = fs.read();
            let Some(inumber) = fs.lookup(&name).map_err(io::Error::other)? else {
                return Err(not_found(&name));
            };
            let size = fs.read_inode(inumber).map_err(io::Error::other)?.size();
            println!("{name}: inode {inumber}, {size} bytes");
        }
        Command::Cat {
            name,
            offset,
            length,
        } => {
            let fs = fs.read();
            let Some(inumber) = fs.lookup(&name).map_err(io::Error::other)? else {
                return Err(not_found(&name));
            };
            let length = match length {
                Some(length) => length,
                None => fs.read_inode(inumber).map_err(io::Error::other)?.size(),
            };
            let data = fs
                .read_to_vec(inumber, offset, length)
                .map_err(io::Error::other)?;
            io::stdout().write_all(&data)?;
        }
        Command::Rm { name } => {
            let Some(inumber) = fs.write().delete(&name).map_err(io::Error::other)? else {
                return Err(not_found(&name));
            };
            println!("deleted {name} (inode {inumber})");
        }
    }

    Ok(())
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{name}: no such file"))
}
