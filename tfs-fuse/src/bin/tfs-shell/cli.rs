use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
pub struct Cli {
    /// Disk image to operate on
    #[arg(long, short)]
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Dump superblock, root directory and inode table, then check consistency
    Debug,

    /// Print the inode number and size of a file
    Stat { name: String },

    /// Copy a file's content to stdout
    Cat {
        name: String,

        /// Byte offset to start reading from
        #[arg(long, short, default_value_t = 0)]
        offset: usize,

        /// Number of bytes to read, defaults to the rest of the file
        #[arg(long, short)]
        length: Option<usize>,
    },

    /// Delete a file from the root directory
    Rm { name: String },
}
