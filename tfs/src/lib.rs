#![cfg_attr(not(test), no_std)]

extern crate alloc;

/* tfs 的整体架构，自上而下 */

// 文件系统层：按文件名查找、读取、删除，以及诊断
mod fs;

// 诊断层：一致性检查与调试报告
mod check;
mod report;

// 目录层：唯一的根目录
mod dir;

// inode 表层：按编号读写 inode
mod itable;

// 磁盘数据结构层：表示磁盘文件系统的数据结构
pub mod layout;

// 块缓冲层：单次操作内的整块读写
mod block;

mod error;

pub use self::{
    check::Inconsistency,
    dir::RootDirectory,
    error::{Error, Result},
    fs::TinyFileSystem,
    itable::InodeTable,
    report::{EntryReport, InodeReport, Report, RootReport},
};
pub use block_dev::{BlockDevice, DeviceError};

pub const MAGIC: u32 = 0xc345_0545;
pub const BLOCK_SIZE: usize = 4096;
/// 镜像总块数：8MiB
pub const NUM_BLOCKS: usize = 2048;
pub const NUM_INODES: usize = 512;
/// 位图中一个字的位数
pub const BITS_PER_WORD: usize = 32;

pub type DataBlock = [u8; BLOCK_SIZE];
