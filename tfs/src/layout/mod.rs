//! # 磁盘数据结构层
//!
//! tfs 的磁盘布局：
//! 超级块(含两张位图) | inode 表 | 数据块(目录块、间接索引块、文件数据)
//!
//! 每种结构都恰好占据一个块，读写时按小端序逐字段编解码，
//! 不在同一块内存上做类型双关。

use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

use crate::{DataBlock, NUM_BLOCKS, Result};

mod super_block;
pub use super_block::SuperBlock;

mod bitmap;
pub use bitmap::Bitmap;

mod inode;
pub use inode::{
    DiskInode, HeldBlocks, INODE_SIZE, INODE_TABLE_BLOCKS, INODES_PER_BLOCK, IndirectBlock,
    InodeBlock, InodeKind, POINTERS_PER_BLOCK, POINTERS_PER_INODE,
};

/// 目录项，也属于磁盘文件系统数据结构
mod dir_entry;
pub use dir_entry::{DIR_ENTRY_SIZE, DirBlock, DirEntry, NAME_CAP, NUM_DENTRIES_PER_BLOCK};

/// 可以整块编解码的磁盘结构
pub trait OnDisk: Sized + for<'a> BinRead<Args<'a> = ()> + for<'a> BinWrite<Args<'a> = ()> {
    fn decode(block: &DataBlock) -> Result<Self> {
        Ok(Self::read_le(&mut Cursor::new(&block[..]))?)
    }

    /// 只覆盖结构本身占据的字节，块内其余字节保持原样
    fn encode(&self, block: &mut DataBlock) -> Result<()> {
        Ok(self.write_le(&mut Cursor::new(&mut block[..]))?)
    }
}

impl OnDisk for SuperBlock {}
impl OnDisk for InodeBlock {}
impl OnDisk for DirBlock {}
impl OnDisk for IndirectBlock {}

/// 把磁盘上的块指针转换为块编号，`<= 0` 表示空洞
#[inline]
pub fn pointer(raw: i32) -> Option<u32> {
    (raw > 0).then_some(raw as u32)
}

/// 指针是否落在设备范围内
#[inline]
pub fn in_device(raw: i32) -> bool {
    (0..NUM_BLOCKS as i32).contains(&raw)
}
