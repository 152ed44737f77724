//! # inode 表层
//!
//! inode 表紧跟在超级块之后，从 1 号块开始，每块 128 个 inode。
//! 设备只能整块读写，改动一个 inode 也要读出并写回它所在的整个块。

use alloc::sync::Arc;

use block_dev::BlockDevice;

use crate::block::BlockBuf;
use crate::layout::{DiskInode, INODE_TABLE_BLOCKS, INODES_PER_BLOCK, InodeBlock, SuperBlock};
use crate::{Error, NUM_INODES, Result};

pub struct InodeTable<'a> {
    block_device: &'a Arc<dyn BlockDevice>,
}

impl<'a> InodeTable<'a> {
    #[inline]
    pub fn new(block_device: &'a Arc<dyn BlockDevice>) -> Self {
        Self { block_device }
    }

    /// 通过编号获取 inode 在磁盘上的位置：**块ID**以及**块内槽位**。
    /// 0 号 inode 保留，不能读写。
    pub fn position(inumber: u32) -> Result<(u32, usize)> {
        if inumber == 0 || inumber as usize >= NUM_INODES {
            return Err(Error::InvalidInode(inumber));
        }

        let block_id = inumber / INODES_PER_BLOCK as u32 + 1;
        let slot = inumber as usize % INODES_PER_BLOCK;

        Ok((block_id, slot))
    }

    pub fn read(&self, inumber: u32) -> Result<DiskInode> {
        let (block_id, slot) = Self::position(inumber)?;
        let block = BlockBuf::<InodeBlock>::load(self.block_device, block_id)?;
        Ok(block.inodes[slot])
    }

    pub fn write(&self, inumber: u32, inode: &DiskInode) -> Result<()> {
        let (mut block, slot) = self.load(inumber)?;
        block.inodes[slot] = *inode;
        block.sync(self.block_device)
    }

    /// 加载 inode 所在的块，供调用方修改后自行写回
    pub fn load(&self, inumber: u32) -> Result<(BlockBuf<InodeBlock>, usize)> {
        let (block_id, slot) = Self::position(inumber)?;
        Ok((BlockBuf::load(self.block_device, block_id)?, slot))
    }

    /// 按表序遍历 inode 位图中登记为占用的 inode，包括保留的 0 号
    pub fn for_each_live(
        &self,
        super_block: &SuperBlock,
        mut f: impl FnMut(u32, &DiskInode) -> Result<()>,
    ) -> Result<()> {
        let bitmap = super_block.inode_bitmap();
        for table_index in 0..INODE_TABLE_BLOCKS {
            let block = BlockBuf::<InodeBlock>::load(self.block_device, table_index as u32 + 1)?;
            for (slot, inode) in block.inodes.iter().enumerate() {
                let inumber = table_index * INODES_PER_BLOCK + slot;
                if bitmap.is_used(inumber)? {
                    f(inumber as u32, inode)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inode_position() {
        assert_eq!(InodeTable::position(1), Ok((1, 1)));
        assert_eq!(InodeTable::position(127), Ok((1, 127)));
        assert_eq!(InodeTable::position(128), Ok((2, 0)));
        assert_eq!(InodeTable::position(511), Ok((4, 127)));
    }

    #[test]
    fn reserved_and_overflow() {
        assert_eq!(InodeTable::position(0), Err(Error::InvalidInode(0)));
        assert_eq!(InodeTable::position(512), Err(Error::InvalidInode(512)));
    }
}
