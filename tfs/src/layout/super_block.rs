use binrw::{BinRead, BinWrite};

use super::Bitmap;
use crate::{BITS_PER_WORD, Error, MAGIC, NUM_BLOCKS, NUM_INODES, Result};

const BLOCK_BITMAP_WORDS: usize = NUM_BLOCKS / BITS_PER_WORD;
const INODE_BITMAP_WORDS: usize = NUM_INODES / BITS_PER_WORD;

/// 超级块，位于 0 号块：
/// - 提供文件系统合法性校验；
/// - 记录镜像容量与根目录；
/// - 内嵌块位图与 inode 位图
///
/// 超级块和 inode 表所在的块不在块位图中登记。
#[derive(Debug, Clone, BinRead, BinWrite)]
pub struct SuperBlock {
    /// 魔数：用于校验文件系统合法性
    signature: u32,
    pub num_blocks: i32,
    pub num_inodes: i32,
    /// 根目录的 inode 编号，约定为 1
    pub root_inode: i32,
    block_in_use: [u32; BLOCK_BITMAP_WORDS],
    inode_in_use: [u32; INODE_BITMAP_WORDS],
}

impl SuperBlock {
    /// 空位图的合法超级块
    pub fn new(root_inode: u32) -> Self {
        Self {
            signature: MAGIC,
            num_blocks: NUM_BLOCKS as i32,
            num_inodes: NUM_INODES as i32,
            root_inode: root_inode as i32,
            block_in_use: [0; BLOCK_BITMAP_WORDS],
            inode_in_use: [0; INODE_BITMAP_WORDS],
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.signature == MAGIC
    }

    #[inline]
    pub fn signature(&self) -> u32 {
        self.signature
    }

    /// 根目录的 inode 编号，0 与越界都视为非法
    pub fn root_inode(&self) -> Result<u32> {
        match u32::try_from(self.root_inode) {
            Ok(inumber) if inumber > 0 && (inumber as usize) < NUM_INODES => Ok(inumber),
            _ => Err(Error::InvalidInode(self.root_inode as u32)),
        }
    }

    #[inline]
    pub fn block_bitmap(&self) -> Bitmap<&[u32]> {
        Bitmap::new(&self.block_in_use[..], NUM_BLOCKS)
    }

    #[inline]
    pub fn block_bitmap_mut(&mut self) -> Bitmap<&mut [u32]> {
        Bitmap::new(&mut self.block_in_use[..], NUM_BLOCKS)
    }

    #[inline]
    pub fn inode_bitmap(&self) -> Bitmap<&[u32]> {
        Bitmap::new(&self.inode_in_use[..], NUM_INODES)
    }

    #[inline]
    pub fn inode_bitmap_mut(&mut self) -> Bitmap<&mut [u32]> {
        Bitmap::new(&mut self.inode_in_use[..], NUM_INODES)
    }

    #[inline]
    pub fn is_block_free(&self, block_id: usize) -> Result<bool> {
        self.block_bitmap().is_free(block_id)
    }

    #[inline]
    pub fn mark_block(&mut self, block_id: usize, used: bool) -> Result<()> {
        self.block_bitmap_mut().mark(block_id, used)
    }

    #[inline]
    pub fn is_inode_free(&self, inumber: usize) -> Result<bool> {
        self.inode_bitmap().is_free(inumber)
    }

    #[inline]
    pub fn mark_inode(&mut self, inumber: usize, used: bool) -> Result<()> {
        self.inode_bitmap_mut().mark(inumber, used)
    }
}
