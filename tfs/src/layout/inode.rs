//! inode 与间接索引块
//!
//! 一个 inode 至多指向 5 个直接数据块和 1 个一级间接索引块；
//! 间接索引块整块连续存储**块编号**，每个编号都指向一个**数据块**。
//!
//! 逻辑块索引 `i < 5` 时取 `direct[i]`，否则取间接索引块的第 `i - 5` 项。

use alloc::sync::Arc;
use alloc::vec::Vec;

use binrw::{BinRead, BinWrite};
use block_dev::BlockDevice;

use super::{in_device, pointer};
use crate::block;
use crate::{BLOCK_SIZE, NUM_INODES, Result};

pub const INODE_SIZE: usize = 32;
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;
/// inode 表占据的块数，从 1 号块开始
pub const INODE_TABLE_BLOCKS: usize = NUM_INODES / INODES_PER_BLOCK;

/// 直接索引个数
pub const POINTERS_PER_INODE: usize = 5;
/// 间接索引块的编号容量
pub const POINTERS_PER_BLOCK: usize = BLOCK_SIZE / 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum InodeKind {
    Regular = 1,
    Directory = 2,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
pub struct DiskInode {
    /// 类型，见 [`InodeKind`]；0 表示未使用
    pub kind: i32,
    /// 文件内容的字节数
    pub size: i32,
    /// 直接索引，0 表示没有对应的块
    pub direct: [i32; POINTERS_PER_INODE],
    /// 指向一个一级间接索引块
    pub indirect: i32,
}

/// inode 表中的一个块
#[derive(Debug, Clone, BinRead, BinWrite)]
pub struct InodeBlock {
    pub inodes: [DiskInode; INODES_PER_BLOCK],
}

/// 间接索引块
#[derive(Debug, Clone, BinRead, BinWrite)]
pub struct IndirectBlock {
    pub pointers: [i32; POINTERS_PER_BLOCK],
}

/// inode 持有的全部非零块指针
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeldBlocks {
    pub direct: Vec<i32>,
    pub indirect: Option<i32>,
    /// 间接索引块里的非零项；间接指针越界时不读取，恒为空
    pub indirect_data: Vec<i32>,
}

impl HeldBlocks {
    /// 数据块在前，间接索引块本身在最后
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.direct
            .iter()
            .chain(&self.indirect_data)
            .chain(&self.indirect)
            .copied()
    }
}

impl InodeKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::Regular),
            2 => Some(Self::Directory),
            _ => None,
        }
    }
}

impl InodeBlock {
    pub fn zeroed() -> Self {
        Self {
            inodes: [DiskInode::default(); INODES_PER_BLOCK],
        }
    }
}

impl IndirectBlock {
    pub fn zeroed() -> Self {
        Self {
            pointers: [0; POINTERS_PER_BLOCK],
        }
    }
}

impl DiskInode {
    pub fn new(kind: InodeKind, size: u32) -> Self {
        Self {
            kind: kind as i32,
            size: size as i32,
            ..Default::default()
        }
    }

    #[inline]
    pub fn kind(&self) -> Option<InodeKind> {
        InodeKind::from_raw(self.kind)
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind() == Some(InodeKind::Directory)
    }

    /// 负数的大小按 0 处理
    #[inline]
    pub fn size(&self) -> usize {
        self.size.max(0) as usize
    }

    /// 第一个非零的直接索引：根目录唯一的目录块
    pub fn first_direct(&self) -> Option<u32> {
        self.direct.iter().find_map(|&raw| pointer(raw))
    }

    /// 逻辑上 inode 指向一系列数据块，此处传入的是这些数据块的索引（逻辑索引），
    /// 返回物理块编号；空洞或超出一级间接索引的范围时返回空。
    ///
    /// 间接索引块在一次读操作中只加载一次，由 `indirect` 暂存。
    pub fn block_id(
        &self,
        block_index: usize,
        indirect: &mut Option<IndirectBlock>,
        block_device: &Arc<dyn BlockDevice>,
    ) -> Result<Option<u32>> {
        if block_index < POINTERS_PER_INODE {
            return Ok(pointer(self.direct[block_index]));
        }

        // 剔去直接索引的部分
        let index = block_index - POINTERS_PER_INODE;
        if index >= POINTERS_PER_BLOCK {
            return Ok(None);
        }
        let Some(indirect_id) = pointer(self.indirect) else {
            return Ok(None);
        };

        if indirect.is_none() {
            *indirect = Some(block::load(block_device, indirect_id)?);
        }

        Ok(indirect
            .as_ref()
            .and_then(|indirect: &IndirectBlock| pointer(indirect.pointers[index])))
    }

    /// 从指定位置(字节偏移)读出数据填充`buf`，返回实际读出的字节数。
    ///
    /// - 起点在文件末尾及之后时读出 0 字节；
    /// - 长度被截断到文件末尾；
    /// - 遇到空洞就此停下，返回已读出的部分。
    pub fn read_at(
        &self,
        offset: usize,
        buf: &mut [u8],
        block_device: &Arc<dyn BlockDevice>,
    ) -> Result<usize> {
        let size = self.size();
        if offset >= size {
            return Ok(0);
        }
        let length = buf.len().min(size - offset);

        let mut indirect = None;
        // 已读取多少字节
        let mut read_size = 0;
        while read_size < length {
            let start = offset + read_size;
            let Some(block_id) = self.block_id(start / BLOCK_SIZE, &mut indirect, block_device)?
            else {
                log::debug!("hole at logical block {}, short read", start / BLOCK_SIZE);
                break;
            };

            let data = block::read(block_device, block_id)?;
            // 绝对地址 % 块大小 = 块内偏移
            let block_offset = start % BLOCK_SIZE;
            let block_read_size = (BLOCK_SIZE - block_offset).min(length - read_size);
            buf[read_size..read_size + block_read_size]
                .copy_from_slice(&data[block_offset..block_offset + block_read_size]);

            read_size += block_read_size;
        }

        Ok(read_size)
    }

    /// 收集 inode 引用的全部非零块指针
    pub fn held_blocks(&self, block_device: &Arc<dyn BlockDevice>) -> Result<HeldBlocks> {
        let mut held = HeldBlocks {
            direct: self.direct.iter().copied().filter(|&raw| raw != 0).collect(),
            ..Default::default()
        };

        if self.indirect != 0 {
            held.indirect = Some(self.indirect);
            if in_device(self.indirect) {
                let indirect: IndirectBlock = block::load(block_device, self.indirect as u32)?;
                held.indirect_data = indirect
                    .pointers
                    .iter()
                    .copied()
                    .filter(|&raw| raw != 0)
                    .collect();
            }
        }

        Ok(held)
    }
}
