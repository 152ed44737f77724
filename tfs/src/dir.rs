//! # 目录层
//!
//! 整个文件系统只有一个根目录，它的内容恰好是一个数据块：
//! 根 inode 第一个非零的直接索引。目录项不排序也不去重，查找取第一个匹配。

use alloc::sync::Arc;

use block_dev::BlockDevice;

use crate::block::{self, BlockBuf};
use crate::itable::InodeTable;
use crate::layout::{DirBlock, NAME_CAP, SuperBlock, in_device};
use crate::{Error, Result};

pub struct RootDirectory<'a> {
    block_device: &'a Arc<dyn BlockDevice>,
}

impl<'a> RootDirectory<'a> {
    #[inline]
    pub fn new(block_device: &'a Arc<dyn BlockDevice>) -> Self {
        Self { block_device }
    }

    /// 根目录唯一的目录块
    pub fn locate(&self, super_block: &SuperBlock) -> Result<u32> {
        let root = InodeTable::new(self.block_device).read(super_block.root_inode()?)?;
        root.first_direct().ok_or(Error::NoRootDirectory)
    }

    /// 根 inode 是非空目录、且目录块落在设备内时才返回目录块，
    /// 诊断时只沿着这样的目录块继续遍历
    pub fn explorable(&self, super_block: &SuperBlock) -> Result<Option<u32>> {
        let root = InodeTable::new(self.block_device).read(super_block.root_inode()?)?;
        if !root.is_dir() || root.size <= 0 {
            return Ok(None);
        }

        Ok(root.first_direct().filter(|&block_id| in_device(block_id as i32)))
    }

    /// 根据文件名获取 inode 编号。
    ///
    /// 名字放不进目录项时不访问设备，直接返回 [`Error::NameTooLong`]。
    pub fn lookup(&self, name: &str) -> Result<u32> {
        if name.len() >= NAME_CAP {
            return Err(Error::NameTooLong);
        }

        let super_block: SuperBlock = block::load(self.block_device, 0)?;
        let dir_block_id = self.locate(&super_block)?;
        let dir: DirBlock = block::load(self.block_device, dir_block_id)?;

        dir.entries
            .iter()
            .find(|entry| entry.matches(name))
            // 指向 0 号或负编号的目录项视同不存在
            .and_then(|entry| u32::try_from(entry.inum).ok())
            .filter(|&inumber| inumber > 0)
            .ok_or(Error::NotFound)
    }

    /// 清除根目录中第一个指向 `inumber` 的有效目录项
    pub fn remove_entry(&self, inumber: u32) -> Result<bool> {
        let super_block: SuperBlock = block::load(self.block_device, 0)?;
        let dir_block_id = self.locate(&super_block)?;
        self.remove_entry_in(dir_block_id, inumber)
    }

    /// 在给定的目录块中清除目录项，有改动时才写回
    pub fn remove_entry_in(&self, dir_block_id: u32, inumber: u32) -> Result<bool> {
        let mut dir = BlockBuf::<DirBlock>::load(self.block_device, dir_block_id)?;

        let Some(entry) = dir
            .entries
            .iter_mut()
            .find(|entry| entry.is_valid() && entry.inum as i64 == inumber as i64)
        else {
            log::warn!("no directory entry refers to inode {inumber}");
            return Ok(false);
        };

        *entry = Default::default();
        dir.sync(self.block_device)?;
        Ok(true)
    }
}
