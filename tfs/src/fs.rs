//! # 文件系统层
//!
//! 对外提供按文件名查找、读取、删除以及诊断。
//! 不在操作之间缓存任何块：每个操作都重新读出它需要的超级块、inode 块和目录块。

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use block_dev::BlockDevice;
use spin::RwLock;

use crate::block::BlockBuf;
use crate::check::{self, Inconsistency};
use crate::dir::RootDirectory;
use crate::itable::InodeTable;
use crate::layout::{DiskInode, SuperBlock};
use crate::report::{self, Report};
use crate::{Error, NUM_INODES, Result, block};

pub struct TinyFileSystem {
    block_device: Arc<dyn BlockDevice>,
}

impl TinyFileSystem {
    /// 不校验签名：签名非法的镜像仍可用 [`TinyFileSystem::debug_dump`] 查看
    #[inline]
    pub fn new(block_device: Arc<dyn BlockDevice>) -> Self {
        Self { block_device }
    }

    /// 供多个使用者共享：读操作取读锁，删除取写锁
    pub fn open(block_device: Arc<dyn BlockDevice>) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(Self::new(block_device)))
    }

    #[inline]
    pub fn block_device(&self) -> &Arc<dyn BlockDevice> {
        &self.block_device
    }

    #[inline]
    pub fn inode_table(&self) -> InodeTable<'_> {
        InodeTable::new(&self.block_device)
    }

    #[inline]
    pub fn root_directory(&self) -> RootDirectory<'_> {
        RootDirectory::new(&self.block_device)
    }

    pub fn super_block(&self) -> Result<SuperBlock> {
        block::load(&self.block_device, 0)
    }

    /// 根据文件名获取 inode 编号，找不到或名字过长时返回空
    pub fn lookup(&self, name: &str) -> Result<Option<u32>> {
        log::debug!("lookup {name:?}");
        match self.root_directory().lookup(name) {
            Ok(inumber) => Ok(Some(inumber)),
            Err(Error::NotFound) => Ok(None),
            Err(Error::NameTooLong) => {
                log::warn!("file name {name:?} is too long");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn read_inode(&self, inumber: u32) -> Result<DiskInode> {
        self.inode_table().read(inumber)
    }

    pub fn write_inode(&self, inumber: u32, inode: &DiskInode) -> Result<()> {
        self.inode_table().write(inumber, inode)
    }

    /// 文件的字节数，找不到文件时返回空
    pub fn getsize(&self, name: &str) -> Result<Option<u32>> {
        let Some(inumber) = self.lookup(name)? else {
            return Ok(None);
        };
        let inode = self.read_inode(inumber)?;
        Ok(Some(inode.size() as u32))
    }

    /// 从 `offset` 开始读出至多 `buf.len()` 个字节，返回实际读出的字节数。
    ///
    /// 非法 inode 编号读出 0 字节而非报错；读到文件末尾或空洞时提前结束。
    pub fn read(&self, inumber: u32, buf: &mut [u8], offset: usize) -> Result<usize> {
        log::debug!("read inode {inumber}: {} bytes at {offset}", buf.len());
        if inumber == 0 || inumber as usize >= NUM_INODES {
            log::warn!("read from invalid inode {inumber}");
            return Ok(0);
        }

        let inode = self.read_inode(inumber)?;
        inode.read_at(offset, buf, &self.block_device)
    }

    pub fn read_to_vec(&self, inumber: u32, offset: usize, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; length];
        let read_size = self.read(inumber, &mut buf, offset)?;
        buf.truncate(read_size);
        Ok(buf)
    }

    /// 删除文件，返回被释放的 inode 编号；找不到文件时不做任何写入并返回空。
    ///
    /// 依次写回 inode 块、目录块、超级块，三次写入之间没有事务保护：
    /// 中途设备出错会留下不一致的镜像，删除不具备崩溃原子性。
    pub fn delete(&mut self, name: &str) -> Result<Option<u32>> {
        log::debug!("delete {name:?}");
        let Some(inumber) = self.lookup(name)? else {
            return Ok(None);
        };

        let mut super_block = BlockBuf::<SuperBlock>::load(&self.block_device, 0)?;
        let (mut inode_block, slot) = self.inode_table().load(inumber)?;
        // 在任何写入之前定位目录块
        let dir_block_id = self.root_directory().locate(&super_block)?;

        // 释放数据块、间接索引块本身
        let held = inode_block.inodes[slot].held_blocks(&self.block_device)?;
        for raw in held.iter() {
            let block_id = usize::try_from(raw).map_err(|_| Error::OutOfRange {
                index: raw as usize,
                limit: super_block.block_bitmap().capacity(),
            })?;
            super_block.mark_block(block_id, false)?;
        }

        inode_block.inodes[slot] = DiskInode::default();
        inode_block.sync(&self.block_device)?;

        super_block.mark_inode(inumber as usize, false)?;

        self.root_directory().remove_entry_in(dir_block_id, inumber)?;

        super_block.sync(&self.block_device)?;

        log::info!("deleted {name:?} (inode {inumber})");
        Ok(Some(inumber))
    }

    pub fn debug_dump(&self) -> Result<Report> {
        report::build(&self.block_device)
    }

    pub fn check(&self) -> Result<Vec<Inconsistency>> {
        check::check(&self.block_device)
    }
}
