//! # 块缓冲层
//!
//! 文件系统对设备的每次访问都是整块读写。
//! [`BlockBuf`] 保存某个块读出时的原始字节以及解码后的结构，
//! 修改结构后再整块写回；它只存在于一次操作之内，不在操作之间缓存。

use alloc::sync::Arc;
use core::ops::{Deref, DerefMut};

use block_dev::BlockDevice;

use crate::layout::OnDisk;
use crate::{BLOCK_SIZE, DataBlock, Result};

pub fn read(block_device: &Arc<dyn BlockDevice>, block_id: u32) -> Result<DataBlock> {
    log::trace!("read block {block_id}");
    let mut data = [0; BLOCK_SIZE];
    block_device.read_block(block_id as usize, &mut data)?;
    Ok(data)
}

pub fn write(block_device: &Arc<dyn BlockDevice>, block_id: u32, data: &DataBlock) -> Result<()> {
    log::trace!("write block {block_id}");
    block_device.write_block(block_id as usize, data)?;
    Ok(())
}

/// 读出并解码，不保留原始字节
#[inline]
pub fn load<T: OnDisk>(block_device: &Arc<dyn BlockDevice>, block_id: u32) -> Result<T> {
    T::decode(&read(block_device, block_id)?)
}

/// 内存中的块
pub struct BlockBuf<T> {
    /// 对应的块ID
    block_id: u32,
    /// 读出时的原始数据
    raw: DataBlock,
    data: T,
}

impl<T: OnDisk> BlockBuf<T> {
    pub fn load(block_device: &Arc<dyn BlockDevice>, block_id: u32) -> Result<Self> {
        let raw = read(block_device, block_id)?;
        let data = T::decode(&raw)?;
        Ok(Self {
            block_id,
            raw,
            data,
        })
    }

    /// 把结构编码回原始数据并写回设备
    pub fn sync(&mut self, block_device: &Arc<dyn BlockDevice>) -> Result<()> {
        self.data.encode(&mut self.raw)?;
        write(block_device, self.block_id, &self.raw)
    }
}

impl<T> Deref for BlockBuf<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for BlockBuf<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}
