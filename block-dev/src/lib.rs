//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘镜像、内存盘等；
//! [`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 驱动只负责整块的同步读写，不做缓存，也不保证崩溃一致性。

#![no_std]

use core::any::Any;
use core::fmt;

/// 块设备驱动特质
///
/// `buf` 的长度恒为一个块的大小，由文件系统保证。
pub trait BlockDevice: Send + Sync + Any {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), DeviceError>;
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), DeviceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// 块编号超出设备容量
    OutOfRange(usize),
    /// 读写的字节数不足一个块
    ShortTransfer(usize),
    /// 底层介质报错
    Io,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(block_id) => write!(f, "block {block_id} is out of device range"),
            Self::ShortTransfer(block_id) => write!(f, "incomplete transfer of block {block_id}"),
            Self::Io => f.write_str("device I/O failure"),
        }
    }
}

impl core::error::Error for DeviceError {}
