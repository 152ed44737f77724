use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use block_dev::{BlockDevice, DeviceError};
use tfs::{BLOCK_SIZE, NUM_BLOCKS};

/// 把镜像文件当作块设备
pub struct BlockFile(pub Mutex<File>);

impl BlockFile {
    pub fn new(fd: File) -> Self {
        Self(Mutex::new(fd))
    }

    fn seek(file: &mut File, block_id: usize) -> Result<(), DeviceError> {
        if block_id >= NUM_BLOCKS {
            return Err(DeviceError::OutOfRange(block_id));
        }
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .map_err(|err| {
                log::error!("seeking block {block_id}: {err}");
                DeviceError::Io
            })?;
        Ok(())
    }
}

impl BlockDevice for BlockFile {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), DeviceError> {
        let mut file = self.0.lock().map_err(|_| DeviceError::Io)?;
        Self::seek(&mut file, block_id)?;
        file.read_exact(buf).map_err(|err| {
            log::error!("reading block {block_id}: {err}");
            DeviceError::ShortTransfer(block_id)
        })
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), DeviceError> {
        let mut file = self.0.lock().map_err(|_| DeviceError::Io)?;
        Self::seek(&mut file, block_id)?;
        file.write_all(buf).map_err(|err| {
            log::error!("writing block {block_id}: {err}");
            DeviceError::ShortTransfer(block_id)
        })
    }
}

/// 内存盘，记录读写次数
pub struct RamDisk {
    data: Mutex<Vec<u8>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl RamDisk {
    /// 全零的 8MiB 镜像
    pub fn new() -> Self {
        Self {
            data: Mutex::new(vec![0; NUM_BLOCKS * BLOCK_SIZE]),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// 迄今为止读出的块数
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// 迄今为止写入的块数
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// 整个镜像的拷贝
    pub fn snapshot(&self) -> Vec<u8> {
        match self.data.lock() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn range(block_id: usize, len: usize) -> Result<std::ops::Range<usize>, DeviceError> {
        if block_id >= NUM_BLOCKS {
            return Err(DeviceError::OutOfRange(block_id));
        }
        if len != BLOCK_SIZE {
            return Err(DeviceError::ShortTransfer(block_id));
        }
        let start = block_id * BLOCK_SIZE;
        Ok(start..start + BLOCK_SIZE)
    }
}

impl Default for RamDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), DeviceError> {
        let range = Self::range(block_id, buf.len())?;
        buf.copy_from_slice(&self.data.lock().map_err(|_| DeviceError::Io)?[range]);
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), DeviceError> {
        let range = Self::range(block_id, buf.len())?;
        self.data.lock().map_err(|_| DeviceError::Io)?[range].copy_from_slice(buf);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
