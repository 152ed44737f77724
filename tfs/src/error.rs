use core::fmt;

use block_dev::DeviceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 根目录中没有该文件名
    NotFound,
    /// 文件名连同结尾的 \0 放不进目录项
    NameTooLong,
    /// inode 编号为 0 或超出 inode 表
    InvalidInode(u32),
    /// 位图或块编号越界
    OutOfRange { index: usize, limit: usize },
    /// 根 inode 没有任何数据块
    NoRootDirectory,
    Device(DeviceError),
    /// 块内容无法按布局解码
    Codec,
}

pub type Result<T> = core::result::Result<T, Error>;

impl From<DeviceError> for Error {
    fn from(err: DeviceError) -> Self {
        Self::Device(err)
    }
}

impl From<binrw::Error> for Error {
    fn from(err: binrw::Error) -> Self {
        log::error!("layout codec failed: {err}");
        Self::Codec
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("no such file"),
            Self::NameTooLong => f.write_str("file name too long"),
            Self::InvalidInode(inumber) => write!(f, "invalid inode number {inumber}"),
            Self::OutOfRange { index, limit } => {
                write!(f, "index {index} out of range (limit {limit})")
            }
            Self::NoRootDirectory => f.write_str("root inode has no directory block"),
            Self::Device(err) => write!(f, "device error: {err}"),
            Self::Codec => f.write_str("malformed on-disk structure"),
        }
    }
}

impl core::error::Error for Error {}
