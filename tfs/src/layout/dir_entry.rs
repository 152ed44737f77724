use core::str;

use binrw::{BinRead, BinWrite};

use crate::BLOCK_SIZE;

/// 文件名字段的字节数，最后至少留一字节给 \0
pub const NAME_CAP: usize = 24;
/// 目录项大小恒为32字节
pub const DIR_ENTRY_SIZE: usize = 32;
pub const NUM_DENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DIR_ENTRY_SIZE;

/// 文件名到 inode 编号的绑定
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
pub struct DirEntry {
    /// 非 0 表示有效，0 表示空槽
    pub valid: i32,
    name: [u8; NAME_CAP],
    pub inum: i32,
}

/// 目录块：根目录唯一的数据块
#[derive(Debug, Clone, BinRead, BinWrite)]
pub struct DirBlock {
    pub entries: [DirEntry; NUM_DENTRIES_PER_BLOCK],
}

impl DirEntry {
    /// 文件名放不下时返回空
    pub fn new(name: &str, inum: u32) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() >= NAME_CAP {
            return None;
        }

        let mut entry = Self {
            valid: 1,
            inum: inum as i32,
            ..Default::default()
        };
        entry.name[..bytes.len()].copy_from_slice(bytes);
        Some(entry)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid != 0
    }

    /// \0 之前的原始字节；字段被写满时取全部 24 字节
    pub fn name_bytes(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(NAME_CAP);
        &self.name[..len]
    }

    /// 非 UTF-8 的名字按有效前缀显示
    pub fn name(&self) -> &str {
        let bytes = self.name_bytes();
        match str::from_utf8(bytes) {
            Ok(name) => name,
            Err(err) => str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default(),
        }
    }

    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        self.is_valid() && self.name_bytes() == name.as_bytes()
    }
}

impl DirBlock {
    pub fn zeroed() -> Self {
        Self {
            entries: [DirEntry::default(); NUM_DENTRIES_PER_BLOCK],
        }
    }
}
