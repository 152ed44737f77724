//! # 一致性检查
//!
//! 只读地遍历超级块、inode 表与根目录，把位图和实际引用关系相互对照。
//! 活跃 inode 以 inode 位图为准；超级块与 inode 表所在的块不在块位图中登记，
//! 指向它们的指针单独报告。

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use block_dev::BlockDevice;

use crate::block;
use crate::dir::RootDirectory;
use crate::itable::InodeTable;
use crate::layout::{DirBlock, INODE_TABLE_BLOCKS, SuperBlock, in_device};
use crate::{Error, NUM_BLOCKS, NUM_INODES, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    BadSignature(u32),
    /// 指针超出设备范围
    BadPointer { inode: u32, raw: i32 },
    /// 指针落在超级块或 inode 表上
    ReservedBlock { block: u32, inode: u32 },
    /// 同一个块被引用了不止一次
    DoubleReference { block: u32, inode: u32 },
    /// 被引用的块在位图中是空闲的
    UnmarkedBlock { block: u32, inode: u32 },
    /// 位图中占用的块没有任何 inode 引用
    LeakedBlock(u32),
    /// 有效目录项指向空闲或非法的 inode
    DanglingEntry { name: String, inode: i32 },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadSignature(signature) => write!(f, "bad signature {signature:#x}"),
            Self::BadPointer { inode, raw } => {
                write!(f, "inode {inode} has out-of-range pointer {raw}")
            }
            Self::ReservedBlock { block, inode } => {
                write!(f, "inode {inode} points at reserved block {block}")
            }
            Self::DoubleReference { block, inode } => {
                write!(f, "block {block} referenced again by inode {inode}")
            }
            Self::UnmarkedBlock { block, inode } => {
                write!(f, "block {block} used by inode {inode} is marked free")
            }
            Self::LeakedBlock(block) => write!(f, "block {block} marked in use but unreferenced"),
            Self::DanglingEntry { name, inode } => {
                write!(f, "entry {name:?} refers to free inode {inode}")
            }
        }
    }
}

pub fn check(block_device: &Arc<dyn BlockDevice>) -> Result<Vec<Inconsistency>> {
    let super_block: SuperBlock = block::load(block_device, 0)?;
    let mut findings = Vec::new();

    if !super_block.is_valid() {
        findings.push(Inconsistency::BadSignature(super_block.signature()));
    }

    // 每个块的引用者
    let mut owners: Vec<Option<u32>> = vec![None; NUM_BLOCKS];
    InodeTable::new(block_device).for_each_live(&super_block, |inumber, inode| {
        for raw in inode.held_blocks(block_device)?.iter() {
            if !in_device(raw) {
                findings.push(Inconsistency::BadPointer {
                    inode: inumber,
                    raw,
                });
                continue;
            }

            let block = raw as u32;
            if block as usize <= INODE_TABLE_BLOCKS {
                findings.push(Inconsistency::ReservedBlock {
                    block,
                    inode: inumber,
                });
                continue;
            }

            let owner = &mut owners[block as usize];
            if owner.is_some() {
                findings.push(Inconsistency::DoubleReference {
                    block,
                    inode: inumber,
                });
            }
            owner.get_or_insert(inumber);

            if super_block.is_block_free(block as usize)? {
                findings.push(Inconsistency::UnmarkedBlock {
                    block,
                    inode: inumber,
                });
            }
        }

        Ok(())
    })?;

    findings.extend(
        super_block
            .block_bitmap()
            .used()
            .filter(|&block| block > INODE_TABLE_BLOCKS && owners[block].is_none())
            .map(|block| Inconsistency::LeakedBlock(block as u32)),
    );

    // 根 inode 不是合法目录时不解读它的数据块
    let dir_block_id = match RootDirectory::new(block_device).explorable(&super_block) {
        Ok(id) => id,
        Err(err @ (Error::Device(_) | Error::Codec)) => return Err(err),
        Err(_) => None,
    };
    if let Some(dir_block_id) = dir_block_id {
        let dir: DirBlock = block::load(block_device, dir_block_id)?;
        for entry in dir.entries.iter().filter(|entry| entry.is_valid()) {
            let live = usize::try_from(entry.inum)
                .ok()
                .filter(|&inumber| inumber > 0 && inumber < NUM_INODES)
                .map(|inumber| super_block.inode_bitmap().is_used(inumber))
                .transpose()?
                .unwrap_or(false);
            if !live {
                findings.push(Inconsistency::DanglingEntry {
                    name: entry.name().to_string(),
                    inode: entry.inum,
                });
            }
        }
    }

    for finding in &findings {
        log::warn!("inconsistency: {finding}");
    }

    Ok(findings)
}
