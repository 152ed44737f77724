//! # 调试报告
//!
//! 依次读取超级块、根目录和整张 inode 表，汇总成可打印的 [`Report`]。
//! 根 inode 不是目录或大小为 0 时只报告这一状况，不去解引用目录块。

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use block_dev::BlockDevice;

use crate::block;
use crate::check::{self, Inconsistency};
use crate::dir::RootDirectory;
use crate::itable::InodeTable;
use crate::layout::{DirBlock, DiskInode, HeldBlocks, SuperBlock};
use crate::{NUM_INODES, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub signature_valid: bool,
    pub blocks_in_use: usize,
    pub inodes_in_use: usize,
    pub root: RootReport,
    /// 根目录中的有效目录项；根 inode 不指向合法目录时为空
    pub entries: Option<Vec<EntryReport>>,
    /// inode 位图中占用的全部 inode，按表序
    pub inodes: Vec<InodeReport>,
    pub findings: Vec<Inconsistency>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootReport {
    /// 超级块记录的根 inode 编号非法
    Invalid(i32),
    Inode {
        inumber: u32,
        is_dir: bool,
        size: i32,
        dir_block: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub name: String,
    pub inum: i32,
    /// 目录项的 inode 编号非法时为空
    pub inode: Option<InodeReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeReport {
    pub inumber: u32,
    pub size: i32,
    pub blocks: HeldBlocks,
}

impl InodeReport {
    fn new(inumber: u32, inode: &DiskInode, block_device: &Arc<dyn BlockDevice>) -> Result<Self> {
        Ok(Self {
            inumber,
            size: inode.size,
            blocks: inode.held_blocks(block_device)?,
        })
    }
}

pub fn build(block_device: &Arc<dyn BlockDevice>) -> Result<Report> {
    let super_block: SuperBlock = block::load(block_device, 0)?;
    let itable = InodeTable::new(block_device);

    let root = match super_block.root_inode() {
        Ok(inumber) => {
            let inode = itable.read(inumber)?;
            RootReport::Inode {
                inumber,
                is_dir: inode.is_dir(),
                size: inode.size,
                dir_block: inode.first_direct(),
            }
        }
        Err(_) => RootReport::Invalid(super_block.root_inode),
    };

    let dir_block_id = match root {
        RootReport::Inode { .. } => RootDirectory::new(block_device).explorable(&super_block)?,
        RootReport::Invalid(_) => None,
    };

    let entries = match dir_block_id {
        Some(dir_block_id) => {
            let dir: DirBlock = block::load(block_device, dir_block_id)?;
            let mut entries = Vec::new();
            for entry in dir.entries.iter().filter(|entry| entry.is_valid()) {
                let inode = match u32::try_from(entry.inum) {
                    Ok(inumber) if inumber > 0 && (inumber as usize) < NUM_INODES => Some(
                        InodeReport::new(inumber, &itable.read(inumber)?, block_device)?,
                    ),
                    _ => None,
                };
                entries.push(EntryReport {
                    name: entry.name().to_string(),
                    inum: entry.inum,
                    inode,
                });
            }
            Some(entries)
        }
        None => None,
    };

    let mut inodes = Vec::new();
    itable.for_each_live(&super_block, |inumber, inode| {
        inodes.push(InodeReport::new(inumber, inode, block_device)?);
        Ok(())
    })?;

    Ok(Report {
        signature_valid: super_block.is_valid(),
        blocks_in_use: super_block.block_bitmap().count_used(),
        inodes_in_use: super_block.inode_bitmap().count_used(),
        root,
        entries,
        inodes,
        findings: check::check(block_device)?,
    })
}

/// 以 ", " 分隔的块编号
struct List<'a>(&'a [i32]);

impl fmt::Display for List<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reading superblock...")?;
        writeln!(f, "      superblock:")?;
        let validity = if self.signature_valid { "valid" } else { "invalid" };
        writeln!(f, "            signature is {validity}")?;
        writeln!(f, "            {} blocks in use", self.blocks_in_use)?;
        writeln!(f, "            {} inodes in use", self.inodes_in_use)?;

        writeln!(f, "\nReading root directory...")?;
        match self.root {
            RootReport::Invalid(raw) => writeln!(f, "      root inode {raw} is invalid")?,
            RootReport::Inode {
                inumber,
                size,
                dir_block,
                ..
            } => {
                writeln!(f, "      root inode {inumber}:")?;
                writeln!(f, "            size: {size} bytes")?;
                if let Some(block) = dir_block {
                    writeln!(f, "            direct block: {block}")?;
                }
            }
        }

        writeln!(f, "\nExploring root directory...")?;
        match &self.entries {
            Some(entries) => {
                for entry in entries {
                    writeln!(f, "      {} inode {}:", entry.name, entry.inum)?;
                    let Some(inode) = &entry.inode else {
                        writeln!(f, "            invalid inode number")?;
                        continue;
                    };
                    writeln!(f, "            size: {} bytes", inode.size)?;
                    let blocks = &inode.blocks;
                    if !blocks.direct.is_empty() {
                        writeln!(f, "            direct blocks: {}", List(&blocks.direct))?;
                    }
                    if let Some(indirect) = blocks.indirect {
                        writeln!(f, "            indirect block: {indirect}")?;
                        writeln!(
                            f,
                            "            indirect data blocks: {}",
                            List(&blocks.indirect_data)
                        )?;
                    }
                }
            }
            None => writeln!(
                f,
                "         root inode does not point to a valid directory structure"
            )?,
        }

        writeln!(f, "\nScanning inode table...")?;
        for inode in &self.inodes {
            if inode.inumber == 0 {
                writeln!(f, "      inode 0(reserved for null pointer):")?;
            } else {
                writeln!(f, "      inode {}:", inode.inumber)?;
            }
            writeln!(f, "         size: {} bytes", inode.size)?;
            writeln!(f, "         direct blocks: {}", List(&inode.blocks.direct))?;
            if let Some(indirect) = inode.blocks.indirect {
                writeln!(f, "         indirect block: {indirect}")?;
                writeln!(
                    f,
                    "         indirect data blocks: {}",
                    List(&inode.blocks.indirect_data)
                )?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Checking consistency...")?;
        if self.findings.is_empty() {
            writeln!(f, "      no inconsistencies found")?;
        }
        for finding in &self.findings {
            writeln!(f, "      {finding}")?;
        }

        Ok(())
    }
}
