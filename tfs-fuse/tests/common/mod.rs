//! 在内存盘上逐块拼出测试镜像

#![allow(dead_code)]

use std::sync::Arc;

use block_dev::BlockDevice;
use tfs::layout::{
    DirBlock, DirEntry, DiskInode, INODE_TABLE_BLOCKS, INODES_PER_BLOCK, IndirectBlock,
    InodeBlock, InodeKind, OnDisk, POINTERS_PER_INODE, SuperBlock,
};
use tfs::{BLOCK_SIZE, TinyFileSystem};
use tfs_fuse::RamDisk;

pub const ROOT_INODE: u32 = 1;
/// 数据块中文件内容之后的填充字节
pub const PAD: u8 = 0xEE;

pub struct ImageBuilder {
    disk: Arc<RamDisk>,
    pub super_block: SuperBlock,
    table: Vec<InodeBlock>,
    dir: DirBlock,
    dir_block: u32,
    next_block: u32,
}

impl ImageBuilder {
    /// 根目录 inode 1，目录内容放在 `dir_block`
    pub fn new(dir_block: u32) -> Self {
        let mut super_block = SuperBlock::new(ROOT_INODE);
        super_block.mark_inode(ROOT_INODE as usize, true).unwrap();
        super_block.mark_block(dir_block as usize, true).unwrap();

        let mut table: Vec<InodeBlock> =
            (0..INODE_TABLE_BLOCKS).map(|_| InodeBlock::zeroed()).collect();
        let mut root = DiskInode::new(InodeKind::Directory, BLOCK_SIZE as u32);
        root.direct[0] = dir_block as i32;
        table[0].inodes[ROOT_INODE as usize] = root;

        Self {
            disk: Arc::new(RamDisk::new()),
            super_block,
            table,
            dir: DirBlock::zeroed(),
            dir_block,
            next_block: INODE_TABLE_BLOCKS as u32 + 1,
        }
    }

    pub fn alloc_block(&mut self) -> u32 {
        while self.next_block == self.dir_block
            || !self
                .super_block
                .is_block_free(self.next_block as usize)
                .unwrap()
        {
            self.next_block += 1;
        }
        let block = self.next_block;
        self.next_block += 1;
        block
    }

    /// 按顺序分配数据块存放内容
    pub fn file(&mut self, name: &str, inumber: u32, content: &[u8]) -> &mut Self {
        let blocks: Vec<u32> = content
            .chunks(BLOCK_SIZE)
            .map(|_| self.alloc_block())
            .collect();
        self.file_at(name, inumber, content, &blocks)
    }

    /// 用指定的数据块存放内容，超过 5 块时再分配一个间接索引块
    pub fn file_at(
        &mut self,
        name: &str,
        inumber: u32,
        content: &[u8],
        blocks: &[u32],
    ) -> &mut Self {
        let mut inode = DiskInode::new(InodeKind::Regular, content.len() as u32);

        for (chunk, &block) in content.chunks(BLOCK_SIZE).zip(blocks) {
            self.data(block, chunk);
        }

        for (slot, &block) in inode.direct.iter_mut().zip(blocks) {
            *slot = block as i32;
        }
        if blocks.len() > POINTERS_PER_INODE {
            let indirect_block = self.alloc_block();
            let mut indirect = IndirectBlock::zeroed();
            for (slot, &block) in indirect.pointers.iter_mut().zip(&blocks[POINTERS_PER_INODE..]) {
                *slot = block as i32;
            }
            self.put(indirect_block, &indirect);
            self.super_block
                .mark_block(indirect_block as usize, true)
                .unwrap();
            inode.indirect = indirect_block as i32;
        }

        self.inode(inumber, inode).entry(name, inumber)
    }

    /// 写入一个数据块并在位图中登记，内容之后用 [`PAD`] 填充
    pub fn data(&mut self, block: u32, content: &[u8]) -> &mut Self {
        let mut data = [PAD; BLOCK_SIZE];
        data[..content.len()].copy_from_slice(content);
        self.disk.write_block(block as usize, &data).unwrap();
        self.super_block.mark_block(block as usize, true).unwrap();
        self
    }

    /// 写入 inode 并在位图中登记
    pub fn inode(&mut self, inumber: u32, inode: DiskInode) -> &mut Self {
        let inumber = inumber as usize;
        self.table[inumber / INODES_PER_BLOCK].inodes[inumber % INODES_PER_BLOCK] = inode;
        self.super_block.mark_inode(inumber, true).unwrap();
        self
    }

    /// 在第一个空槽添加目录项
    pub fn entry(&mut self, name: &str, inumber: u32) -> &mut Self {
        let slot = self
            .dir
            .entries
            .iter_mut()
            .find(|entry| !entry.is_valid())
            .expect("root directory is full");
        *slot = DirEntry::new(name, inumber).unwrap();
        self
    }

    pub fn put<T: OnDisk>(&self, block: u32, value: &T) {
        let mut data = [0u8; BLOCK_SIZE];
        value.encode(&mut data).unwrap();
        self.disk.write_block(block as usize, &data).unwrap();
    }

    pub fn build(&mut self) -> Arc<RamDisk> {
        self.put(0, &self.super_block);
        for (index, table_block) in self.table.iter().enumerate() {
            self.put(index as u32 + 1, table_block);
        }
        self.put(self.dir_block, &self.dir);
        self.disk.clone()
    }
}

pub fn open(disk: &Arc<RamDisk>) -> TinyFileSystem {
    TinyFileSystem::new(disk.clone())
}

/// 每个块内容都不相同的测试数据
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i % 251) as u8 ^ (i / BLOCK_SIZE) as u8)
        .collect()
}

pub fn read_block(disk: &Arc<RamDisk>, block: u32) -> Vec<u8> {
    let mut data = vec![0u8; BLOCK_SIZE];
    disk.read_block(block as usize, &mut data).unwrap();
    data
}
