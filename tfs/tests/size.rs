use binrw::BinWrite;
use binrw::io::Cursor;

use tfs::BLOCK_SIZE;
use tfs::layout::{
    DIR_ENTRY_SIZE, DirBlock, DirEntry, DiskInode, INODE_SIZE, IndirectBlock, InodeBlock,
    InodeKind, SuperBlock,
};

/// 编码后写到了第几个字节
fn encoded_len<T: for<'a> BinWrite<Args<'a> = ()>>(value: &T) -> usize {
    let mut block = [0xAAu8; BLOCK_SIZE];
    let mut cursor = Cursor::new(&mut block[..]);
    value.write_le(&mut cursor).unwrap();
    cursor.position() as usize
}

#[test]
fn encoded_layout() {
    assert_eq!(INODE_SIZE, encoded_len(&DiskInode::new(InodeKind::Regular, 1)));
    assert_eq!(DIR_ENTRY_SIZE, encoded_len(&DirEntry::new("a.txt", 2).unwrap()));
    // 4 个标量字段 + 64 字块位图 + 16 字 inode 位图
    assert_eq!(336, encoded_len(&SuperBlock::new(1)));
    assert_eq!(BLOCK_SIZE, encoded_len(&InodeBlock::zeroed()));
    assert_eq!(BLOCK_SIZE, encoded_len(&DirBlock::zeroed()));
    assert_eq!(BLOCK_SIZE, encoded_len(&IndirectBlock::zeroed()));
}
