mod common;

use common::{ImageBuilder, open, pattern};
use tfs::layout::{DiskInode, IndirectBlock, InodeKind, OnDisk};
use tfs::BLOCK_SIZE;

#[test]
fn whole_file() {
    let content = pattern(3 * BLOCK_SIZE + 100);
    let disk = ImageBuilder::new(5).file("data", 2, &content).build();
    let fs = open(&disk);

    assert_eq!(fs.read_to_vec(2, 0, content.len()).unwrap(), content);

    let mut buf = vec![0; content.len()];
    assert_eq!(fs.read(2, &mut buf, 0).unwrap(), content.len());
    assert_eq!(buf, content);
}

#[test]
fn end_of_file() {
    let content = pattern(BLOCK_SIZE + 17);
    let size = content.len();
    let disk = ImageBuilder::new(5).file("data", 2, &content).build();
    let fs = open(&disk);

    assert!(fs.read_to_vec(2, size, 1).unwrap().is_empty());
    assert!(fs.read_to_vec(2, size + BLOCK_SIZE, 1).unwrap().is_empty());
    assert_eq!(fs.read_to_vec(2, size - 1, 10).unwrap(), [content[size - 1]]);
    assert!(fs.read_to_vec(2, 0, 0).unwrap().is_empty());
}

#[test]
fn length_clamped_to_size() {
    let content = pattern(2 * BLOCK_SIZE + 9);
    let disk = ImageBuilder::new(5).file("data", 2, &content).build();
    let fs = open(&disk);

    for offset in [0, 100, BLOCK_SIZE, 2 * BLOCK_SIZE + 8] {
        let data = fs.read_to_vec(2, offset, content.len()).unwrap();
        assert_eq!(data.len(), content.len() - offset);
        assert_eq!(data, content[offset..]);
    }
}

#[test]
fn spans_block_boundary() {
    let content = pattern(2 * BLOCK_SIZE);
    let disk = ImageBuilder::new(5).file("data", 2, &content).build();
    let fs = open(&disk);

    let data = fs.read_to_vec(2, BLOCK_SIZE - 3, 6).unwrap();
    assert_eq!(data, content[BLOCK_SIZE - 3..BLOCK_SIZE + 3]);
}

#[test]
fn five_blocks_stay_direct() {
    let content = pattern(5 * BLOCK_SIZE);
    let disk = ImageBuilder::new(5).file("five", 2, &content).build();
    let fs = open(&disk);

    let inode = fs.read_inode(2).unwrap();
    assert_eq!(inode.indirect, 0);
    assert!(inode.direct.iter().all(|&block| block > 0));
    assert_eq!(fs.read_to_vec(2, 0, content.len()).unwrap(), content);
}

#[test]
fn sixth_block_goes_through_indirect() {
    let content = pattern(6 * BLOCK_SIZE);
    let disk = ImageBuilder::new(5).file("six", 2, &content).build();
    let fs = open(&disk);

    let inode = fs.read_inode(2).unwrap();
    assert_ne!(inode.indirect, 0);

    // 数据块顺序分配在 6..=11，间接索引块在其后
    assert_eq!(inode.direct, [6, 7, 8, 9, 10]);
    let indirect = IndirectBlock::decode(
        &common::read_block(&disk, inode.indirect as u32)
            .try_into()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(indirect.pointers[0], 11);
    assert!(indirect.pointers[1..].iter().all(|&block| block == 0));

    let tail = fs.read_to_vec(2, 5 * BLOCK_SIZE, BLOCK_SIZE).unwrap();
    assert_eq!(tail, content[5 * BLOCK_SIZE..]);
    assert_eq!(fs.read_to_vec(2, 0, content.len()).unwrap(), content);
}

#[test]
fn long_file_through_indirect() {
    let content = pattern(40 * BLOCK_SIZE + 1234);
    let disk = ImageBuilder::new(5).file("long", 2, &content).build();
    let fs = open(&disk);

    assert_eq!(fs.read_to_vec(2, 0, content.len()).unwrap(), content);
    let offset = 33 * BLOCK_SIZE + 77;
    assert_eq!(
        fs.read_to_vec(2, offset, 2 * BLOCK_SIZE).unwrap(),
        content[offset..offset + 2 * BLOCK_SIZE]
    );
}

#[test]
fn hole_short_reads() {
    let mut builder = ImageBuilder::new(5);
    builder.data(6, &pattern(BLOCK_SIZE)).data(8, &pattern(BLOCK_SIZE));
    let mut inode = DiskInode::new(InodeKind::Regular, 3 * BLOCK_SIZE as u32);
    inode.direct = [6, 0, 8, 0, 0];
    let disk = builder.inode(2, inode).entry("sparse", 2).build();
    let fs = open(&disk);

    assert_eq!(fs.read_to_vec(2, 0, 3 * BLOCK_SIZE).unwrap().len(), BLOCK_SIZE);
    assert!(fs.read_to_vec(2, BLOCK_SIZE, 10).unwrap().is_empty());
    assert_eq!(fs.read_to_vec(2, 2 * BLOCK_SIZE, 10).unwrap().len(), 10);
}

#[test]
fn missing_indirect_block_is_a_hole() {
    let mut builder = ImageBuilder::new(5);
    let mut inode = DiskInode::new(InodeKind::Regular, 7 * BLOCK_SIZE as u32);
    for (index, slot) in inode.direct.iter_mut().enumerate() {
        let block = 6 + index as u32;
        builder.data(block, &pattern(BLOCK_SIZE));
        *slot = block as i32;
    }
    let disk = builder.inode(2, inode).entry("truncated", 2).build();
    let fs = open(&disk);

    assert_eq!(
        fs.read_to_vec(2, 0, 7 * BLOCK_SIZE).unwrap().len(),
        5 * BLOCK_SIZE
    );
}

#[test]
fn invalid_inode_reads_nothing() {
    let disk = ImageBuilder::new(5).file("data", 2, b"hello").build();
    let fs = open(&disk);
    let reads = disk.reads();

    let mut buf = [0u8; 5];
    assert_eq!(fs.read(0, &mut buf, 0).unwrap(), 0);
    assert_eq!(fs.read(512, &mut buf, 0).unwrap(), 0);
    assert_eq!(fs.read(u32::MAX, &mut buf, 0).unwrap(), 0);
    assert_eq!(disk.reads(), reads);

    // 未使用的 inode 大小为 0
    assert_eq!(fs.read(3, &mut buf, 0).unwrap(), 0);
}
