use crate::{BITS_PER_WORD, Error, Result};

/// 位图视图，记录其指示区域(块或 inode)的使用情况
///
/// 第 `i` 位位于第 `i / 32` 个字的第 `i % 32` 位，置位表示占用。
#[derive(Debug)]
pub struct Bitmap<W> {
    words: W,
    /// 有效位数
    bits: usize,
}

impl<W: AsRef<[u32]>> Bitmap<W> {
    #[inline]
    pub fn new(words: W, bits: usize) -> Self {
        debug_assert!(bits <= words.as_ref().len() * BITS_PER_WORD);
        Self { words, bits }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bits
    }

    pub fn is_used(&self, index: usize) -> Result<bool> {
        let (word, mask) = self.locate(index)?;
        Ok(self.words.as_ref()[word] & mask != 0)
    }

    #[inline]
    pub fn is_free(&self, index: usize) -> Result<bool> {
        self.is_used(index).map(|used| !used)
    }

    /// 所有置位的编号，升序
    pub fn used(&self) -> impl Iterator<Item = usize> + '_ {
        let words = self.words.as_ref();
        (0..self.bits).filter(move |&i| words[i / BITS_PER_WORD] & (1 << (i % BITS_PER_WORD)) != 0)
    }

    pub fn count_used(&self) -> usize {
        self.used().count()
    }

    /// 编号 -> (字索引, 字内掩码)
    fn locate(&self, index: usize) -> Result<(usize, u32)> {
        if index >= self.bits {
            return Err(Error::OutOfRange {
                index,
                limit: self.bits,
            });
        }

        Ok((index / BITS_PER_WORD, 1 << (index % BITS_PER_WORD)))
    }
}

impl<W: AsRef<[u32]> + AsMut<[u32]>> Bitmap<W> {
    /// 置位或清位；重复操作不报错
    pub fn mark(&mut self, index: usize, used: bool) -> Result<()> {
        let (word, mask) = self.locate(index)?;
        let word = &mut self.words.as_mut()[word];
        if used {
            *word |= mask;
        } else {
            *word &= !mask;
        }

        Ok(())
    }
}
