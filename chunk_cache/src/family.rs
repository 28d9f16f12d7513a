//! Chunk family: a class of objects describing a run of items
//! 块族：描述一段条目的对象类
//!
//! Payload layout (little endian):
//! [hash: u32][item_total: u32][item_count: u32]
//! 载荷布局（小端）
//!
//! Subtypes of [`FAMILY_TYPE`] may grow the payload; the first
//! [`FAMILY_SIZE`] bytes keep this layout.

use std::any::Any;

use meta_class::{Error as ClassError, Object, Result as ClassResult, Type};

/// Bytes of the family header / 族头部字节数
pub const FAMILY_SIZE: usize = 12;

pub static FAMILY_TYPE: Type = Type {
  obj_size: FAMILY_SIZE,
  obj_init: Some(family_init),
  ..Type::new("chunk_family")
};

/// Family constructor argument / 族构造参数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FamilyInit {
  pub hash: u32,
  /// Items in the family / 族内条目总数
  pub item_total: u32,
  /// Items per chunk, 0 = cache default / 每块条目数，0 为缓存默认
  pub item_count: u32,
}

/// `obj_init` of [`FAMILY_TYPE`], public so subtypes can chain to it
/// [`FAMILY_TYPE`] 的 `obj_init`，公开以便子类型链式调用
pub fn family_init(obj: &mut Object, init: &dyn Any) -> ClassResult<()> {
  let init = init
    .downcast_ref::<FamilyInit>()
    .ok_or(ClassError::InvalidArgument("expect FamilyInit"))?;
  if init.item_count == 0 {
    return Err(ClassError::InvalidArgument("item_count is 0"));
  }
  let data = obj.data_mut();
  if data.len() < FAMILY_SIZE {
    return Err(ClassError::InvalidArgument("family payload too small"));
  }
  data[0..4].copy_from_slice(&init.hash.to_le_bytes());
  data[4..8].copy_from_slice(&init.item_total.to_le_bytes());
  data[8..12].copy_from_slice(&init.item_count.to_le_bytes());
  Ok(())
}

/// Decoded family header, `item_count` is never 0
/// 解码后的族头部，`item_count` 恒不为 0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Family {
  hash: u32,
  item_total: u32,
  item_count: u32,
}

#[inline]
fn u32_at(data: &[u8], pos: usize) -> Option<u32> {
  let bytes = data.get(pos..pos + 4)?;
  Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

impl Family {
  /// `None` when `item_count` is 0 / `item_count` 为 0 时返回 `None`
  pub const fn new(hash: u32, item_total: u32, item_count: u32) -> Option<Self> {
    if item_count == 0 {
      return None;
    }
    Some(Self {
      hash,
      item_total,
      item_count,
    })
  }

  pub fn decode(data: &[u8]) -> Option<Self> {
    Self::new(u32_at(data, 0)?, u32_at(data, 4)?, u32_at(data, 8)?)
  }

  #[inline]
  pub const fn hash(&self) -> u32 {
    self.hash
  }

  /// Items in the family / 族内条目总数
  #[inline]
  pub const fn item_total(&self) -> u32 {
    self.item_total
  }

  /// Items per chunk / 每块条目数
  #[inline]
  pub const fn item_count(&self) -> u32 {
    self.item_count
  }

  /// Chunk-aligned floor of `index` / `index` 按块对齐向下取整
  #[inline]
  pub const fn chunk_start(&self, index: u32) -> u32 {
    index - index % self.item_count
  }

  /// Items in the chunk starting at `start`, clamped to the family end
  /// 从 `start` 开始的块的条目数，截断到族末尾
  #[inline]
  pub const fn chunk_len(&self, start: u32) -> u32 {
    let left = self.item_total.saturating_sub(start);
    if left < self.item_count {
      left
    } else {
      self.item_count
    }
  }

  /// Hash of the chunk holding `index` / 包含 `index` 的块的哈希
  #[inline]
  pub const fn chunk_hash(&self, index: u32) -> u32 {
    self.hash.wrapping_add(index / self.item_count)
  }
}

/// `start <= index < start + count` in one compare: below `start` the
/// subtraction wraps to a huge value.
///
/// 单次比较判断区间：`index < start` 时减法回绕为极大值。
#[inline]
pub const fn in_range(index: u32, start: u32, count: u32) -> bool {
  index.wrapping_sub(start) < count
}
