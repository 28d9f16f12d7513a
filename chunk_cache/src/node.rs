//! Chunk node: one cached run of items of one family
//! 块节点：某个族的一段缓存条目

use std::rc::Rc;

use lru_list::{Error as LruError, Result as LruResult};
use meta_class::Obj;

use crate::{Error, Family, ItemLoader, Result, in_range};

/// Lookup key: item `index` of `family`
/// 查找键：`family` 的第 `index` 个条目
#[derive(Clone, Debug)]
pub struct Query {
  family: Obj,
  info: Family,
  index: u32,
  hash: u32,
}

impl Query {
  /// `info` must be the decoded header of `family`
  pub(crate) fn new(family: Obj, info: Family, index: u32) -> Result<Self> {
    if index >= info.item_total() {
      return Err(Error::OutOfRange {
        index,
        total: info.item_total(),
      });
    }
    Ok(Self {
      hash: info.chunk_hash(index),
      family,
      info,
      index,
    })
  }

  #[inline]
  pub fn family(&self) -> &Obj {
    &self.family
  }

  /// Decoded header of the family / 族头部
  #[inline]
  pub fn info(&self) -> &Family {
    &self.info
  }

  #[inline]
  pub fn index(&self) -> u32 {
    self.index
  }

  #[inline]
  pub fn hash(&self) -> u32 {
    self.hash
  }
}

impl PartialEq for Query {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.family, &other.family) && self.index == other.index
  }
}

pub struct ChunkNode<T> {
  family: Obj,
  info: Family,
  hash: u32,
  item_start: u32,
  item_count: u32,
  items: Vec<Option<T>>,
}

fn empty_items<T>(items: &mut Vec<Option<T>>, count: u32) -> LruResult<()> {
  let count = count as usize;
  items.clear();
  items
    .try_reserve_exact(count)
    .map_err(|_| LruError::OutOfMemory)?;
  items.resize_with(count, || None);
  Ok(())
}

impl<T> ChunkNode<T> {
  pub(crate) fn new(q: &Query) -> LruResult<Self> {
    let item_start = q.info.chunk_start(q.index);
    let item_count = q.info.chunk_len(item_start);
    let mut items = Vec::new();
    empty_items(&mut items, item_count)?;
    Ok(Self {
      family: Rc::clone(&q.family),
      info: q.info,
      hash: q.hash,
      item_start,
      item_count,
      items,
    })
  }

  /// Point this node at the chunk of `q`, keeping the item buffer
  /// 把节点改指 `q` 所在块，复用条目缓冲
  pub(crate) fn retarget<L: ItemLoader<Item = T>>(
    &mut self,
    q: &Query,
    loader: &mut L,
  ) -> LruResult<()> {
    self.unload(loader);
    let item_start = q.info.chunk_start(q.index);
    let item_count = q.info.chunk_len(item_start);
    empty_items(&mut self.items, item_count)?;
    self.family = Rc::clone(&q.family);
    self.info = q.info;
    self.hash = q.hash;
    self.item_start = item_start;
    self.item_count = item_count;
    Ok(())
  }

  pub(crate) fn unload<L: ItemLoader<Item = T>>(&mut self, loader: &mut L) {
    for item in self.items.iter_mut().filter_map(Option::take) {
      loader.unload(item);
    }
  }

  /// Does this node hold item `q`? / 节点是否包含 `q`
  #[inline]
  pub fn covers(&self, q: &Query) -> bool {
    self.hash == q.hash
      && Rc::ptr_eq(&self.family, &q.family)
      && in_range(q.index, self.item_start, self.item_count)
  }

  #[inline]
  pub fn family(&self) -> &Obj {
    &self.family
  }

  #[inline]
  pub fn info(&self) -> &Family {
    &self.info
  }

  #[inline]
  pub fn item_start(&self) -> u32 {
    self.item_start
  }

  #[inline]
  pub fn item_count(&self) -> u32 {
    self.item_count
  }

  /// Loaded item, `None` if outside the chunk or not loaded yet
  /// 已加载条目，不在块内或未加载时为 `None`
  pub fn item(&self, index: u32) -> Option<&T> {
    if !in_range(index, self.item_start, self.item_count) {
      return None;
    }
    self.items[(index - self.item_start) as usize].as_ref()
  }

  /// Number of loaded items / 已加载条目数
  pub fn loaded(&self) -> usize {
    self.items.iter().filter(|i| i.is_some()).count()
  }

  pub(crate) fn slot_mut(&mut self, index: u32) -> &mut Option<T> {
    &mut self.items[(index - self.item_start) as usize]
  }
}
