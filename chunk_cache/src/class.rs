//! Node class for chunk lists / 块链表的节点类

use std::marker::PhantomData;

use lru_list::{LruClass, Result as LruResult};
use meta_class::Obj;

use crate::{ChunkNode, Family, Query, Result};

/// Produces the items of a family; the user data of a chunk list.
/// 生成族内条目，作为块链表的用户数据。
pub trait ItemLoader {
  type Item;

  /// Build item `index`. `family` may be a subtype with a larger payload.
  /// 构建第 `index` 个条目。`family` 可能是载荷更大的子类型。
  fn load(&mut self, family: &Obj, info: &Family, index: u32) -> Result<Self::Item>;

  /// Release an item evicted from the cache / 释放被淘汰的条目
  #[inline]
  fn unload(&mut self, item: Self::Item) {
    drop(item);
  }
}

pub struct ChunkClass<L>(PhantomData<fn() -> L>);

impl<L> Default for ChunkClass<L> {
  fn default() -> Self {
    Self(PhantomData)
  }
}

impl<L: ItemLoader> LruClass for ChunkClass<L> {
  type Key = Query;
  type Node = ChunkNode<L::Item>;
  type Data = L;

  #[inline]
  fn node_init(&self, key: &Query, _: &mut L) -> LruResult<Self::Node> {
    ChunkNode::new(key)
  }

  fn node_done(&self, mut node: Self::Node, _: &Query, loader: &mut L) {
    node.unload(loader);
  }

  #[inline]
  fn node_flush(
    &self,
    node: &mut Self::Node,
    key: &Query,
    loader: &mut L,
  ) -> Option<LruResult<()>> {
    Some(node.retarget(key, loader))
  }

  #[inline]
  fn node_compare(&self, node: &Self::Node, _: &Query, key: &Query, _: &L) -> bool {
    node.covers(key)
  }
}
