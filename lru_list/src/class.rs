//! Node class: lifecycle callbacks shared by lists
//! 节点类：多个链表共享的生命周期回调

use crate::Result;

/// Capability descriptor for an [`LruList`](crate::LruList).
///
/// Only `node_init` is mandatory. A class may be shared by many lists
/// through `Rc`, it is never owned by one of them.
///
/// 链表能力描述。只有 `node_init` 必须实现。
pub trait LruClass {
  /// Lookup key, stored in every node / 查找键，存于每个节点
  type Key: Clone + PartialEq;
  /// Per-node state built by `node_init` / 由 `node_init` 构造的节点状态
  type Node;
  /// Opaque list context passed to every callback / 传给每个回调的链表上下文
  type Data;

  /// Called once by `LruList::new` / 创建链表时调用一次
  #[inline]
  fn list_init(&self, _data: &mut Self::Data) -> Result<()> {
    Ok(())
  }

  /// Called once when the list is dropped, also when `list_init` fails
  /// 链表销毁时调用，`list_init` 失败时也会调用
  #[inline]
  fn list_done(&self, _data: &mut Self::Data) {}

  /// Build node state for `key` / 为 `key` 构造节点
  fn node_init(&self, key: &Self::Key, data: &mut Self::Data) -> Result<Self::Node>;

  /// Release node state, `key` is the key the node was built for
  /// 释放节点，`key` 为节点当前的键
  #[inline]
  fn node_done(&self, node: Self::Node, _key: &Self::Key, _data: &mut Self::Data) {
    drop(node);
  }

  /// Re-target the least recently used node to `key` in place.
  ///
  /// `None` means the class cannot flush, the list then falls back to
  /// `node_done` followed by `node_init`.
  ///
  /// 原地把最久未用节点改为 `key`。返回 `None` 表示不支持，链表改用 done + init。
  #[inline]
  fn node_flush(
    &self,
    _node: &mut Self::Node,
    _key: &Self::Key,
    _data: &mut Self::Data,
  ) -> Option<Result<()>> {
    None
  }

  /// Does the node answer `key`? Default: the stored key equals `key`
  /// 节点是否匹配 `key`，默认比较存储的键
  #[inline]
  fn node_compare(
    &self,
    _node: &Self::Node,
    node_key: &Self::Key,
    key: &Self::Key,
    _data: &Self::Data,
  ) -> bool {
    node_key == key
  }
}
