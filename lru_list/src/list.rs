//! Bounded recency list
//! 有界最近使用链表
//!
//! Nodes live in a slab and are chained most recently used first.
//! Lookup is a linear scan: lists are meant to hold tens of nodes.
//! When full, a miss recycles the tail node instead of growing.
//!
//! 节点存于 slab，按最近使用顺序单向链接。查找为线性扫描（链表通常只有几十个节点）。
//! 满时未命中会回收尾节点而非扩容。

use std::{mem::size_of, rc::Rc};

use log::{debug, warn};

use crate::{Error, LruClass, NodeId, Result};

// Max slots reserved by `new`
// `new` 预留的最大槽数
const PREALLOC_MAX: usize = 1024;

struct Entry<K, N> {
  key: K,
  node: N,
}

/// Chain link or free-list link, depending on `entry`
/// 依据 `entry`，`next` 是链表指针或空闲链指针
struct Slot<K, N> {
  generation: u32,
  next: Option<u32>,
  entry: Option<Entry<K, N>>,
}

#[inline]
fn entry<K, N>(slots: &[Slot<K, N>], idx: u32) -> &Entry<K, N> {
  match &slots[idx as usize].entry {
    Some(e) => e,
    None => unreachable!("free slot {idx} linked in chain"),
  }
}

enum Scan {
  Hit { prev: Option<u32>, idx: u32 },
  /// Tail and its predecessor, `None` on empty list
  Miss { tail: Option<(Option<u32>, u32)> },
}

/// LRU list of class-described nodes
/// 由节点类描述的 LRU 链表
///
/// `max_nodes == 0` means unbounded.
pub struct LruList<C: LruClass> {
  class: Rc<C>,
  max_nodes: usize,
  num_nodes: usize,
  head: Option<u32>,
  free: Option<u32>,
  slots: Vec<Slot<C::Key, C::Node>>,
  data: C::Data,
}

impl<C: LruClass> LruList<C> {
  /// Create list, runs `list_init`
  /// 创建链表并调用 `list_init`
  ///
  /// If `list_init` fails, `list_done` runs before the error is returned.
  pub fn new(class: Rc<C>, max_nodes: usize, mut data: C::Data) -> Result<Self> {
    let mut slots = Vec::new();
    slots
      .try_reserve_exact(max_nodes.min(PREALLOC_MAX))
      .map_err(|_| Error::OutOfMemory)?;

    if let Err(e) = class.list_init(&mut data) {
      class.list_done(&mut data);
      return Err(e);
    }

    Ok(Self {
      class,
      max_nodes,
      num_nodes: 0,
      head: None,
      free: None,
      slots,
      data,
    })
  }

  /// Find node for `key` or build one; the result is the new head
  /// 查找或创建 `key` 的节点，返回后该节点位于表头
  #[inline]
  pub fn lookup(&mut self, key: &C::Key) -> Result<NodeId> {
    let idx = self.find_or_create(key)?;
    Ok(self.id(idx))
  }

  /// `lookup` then borrow the node / 查找后借用节点
  #[inline]
  pub fn get(&mut self, key: &C::Key) -> Result<&mut C::Node> {
    let idx = self.find_or_create(key)?;
    match &mut self.slots[idx as usize].entry {
      Some(e) => Ok(&mut e.node),
      None => unreachable!("lookup returned free slot {idx}"),
    }
  }

  /// Find without promoting / 查找但不提升
  pub fn peek(&self, key: &C::Key) -> Option<NodeId> {
    match self.scan(key) {
      Scan::Hit { idx, .. } => Some(self.id(idx)),
      Scan::Miss { .. } => None,
    }
  }

  /// Remove one node, O(n) / 删除一个节点
  pub fn remove(&mut self, id: NodeId) -> Result<()> {
    if !self.is_live(id) {
      return Err(Error::InvalidArgument("stale node id"));
    }
    let mut prev = None;
    let mut cur = self.head;
    while let Some(i) = cur {
      if i == id.idx {
        self.unlink(prev, i);
        self.discard(i);
        return Ok(());
      }
      prev = Some(i);
      cur = self.slots[i as usize].next;
    }
    Err(Error::InvalidArgument("node not in list"))
  }

  /// Remove every node the selector accepts, returns count removed
  /// 删除选择器选中的所有节点，返回删除数量
  pub fn remove_selection<F>(&mut self, mut selector: F) -> usize
  where
    F: FnMut(&C::Key, &C::Node, &C::Data) -> bool,
  {
    let mut removed = 0;
    let mut prev = None;
    let mut cur = self.head;
    while let Some(i) = cur {
      let next = self.slots[i as usize].next;
      let e = entry(&self.slots, i);
      if selector(&e.key, &e.node, &self.data) {
        self.unlink(prev, i);
        self.discard(i);
        removed += 1;
      } else {
        prev = Some(i);
      }
      cur = next;
    }
    removed
  }

  /// Destroy all nodes, keeps the list usable
  /// 销毁所有节点，链表仍可用
  pub fn reset(&mut self) {
    let mut cur = self.head.take();
    while let Some(i) = cur {
      cur = self.slots[i as usize].next.take();
      let e = self.take(i);
      self.class.node_done(e.node, &e.key, &mut self.data);
      self.free_slot(i);
    }
    self.num_nodes = 0;
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.num_nodes
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.num_nodes == 0
  }

  #[inline]
  pub fn max_nodes(&self) -> usize {
    self.max_nodes
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.max_nodes > 0 && self.num_nodes >= self.max_nodes
  }

  /// Bytes of one node's state / 单个节点状态字节数
  #[inline]
  pub const fn node_size() -> usize {
    size_of::<C::Node>()
  }

  /// Most recently used node / 最近使用的节点
  #[inline]
  pub fn head(&self) -> Option<NodeId> {
    self.head.map(|i| self.id(i))
  }

  pub fn node(&self, id: NodeId) -> Option<&C::Node> {
    self.live(id).map(|e| &e.node)
  }

  pub fn node_mut(&mut self, id: NodeId) -> Option<&mut C::Node> {
    let slot = self.slots.get_mut(id.idx as usize)?;
    if slot.generation != id.generation {
      return None;
    }
    slot.entry.as_mut().map(|e| &mut e.node)
  }

  /// Node and list data borrowed together / 同时借用节点与链表数据
  pub fn node_with_data(&mut self, id: NodeId) -> Option<(&mut C::Node, &mut C::Data)> {
    let slot = self.slots.get_mut(id.idx as usize)?;
    if slot.generation != id.generation {
      return None;
    }
    let e = slot.entry.as_mut()?;
    Some((&mut e.node, &mut self.data))
  }

  pub fn key(&self, id: NodeId) -> Option<&C::Key> {
    self.live(id).map(|e| &e.key)
  }

  #[inline]
  pub fn data(&self) -> &C::Data {
    &self.data
  }

  #[inline]
  pub fn data_mut(&mut self) -> &mut C::Data {
    &mut self.data
  }

  #[inline]
  pub fn class(&self) -> &Rc<C> {
    &self.class
  }

  /// Iterate most recently used first / 按最近使用顺序遍历
  #[inline]
  pub fn iter(&self) -> Iter<'_, C> {
    Iter {
      list: self,
      cur: self.head,
    }
  }

  fn scan(&self, key: &C::Key) -> Scan {
    let mut prev = None;
    let mut cur = self.head;
    while let Some(i) = cur {
      let e = entry(&self.slots, i);
      if self.class.node_compare(&e.node, &e.key, key, &self.data) {
        return Scan::Hit { prev, idx: i };
      }
      let next = self.slots[i as usize].next;
      if next.is_none() {
        return Scan::Miss {
          tail: Some((prev, i)),
        };
      }
      prev = Some(i);
      cur = next;
    }
    Scan::Miss { tail: None }
  }

  fn find_or_create(&mut self, key: &C::Key) -> Result<u32> {
    match self.scan(key) {
      Scan::Hit { prev, idx } => {
        // Already at head when there is no predecessor
        // 无前驱即已在表头
        if prev.is_some() {
          self.unlink(prev, idx);
          self.push_head(idx);
        }
        Ok(idx)
      }
      Scan::Miss { tail } => {
        match tail {
          Some((prev, idx)) if self.is_full() => self.recycle(prev, idx, key),
          _ => self.create(key),
        }
      }
    }
  }

  fn create(&mut self, key: &C::Key) -> Result<u32> {
    let idx = self.alloc_slot()?;
    match self.class.node_init(key, &mut self.data) {
      Ok(node) => {
        self.fill(idx, key.clone(), node);
        self.push_head(idx);
        self.num_nodes += 1;
        Ok(idx)
      }
      Err(e) => {
        warn!("node_init failed: {e}");
        self.free_slot(idx);
        Err(e)
      }
    }
  }

  /// Reuse the tail for `key`. On failure the tail is destroyed, not kept.
  /// 复用尾节点。失败时销毁该节点。
  fn recycle(&mut self, prev: Option<u32>, idx: u32, key: &C::Key) -> Result<u32> {
    self.unlink(prev, idx);

    let slot = &mut self.slots[idx as usize];
    let Some(e) = slot.entry.as_mut() else {
      unreachable!("free slot {idx} linked in chain")
    };
    match self.class.node_flush(&mut e.node, key, &mut self.data) {
      Some(Ok(())) => {
        e.key = key.clone();
        slot.generation = slot.generation.wrapping_add(1);
        self.push_head(idx);
        debug!("flushed node {idx}");
        Ok(idx)
      }
      Some(Err(err)) => {
        warn!("node_flush failed, node {idx} dropped: {err}");
        self.discard(idx);
        Err(err)
      }
      None => {
        let old = self.take(idx);
        self.class.node_done(old.node, &old.key, &mut self.data);
        match self.class.node_init(key, &mut self.data) {
          Ok(node) => {
            self.fill(idx, key.clone(), node);
            self.push_head(idx);
            debug!("reinit node {idx}");
            Ok(idx)
          }
          Err(err) => {
            // Node already done, only the slot is left
            // 节点已 done，仅剩槽位
            warn!("node_init failed on recycle, node {idx} dropped: {err}");
            self.free_slot(idx);
            self.num_nodes -= 1;
            Err(err)
          }
        }
      }
    }
  }

  #[inline]
  fn id(&self, idx: u32) -> NodeId {
    NodeId::new(idx, self.slots[idx as usize].generation)
  }

  #[inline]
  fn is_live(&self, id: NodeId) -> bool {
    self.live(id).is_some()
  }

  fn live(&self, id: NodeId) -> Option<&Entry<C::Key, C::Node>> {
    let slot = self.slots.get(id.idx as usize)?;
    if slot.generation != id.generation {
      return None;
    }
    slot.entry.as_ref()
  }

  #[inline]
  fn unlink(&mut self, prev: Option<u32>, idx: u32) {
    let next = self.slots[idx as usize].next.take();
    match prev {
      Some(p) => self.slots[p as usize].next = next,
      None => self.head = next,
    }
  }

  #[inline]
  fn push_head(&mut self, idx: u32) {
    self.slots[idx as usize].next = self.head;
    self.head = Some(idx);
  }

  fn alloc_slot(&mut self) -> Result<u32> {
    if let Some(idx) = self.free {
      self.free = self.slots[idx as usize].next.take();
      return Ok(idx);
    }
    let idx = u32::try_from(self.slots.len()).map_err(|_| Error::OutOfMemory)?;
    self.slots.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
    self.slots.push(Slot {
      generation: 0,
      next: None,
      entry: None,
    });
    Ok(idx)
  }

  #[inline]
  fn fill(&mut self, idx: u32, key: C::Key, node: C::Node) {
    let slot = &mut self.slots[idx as usize];
    slot.entry = Some(Entry { key, node });
    slot.generation = slot.generation.wrapping_add(1);
  }

  #[inline]
  fn take(&mut self, idx: u32) -> Entry<C::Key, C::Node> {
    match self.slots[idx as usize].entry.take() {
      Some(e) => e,
      None => unreachable!("free slot {idx} linked in chain"),
    }
  }

  #[inline]
  fn free_slot(&mut self, idx: u32) {
    let slot = &mut self.slots[idx as usize];
    slot.entry = None;
    slot.generation = slot.generation.wrapping_add(1);
    slot.next = self.free;
    self.free = Some(idx);
  }

  /// Node already unlinked: done + free + count
  /// 节点已摘除：done、释放、计数减一
  fn discard(&mut self, idx: u32) {
    let e = self.take(idx);
    self.class.node_done(e.node, &e.key, &mut self.data);
    self.free_slot(idx);
    self.num_nodes -= 1;
  }
}

impl<C: LruClass> Drop for LruList<C> {
  fn drop(&mut self) {
    self.reset();
    self.class.list_done(&mut self.data);
  }
}

/// Recency-order iterator / 按最近使用顺序的迭代器
pub struct Iter<'a, C: LruClass> {
  list: &'a LruList<C>,
  cur: Option<u32>,
}

impl<'a, C: LruClass> Iterator for Iter<'a, C> {
  type Item = (NodeId, &'a C::Key, &'a C::Node);

  fn next(&mut self) -> Option<Self::Item> {
    let idx = self.cur?;
    let list = self.list;
    let slot = &list.slots[idx as usize];
    self.cur = slot.next;
    let e = entry(&list.slots, idx);
    Some((NodeId::new(idx, slot.generation), &e.key, &e.node))
  }
}

impl<'a, C: LruClass> IntoIterator for &'a LruList<C> {
  type Item = (NodeId, &'a C::Key, &'a C::Node);
  type IntoIter = Iter<'a, C>;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}
