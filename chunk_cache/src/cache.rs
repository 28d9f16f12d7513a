//! Chunk cache: family objects + LRU list of chunk nodes
//! 块缓存：族对象 + 块节点 LRU 链表
//!
//! A lookup of item `index` finds the node covering the chunk of
//! `index`, builds or recycles one on miss, then loads the item into its
//! slot on first access.
//! 查找条目时先找覆盖该块的节点，未命中则新建或回收，首次访问时再加载条目。

use std::rc::Rc;

use log::warn;
use lru_list::{Error as LruError, LruList, NodeId};
use meta_class::{Class, Library, Obj, Type, object_is_a};

use crate::{
  ChunkClass, Conf, Error, FAMILY_TYPE, Family, FamilyInit, ItemLoader, ParsedConf, Query, Result,
};

// Fields drop in order: nodes release their families before the library
// runs `class_done`.
// 字段按声明顺序析构：节点先释放族对象，库再调用 `class_done`。
pub struct ChunkCache<L: ItemLoader> {
  list: LruList<ChunkClass<L>>,
  family_class: Rc<Class>,
  conf: ParsedConf,
  library: Rc<Library>,
}

impl<L: ItemLoader> ChunkCache<L> {
  pub fn new(library: Rc<Library>, loader: L, conf: &[Conf]) -> Result<Self> {
    let conf = ParsedConf::new(conf);
    let family_class = library.class_from_type(&FAMILY_TYPE)?;
    let list = LruList::new(Rc::new(ChunkClass::default()), conf.max_nodes, loader)?;
    Ok(Self {
      list,
      family_class,
      conf,
      library,
    })
  }

  /// Create a plain family / 创建普通族
  #[inline]
  pub fn new_family(&self, init: FamilyInit) -> Result<Obj> {
    self.new_family_of(&FAMILY_TYPE, init)
  }

  /// Create a family of subtype `ty`, which must inherit [`FAMILY_TYPE`]
  /// 创建子类型 `ty` 的族，`ty` 必须继承 [`FAMILY_TYPE`]
  pub fn new_family_of(&self, ty: &'static Type, mut init: FamilyInit) -> Result<Obj> {
    if init.item_count == 0 {
      init.item_count = self.conf.chunk_size;
    }
    let obj = self.library.create_from_type(ty, &init)?;
    self.family(&obj)?;
    Ok(obj)
  }

  /// Decode the header of a family object / 解码族对象头部
  pub fn family(&self, obj: &Obj) -> Result<Family> {
    if !object_is_a(Some(obj), Some(&self.family_class)) {
      return Err(Error::NotFamily);
    }
    Family::decode(obj.data()).ok_or(Error::NotFamily)
  }

  pub fn query(&self, family: &Obj, index: u32) -> Result<Query> {
    let info = self.family(family)?;
    Query::new(Rc::clone(family), info, index)
  }

  /// Item `index` of `family`, loaded on first access
  /// `family` 的第 `index` 个条目，首次访问时加载
  pub fn lookup(&mut self, family: &Obj, index: u32) -> Result<&L::Item> {
    let q = self.query(family, index)?;
    let id = self.list.lookup(&q)?;
    self.load(id, &q)?;
    self
      .list
      .node(id)
      .and_then(|node| node.item(index))
      .ok_or(Error::Lru(LruError::InvalidArgument("chunk node lost")))
  }

  /// Loaded item without promotion or loading / 只读已加载条目，不提升不加载
  pub fn get(&self, family: &Obj, index: u32) -> Option<&L::Item> {
    let q = self.query(family, index).ok()?;
    let id = self.list.peek(&q)?;
    self.list.node(id)?.item(index)
  }

  fn load(&mut self, id: NodeId, q: &Query) -> Result<()> {
    let Some((node, loader)) = self.list.node_with_data(id) else {
      return Err(Error::Lru(LruError::InvalidArgument("stale chunk node")));
    };
    let slot = node.slot_mut(q.index());
    if slot.is_some() {
      return Ok(());
    }
    match loader.load(q.family(), q.info(), q.index()) {
      Ok(item) => {
        *slot = Some(item);
        Ok(())
      }
      Err(e) => {
        // An empty chunk is not worth a cache slot
        // 空块不占缓存位
        if node.loaded() == 0 {
          warn!("load {} failed, drop empty chunk: {e}", q.index());
          self.list.remove(id)?;
        }
        Err(e)
      }
    }
  }

  /// Drop every chunk of `family`, returns chunks removed
  /// 删除 `family` 的所有块，返回删除数量
  pub fn remove_family(&mut self, family: &Obj) -> usize {
    self
      .list
      .remove_selection(|_, node, _| Rc::ptr_eq(node.family(), family))
  }

  #[inline]
  pub fn reset(&mut self) {
    self.list.reset();
  }

  /// Cached chunks / 已缓存块数
  #[inline]
  pub fn len(&self) -> usize {
    self.list.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.list.is_empty()
  }

  #[inline]
  pub fn conf(&self) -> &ParsedConf {
    &self.conf
  }

  #[inline]
  pub fn library(&self) -> &Rc<Library> {
    &self.library
  }

  #[inline]
  pub fn family_class(&self) -> &Rc<Class> {
    &self.family_class
  }

  #[inline]
  pub fn loader(&self) -> &L {
    self.list.data()
  }

  #[inline]
  pub fn loader_mut(&mut self) -> &mut L {
    self.list.data_mut()
  }

  #[inline]
  pub fn list(&self) -> &LruList<ChunkClass<L>> {
    &self.list
  }
}
