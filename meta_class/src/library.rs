//! Library: owner of one class registry
//! 库：拥有一个类注册表
//!
//! Classes are memoized per (type, library). Dropping the library runs
//! every `class_done`, children first.

use std::{
  any::Any,
  rc::Rc,
  sync::atomic::{AtomicU64, Ordering},
};

use crate::{Class, MetaClass, Obj, Result, Type, object_create};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LibraryId(u64);

impl LibraryId {
  #[inline]
  pub const fn get(self) -> u64 {
    self.0
  }
}

pub struct Library {
  id: LibraryId,
  meta: MetaClass,
}

impl Default for Library {
  fn default() -> Self {
    Self::new()
  }
}

impl Library {
  pub fn new() -> Self {
    let id = LibraryId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
    Self {
      id,
      meta: MetaClass::new(id),
    }
  }

  #[inline]
  pub fn id(&self) -> LibraryId {
    self.id
  }

  #[inline]
  pub fn meta(&self) -> &MetaClass {
    &self.meta
  }

  /// Number of built classes / 已构建类数量
  #[inline]
  pub fn num_classes(&self) -> usize {
    self.meta.len()
  }

  /// Find or build the class of `ty` / 查找或构建 `ty` 的类
  #[inline]
  pub fn class_from_type(&self, ty: &'static Type) -> Result<Rc<Class>> {
    self.meta.get_class_from_type(ty)
  }

  /// Resolve the class then create an instance
  /// 解析类后创建实例
  pub fn create_from_type(&self, ty: &'static Type, init: &dyn Any) -> Result<Obj> {
    let class = self.class_from_type(ty)?;
    object_create(&class, init)
  }
}
