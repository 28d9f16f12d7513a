//! Static type descriptor / 静态类型描述
//!
//! A `Type` is the literal a runtime [`Class`](crate::Class) is built from.
//! Two descriptors with the same fields describe the same class, even at
//! different addresses.
//!
//! `Type` 是构建运行时类的字面描述。字段相同的两个描述视为同一个类。

use std::{
  any::Any,
  hash::{Hash, Hasher},
  ptr,
};

use crate::{Class, Object, Result};

/// Class-level constructor, runs once per class / 类构造，每个类只运行一次
pub type ClassInit = fn(&mut Class) -> Result<()>;
/// Class-level finalizer / 类析构
pub type ClassDone = fn(&Class);
/// Instance constructor / 实例构造
pub type ObjInit = fn(&mut Object, &dyn Any) -> Result<()>;
/// Instance finalizer / 实例析构
pub type ObjDone = fn(&mut Object);

/// Zero sizes and `None` callbacks mean "inherit from `sup`".
/// 大小为 0、回调为 `None` 表示继承父类。
#[derive(Debug)]
pub struct Type {
  pub name: &'static str,
  pub sup: Option<&'static Type>,
  pub class_size: usize,
  pub class_init: Option<ClassInit>,
  pub class_done: Option<ClassDone>,
  pub obj_size: usize,
  pub obj_init: Option<ObjInit>,
  pub obj_done: Option<ObjDone>,
}

impl Type {
  /// Descriptor that overrides nothing
  /// 不覆盖任何字段的描述
  pub const fn new(name: &'static str) -> Self {
    Self {
      name,
      sup: None,
      class_size: 0,
      class_init: None,
      class_done: None,
      obj_size: 0,
      obj_init: None,
      obj_done: None,
    }
  }

  /// Nearest `class_init` walking up from `self`
  /// 从自身向上查找最近的 `class_init`
  pub fn find_class_init(&self) -> Option<ClassInit> {
    let mut t = Some(self);
    while let Some(cur) = t {
      if cur.class_init.is_some() {
        return cur.class_init;
      }
      t = cur.sup;
    }
    None
  }

  /// Depth in the inheritance chain, root is 0
  /// 继承深度，根为 0
  pub fn depth(&self) -> usize {
    let mut n = 0;
    let mut t = self.sup;
    while let Some(cur) = t {
      n += 1;
      t = cur.sup;
    }
    n
  }
}

macro_rules! addr {
  ($f:expr) => {
    $f.map(|f| f as usize)
  };
}

impl PartialEq for Type {
  fn eq(&self, other: &Self) -> bool {
    if ptr::eq(self, other) {
      return true;
    }
    self.name == other.name
      && self.class_size == other.class_size
      && self.obj_size == other.obj_size
      && addr!(self.class_init) == addr!(other.class_init)
      && addr!(self.class_done) == addr!(other.class_done)
      && addr!(self.obj_init) == addr!(other.obj_init)
      && addr!(self.obj_done) == addr!(other.obj_done)
      && match (self.sup, other.sup) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
      }
  }
}

impl Eq for Type {}

// Only fields compared by `eq`, so equal types hash equal
// 只哈希 `eq` 比较的字段，相等类型哈希相同
impl Hash for Type {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
    self.class_size.hash(state);
    self.obj_size.hash(state);
    self.sup.map(|s| s.name).hash(state);
  }
}
