//! Class instances / 类实例
//!
//! An object is a zeroed block of `class.obj_size` bytes plus its class.
//! Handles are `Rc<Object>`: the reference count starts at 1 and
//! `obj_done` runs when the last handle drops.
//!
//! 对象 = 类 + `obj_size` 字节的清零内存块。句柄为 `Rc<Object>`，引用计数从 1 开始，
//! 最后一个句柄释放时调用 `obj_done`。

use std::{any::Any, fmt, rc::Rc};

use log::warn;

use crate::{Class, Error, MAGIC_CLASS, Result};

/// Counted object handle / 计数对象句柄
pub type Obj = Rc<Object>;

pub struct Object {
  class: Rc<Class>,
  data: Box<[u8]>,
}

impl Object {
  #[inline]
  pub fn class(&self) -> &Rc<Class> {
    &self.class
  }

  #[inline]
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  /// Writable in `obj_init`/`obj_done`, or through `Rc::get_mut`
  /// 在 `obj_init`/`obj_done` 中或经 `Rc::get_mut` 可写
  #[inline]
  pub fn data_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }

  #[inline]
  pub fn is_a(&self, class: &Class) -> bool {
    self.class.is_subclass_of(class)
  }
}

impl Drop for Object {
  fn drop(&mut self) {
    if let Some(done) = self.class.obj_done() {
      done(self);
    }
  }
}

impl fmt::Debug for Object {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Object")
      .field("class", &self.class.name())
      .field("size", &self.data.len())
      .finish()
  }
}

/// Live handle count / 存活句柄数
#[inline]
pub fn ref_count(obj: &Obj) -> usize {
  Rc::strong_count(obj)
}

/// Looks like a live object: present, counted, valid class
/// 看起来是存活对象：非空、计数有效、类有效
pub fn object_check(obj: Option<&Obj>) -> bool {
  obj.is_some_and(|o| ref_count(o) >= 1 && o.class.magic == MAGIC_CLASS)
}

/// Instance of `class` or a subclass. `None` class matches any valid object.
/// 是否为 `class` 或其子类的实例。`class` 为 `None` 时匹配任意有效对象。
pub fn object_is_a(obj: Option<&Obj>, class: Option<&Class>) -> bool {
  if !object_check(obj) {
    return false;
  }
  match (obj, class) {
    (Some(o), Some(c)) => o.is_a(c),
    (Some(_), None) => true,
    (None, _) => false,
  }
}

/// Allocate and construct. On `obj_init` failure, `obj_done` runs and no
/// handle is returned.
///
/// 分配并构造。`obj_init` 失败时调用 `obj_done`，不返回句柄。
pub fn object_create(class: &Rc<Class>, init: &dyn Any) -> Result<Obj> {
  if !class.is_valid() {
    return Err(Error::InvalidArgument("invalid class"));
  }
  if class.super_class().is_none() && class.class().is_some_and(|m| Rc::ptr_eq(&m, class)) {
    return Err(Error::InvalidArgument("meta-class has no direct instances"));
  }

  let size = class.obj_size();
  let mut data = Vec::new();
  data.try_reserve_exact(size).map_err(|_| Error::OutOfMemory)?;
  data.resize(size, 0);

  let mut obj = Object {
    class: Rc::clone(class),
    data: data.into_boxed_slice(),
  };
  if let Some(init_fn) = class.obj_init() {
    if let Err(e) = init_fn(&mut obj, init) {
      warn!("obj_init of {} failed: {e}", class.name());
      // Drop runs obj_done
      drop(obj);
      return Err(e);
    }
  }
  Ok(Rc::new(obj))
}
