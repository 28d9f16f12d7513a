//! Runtime class / 运行时类
//!
//! A class is built once from its [`Type`]: the parent's resolved fields
//! are copied down first, then the type's own non-empty fields override
//! them. Lookup of `obj_init` and friends is therefore a field read, not
//! a walk up the chain.
//!
//! 类由 [`Type`] 构建一次：先复制父类已解析字段，再用本类型的非空字段覆盖。

use std::{
  fmt,
  ptr,
  rc::{Rc, Weak},
};

use crate::{ClassDone, Error, LibraryId, ObjDone, ObjInit, Result, Type};

/// Sentinel held by every valid class / 有效类的哨兵值
pub const MAGIC_CLASS: u32 = u32::from_be_bytes(*b"clss");

pub struct Class {
  pub(crate) magic: u32,
  /// Class of this class / 本类的类（元类）
  meta: Weak<Class>,
  sup: Option<Rc<Class>>,
  ty: &'static Type,
  library: LibraryId,
  obj_size: usize,
  obj_init: Option<ObjInit>,
  obj_done: Option<ObjDone>,
  class_done: Option<ClassDone>,
  data: Box<[u8]>,
}

fn zeroed(len: usize) -> Result<Box<[u8]>> {
  let mut v = Vec::new();
  v.try_reserve_exact(len).map_err(|_| Error::OutOfMemory)?;
  v.resize(len, 0);
  Ok(v.into_boxed_slice())
}

impl Class {
  /// Root meta-class: its own class / 根元类，其类为自身
  pub(crate) fn new_meta(ty: &'static Type, library: LibraryId) -> Rc<Self> {
    Rc::new_cyclic(|meta| Self {
      magic: MAGIC_CLASS,
      meta: meta.clone(),
      sup: None,
      ty,
      library,
      obj_size: ty.obj_size,
      obj_init: ty.obj_init,
      obj_done: ty.obj_done,
      class_done: ty.class_done,
      data: Box::default(),
    })
  }

  /// Copy down from `sup`, then apply the overrides of `ty`.
  ///
  /// Class data never shrinks below the parent's: a smaller `class_size`
  /// is raised to the parent's length.
  ///
  /// 先从父类复制，再应用 `ty` 的覆盖。类数据不小于父类，较小的 `class_size` 取父类长度。
  pub(crate) fn build(
    ty: &'static Type,
    sup: Option<Rc<Class>>,
    meta: &Rc<Class>,
    library: LibraryId,
  ) -> Result<Self> {
    let inherited = sup.as_deref();
    let class_size = ty.class_size.max(inherited.map_or(0, |p| p.data.len()));
    let mut data = zeroed(class_size)?;

    let mut class = Self {
      magic: MAGIC_CLASS,
      meta: Rc::downgrade(meta),
      sup: None,
      ty,
      library,
      obj_size: 0,
      obj_init: None,
      obj_done: None,
      class_done: None,
      data: Box::default(),
    };

    if let Some(p) = inherited {
      class.obj_size = p.obj_size;
      class.obj_init = p.obj_init;
      class.obj_done = p.obj_done;
      class.class_done = p.class_done;
      data[..p.data.len()].copy_from_slice(&p.data);
    }

    if ty.obj_size != 0 {
      class.obj_size = ty.obj_size;
    }
    class.obj_init = ty.obj_init.or(class.obj_init);
    class.obj_done = ty.obj_done.or(class.obj_done);
    class.class_done = ty.class_done.or(class.class_done);
    class.data = data;
    class.sup = sup;
    Ok(class)
  }

  #[inline]
  pub fn name(&self) -> &'static str {
    self.ty.name
  }

  #[inline]
  pub fn ty(&self) -> &'static Type {
    self.ty
  }

  #[inline]
  pub fn magic(&self) -> u32 {
    self.magic
  }

  #[inline]
  pub fn is_valid(&self) -> bool {
    self.magic == MAGIC_CLASS
  }

  /// The meta-class, `None` once the owning library is gone
  /// 元类，所属库销毁后为 `None`
  #[inline]
  pub fn class(&self) -> Option<Rc<Class>> {
    self.meta.upgrade()
  }

  #[inline]
  pub fn super_class(&self) -> Option<&Rc<Class>> {
    self.sup.as_ref()
  }

  #[inline]
  pub fn library(&self) -> LibraryId {
    self.library
  }

  #[inline]
  pub fn obj_size(&self) -> usize {
    self.obj_size
  }

  #[inline]
  pub fn obj_init(&self) -> Option<ObjInit> {
    self.obj_init
  }

  #[inline]
  pub fn obj_done(&self) -> Option<ObjDone> {
    self.obj_done
  }

  #[inline]
  pub fn class_done(&self) -> Option<ClassDone> {
    self.class_done
  }

  /// Class-level state, `class_size` bytes / 类级状态
  #[inline]
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  /// Writable only while the class is being built (`class_init`)
  /// 仅在构建期间（`class_init`）可写
  #[inline]
  pub fn data_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }

  /// `self` is `other` or inherits from it
  /// `self` 即 `other` 或继承自 `other`
  pub fn is_subclass_of(&self, other: &Class) -> bool {
    let mut c = Some(self);
    while let Some(cur) = c {
      if ptr::eq(cur, other) {
        return true;
      }
      c = cur.sup.as_deref();
    }
    false
  }
}

impl fmt::Debug for Class {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Class")
      .field("name", &self.ty.name)
      .field("sup", &self.sup.as_ref().map(|s| s.ty.name))
      .field("obj_size", &self.obj_size)
      .field("class_size", &self.data.len())
      .finish()
  }
}
