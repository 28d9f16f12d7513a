//! Meta-class: registry mapping types to their built classes
//! 元类：类型到已构建类的注册表
//!
//! Classes are built on first request and memoized. A parent is always
//! built before its child, since the child copies the parent's fields.
//! 类在首次请求时构建并缓存。父类总是先于子类构建，因为子类要复制父类字段。

use std::{cell::RefCell, mem, rc::Rc};

use hashlink::LinkedHashMap;
use log::{debug, warn};

use crate::{Class, LibraryId, Result, Type};

/// Descriptor of the root meta-class / 根元类描述
pub static META_TYPE: Type = Type::new("meta_class");

/// Registry key, equality is `Type` equality (identity, then fields)
/// 注册表键，相等性即 `Type` 相等（先比地址，再比字段）
#[derive(PartialEq, Eq, Hash)]
struct TypeKey(&'static Type);

pub struct MetaClass {
  root: Rc<Class>,
  library: LibraryId,
  // Insertion order = construction order, parents first
  // 插入顺序即构建顺序，父类在前
  type_to_class: RefCell<LinkedHashMap<TypeKey, Rc<Class>>>,
}

impl MetaClass {
  pub fn new(library: LibraryId) -> Self {
    Self {
      root: Class::new_meta(&META_TYPE, library),
      library,
      type_to_class: RefCell::new(LinkedHashMap::new()),
    }
  }

  /// Class of every class / 所有类的类
  #[inline]
  pub fn root(&self) -> &Rc<Class> {
    &self.root
  }

  /// Already-built class for `ty`, never builds
  /// 已构建的类，不触发构建
  pub fn get(&self, ty: &'static Type) -> Option<Rc<Class>> {
    self.type_to_class.borrow().get(&TypeKey(ty)).cloned()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.type_to_class.borrow().len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.type_to_class.borrow().is_empty()
  }

  /// Find or build the class of `ty`
  /// 查找或构建 `ty` 的类
  pub fn get_class_from_type(&self, ty: &'static Type) -> Result<Rc<Class>> {
    if let Some(class) = self.get(ty) {
      return Ok(class);
    }

    let sup = match ty.sup {
      Some(sup) => Some(self.get_class_from_type(sup)?),
      None => None,
    };

    let mut class = Class::build(ty, sup, &self.root, self.library)?;
    if let Some(init) = ty.find_class_init() {
      if let Err(e) = init(&mut class) {
        warn!("class_init of {} failed: {e}", ty.name);
        if let Some(done) = class.class_done() {
          done(&class);
        }
        return Err(e);
      }
    }

    let class = Rc::new(class);
    self
      .type_to_class
      .borrow_mut()
      .insert(TypeKey(ty), Rc::clone(&class));
    debug!("class {} built, depth {}", ty.name, ty.depth());
    Ok(class)
  }
}

impl Drop for MetaClass {
  fn drop(&mut self) {
    let classes: Vec<Rc<Class>> = mem::take(self.type_to_class.get_mut())
      .into_iter()
      .map(|(_, class)| class)
      .collect();
    // Children before parents
    // 子类先于父类
    for class in classes.iter().rev() {
      if let Some(done) = class.class_done() {
        done(class);
      }
    }
  }
}
