//! # meta_class - Runtime classes and counted objects / 运行时类与计数对象
//!
//! Single inheritance without language inheritance: a static [`Type`]
//! describes a class; the [`Library`]'s [`MetaClass`] builds the runtime
//! [`Class`] once, copying the parent's resolved fields before applying
//! the type's own overrides. Objects are zeroed byte blocks sized by
//! their class and shared through [`Obj`] handles.
//!
//! 单继承：静态 [`Type`] 描述类，[`Library`] 的 [`MetaClass`] 仅构建一次运行时 [`Class`]，
//! 先复制父类已解析字段，再应用本类型覆盖。对象是按类大小分配的清零内存块。
//!
//! Not thread safe: every type here is `!Send`.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod class;
mod error;
mod library;
mod meta;
mod object;
mod ty;

pub use class::{Class, MAGIC_CLASS};
pub use error::{Error, Result};
pub use library::{Library, LibraryId};
pub use meta::{META_TYPE, MetaClass};
pub use object::{Obj, Object, object_check, object_create, object_is_a, ref_count};
pub use ty::{ClassDone, ClassInit, ObjDone, ObjInit, Type};
