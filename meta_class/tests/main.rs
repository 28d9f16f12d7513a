use std::{
  any::Any,
  cell::RefCell,
  rc::Rc,
  sync::atomic::{AtomicUsize, Ordering},
};

use aok::{OK, Void};
use log::info;
use meta_class::{
  Class, Error, Library, MAGIC_CLASS, ObjInit, Object, Result, Type, object_check, object_create,
  object_is_a, ref_count,
};

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

// --- memoization / 缓存 ---

static MEMO_INITS: AtomicUsize = AtomicUsize::new(0);

fn memo_class_init(_: &mut Class) -> Result<()> {
  MEMO_INITS.fetch_add(1, Ordering::Relaxed);
  Ok(())
}

static MEMO: Type = Type {
  class_init: Some(memo_class_init),
  obj_size: 4,
  ..Type::new("memo")
};

#[test]
fn test_class_memoized_per_library() -> Void {
  info!("> class built once per library");

  let lib = Library::new();
  let a = lib.class_from_type(&MEMO)?;
  let b = lib.class_from_type(&MEMO)?;
  assert!(Rc::ptr_eq(&a, &b));
  assert_eq!(MEMO_INITS.load(Ordering::Relaxed), 1);
  assert_eq!(lib.num_classes(), 1);
  assert_eq!(a.library(), lib.id());

  let other = Library::new();
  let c = other.class_from_type(&MEMO)?;
  assert!(!Rc::ptr_eq(&a, &c));
  assert_eq!(MEMO_INITS.load(Ordering::Relaxed), 2);
  OK
}

// --- inheritance / 继承 ---

fn base_init(obj: &mut Object, init: &dyn Any) -> Result<()> {
  let v = init
    .downcast_ref::<u32>()
    .ok_or_else(|| Error::ConstructionFailed("expect u32".into()))?;
  obj.data_mut()[..4].copy_from_slice(&v.to_le_bytes());
  Ok(())
}

static DERIVED_DONE: AtomicUsize = AtomicUsize::new(0);

fn derived_done(_: &mut Object) {
  DERIVED_DONE.fetch_add(1, Ordering::Relaxed);
}

static BASE: Type = Type {
  obj_size: 8,
  obj_init: Some(base_init),
  ..Type::new("base")
};

static DERIVED: Type = Type {
  sup: Some(&BASE),
  obj_done: Some(derived_done),
  ..Type::new("derived")
};

static GRAND: Type = Type {
  sup: Some(&DERIVED),
  obj_size: 16,
  ..Type::new("grand")
};

static UNRELATED: Type = Type {
  obj_size: 4,
  ..Type::new("unrelated")
};

fn addr(f: Option<ObjInit>) -> Option<usize> {
  f.map(|f| f as usize)
}

#[test]
fn test_inherit_obj_init() -> Void {
  info!("> obj_init falls back to nearest ancestor");

  let lib = Library::new();
  let derived = lib.class_from_type(&DERIVED)?;
  let grand = lib.class_from_type(&GRAND)?;

  let base_fn: ObjInit = base_init;
  assert_eq!(addr(derived.obj_init()), Some(base_fn as usize));
  assert_eq!(addr(grand.obj_init()), Some(base_fn as usize));
  assert_eq!(derived.obj_size(), 8);
  assert_eq!(grand.obj_size(), 16);
  assert!(grand.obj_done().is_some());

  // Parents were built first and memoized
  // 父类先构建并缓存
  assert_eq!(lib.num_classes(), 3);
  let base = lib.class_from_type(&BASE)?;
  assert!(Rc::ptr_eq(derived.super_class().expect("super"), &base));
  assert!(grand.is_subclass_of(&base));
  assert!(!base.is_subclass_of(&grand));
  OK
}

#[test]
fn test_object_create_and_is_a() -> Void {
  info!("> create object, walk is_a");

  let lib = Library::new();
  let obj = lib.create_from_type(&GRAND, &42u32)?;
  assert_eq!(obj.data().len(), 16);
  assert_eq!(&obj.data()[..4], &42u32.to_le_bytes());
  assert_eq!(ref_count(&obj), 1);

  let base = lib.class_from_type(&BASE)?;
  let unrelated = lib.class_from_type(&UNRELATED)?;
  assert!(object_check(Some(&obj)));
  assert!(object_is_a(Some(&obj), Some(&base)));
  assert!(object_is_a(Some(&obj), Some(obj.class())));
  assert!(object_is_a(Some(&obj), None));
  assert!(!object_is_a(Some(&obj), Some(&unrelated)));
  assert!(!object_is_a(None, None));
  assert!(!object_check(None));
  assert_eq!(obj.class().magic(), MAGIC_CLASS);
  OK
}

#[test]
fn test_obj_init_error_kind() -> Void {
  info!("> obj_init error propagates");

  let lib = Library::new();
  let r = lib.create_from_type(&BASE, &"not a u32");
  assert!(matches!(r, Err(Error::ConstructionFailed(_))));
  OK
}

static COUNTED_DONE: AtomicUsize = AtomicUsize::new(0);

fn counted_done(_: &mut Object) {
  COUNTED_DONE.fetch_add(1, Ordering::Relaxed);
}

static COUNTED: Type = Type {
  obj_size: 1,
  obj_done: Some(counted_done),
  ..Type::new("counted")
};

#[test]
fn test_obj_done_on_last_handle() -> Void {
  info!("> obj_done runs once, on last release");

  let lib = Library::new();
  let a = lib.create_from_type(&COUNTED, &())?;
  let b = Rc::clone(&a);
  assert_eq!(ref_count(&a), 2);
  drop(a);
  assert_eq!(COUNTED_DONE.load(Ordering::Relaxed), 0);
  drop(b);
  assert_eq!(COUNTED_DONE.load(Ordering::Relaxed), 1);
  OK
}

static FAILING_DONE: AtomicUsize = AtomicUsize::new(0);

fn failing_init(_: &mut Object, _: &dyn Any) -> Result<()> {
  Err(Error::ConstructionFailed("refuse".into()))
}

fn failing_done(_: &mut Object) {
  FAILING_DONE.fetch_add(1, Ordering::Relaxed);
}

static FAILING: Type = Type {
  obj_size: 4,
  obj_init: Some(failing_init),
  obj_done: Some(failing_done),
  ..Type::new("failing")
};

#[test]
fn test_obj_init_failure_unwinds() -> Void {
  info!("> failed obj_init runs obj_done, returns no object");

  let lib = Library::new();
  let class = lib.class_from_type(&FAILING)?;
  assert!(object_create(&class, &()).is_err());
  assert_eq!(FAILING_DONE.load(Ordering::Relaxed), 1);
  // Only the registry holds the class
  // 只有注册表持有该类
  assert_eq!(Rc::strong_count(&class), 2);
  OK
}

// --- class_init / class_done ---

static CHAIN_INITS: AtomicUsize = AtomicUsize::new(0);

fn chain_class_init(_: &mut Class) -> Result<()> {
  CHAIN_INITS.fetch_add(1, Ordering::Relaxed);
  Ok(())
}

static CHAIN_BASE: Type = Type {
  class_init: Some(chain_class_init),
  ..Type::new("chain_base")
};

static CHAIN_CHILD: Type = Type {
  sup: Some(&CHAIN_BASE),
  ..Type::new("chain_child")
};

#[test]
fn test_nearest_class_init_once_per_class() -> Void {
  info!("> nearest class_init runs once for each class");

  let lib = Library::new();
  lib.class_from_type(&CHAIN_CHILD)?;
  assert_eq!(CHAIN_INITS.load(Ordering::Relaxed), 2);
  lib.class_from_type(&CHAIN_CHILD)?;
  lib.class_from_type(&CHAIN_BASE)?;
  assert_eq!(CHAIN_INITS.load(Ordering::Relaxed), 2);
  OK
}

fn parent_class_init(class: &mut Class) -> Result<()> {
  class.data_mut()[0] = 0xAB;
  Ok(())
}

fn child_class_init(class: &mut Class) -> Result<()> {
  class.data_mut()[1] = 0xCD;
  Ok(())
}

static DATA_PARENT: Type = Type {
  class_size: 2,
  class_init: Some(parent_class_init),
  ..Type::new("data_parent")
};

static DATA_CHILD: Type = Type {
  sup: Some(&DATA_PARENT),
  class_size: 4,
  class_init: Some(child_class_init),
  ..Type::new("data_child")
};

#[test]
fn test_class_data_copied_down() -> Void {
  info!("> class data copied from parent before override");

  let lib = Library::new();
  let child = lib.class_from_type(&DATA_CHILD)?;
  assert_eq!(child.data(), &[0xAB, 0xCD, 0, 0]);
  let parent = lib.class_from_type(&DATA_PARENT)?;
  assert_eq!(parent.data(), &[0xAB, 0]);
  OK
}

static DATA_SHRINK: Type = Type {
  sup: Some(&DATA_CHILD),
  class_size: 1,
  ..Type::new("data_shrink")
};

#[test]
fn test_class_data_never_truncated() -> Void {
  info!("> smaller class_size keeps the parent's class data");

  let lib = Library::new();
  let shrink = lib.class_from_type(&DATA_SHRINK)?;
  assert_eq!(shrink.data(), &[0xAB, 0xCD, 0, 0]);
  OK
}

static BROKEN_DONE: AtomicUsize = AtomicUsize::new(0);

fn broken_class_init(_: &mut Class) -> Result<()> {
  Err(Error::ConstructionFailed("class".into()))
}

fn broken_class_done(_: &Class) {
  BROKEN_DONE.fetch_add(1, Ordering::Relaxed);
}

static BROKEN: Type = Type {
  sup: Some(&UNRELATED),
  class_init: Some(broken_class_init),
  class_done: Some(broken_class_done),
  ..Type::new("broken")
};

#[test]
fn test_class_init_failure_not_memoized() -> Void {
  info!("> failed class is undone and not registered");

  let lib = Library::new();
  assert!(lib.class_from_type(&BROKEN).is_err());
  assert_eq!(BROKEN_DONE.load(Ordering::Relaxed), 1);
  // Parent stays built
  // 父类保留
  assert_eq!(lib.num_classes(), 1);
  assert!(lib.meta().get(&BROKEN).is_none());

  assert!(lib.create_from_type(&BROKEN, &()).is_err());
  assert_eq!(BROKEN_DONE.load(Ordering::Relaxed), 2);
  OK
}

fn refuse_class_init(_: &mut Class) -> Result<()> {
  Err(Error::ConstructionFailed("refuse class".into()))
}

static REFUSED: Type = Type {
  class_init: Some(refuse_class_init),
  obj_size: 4,
  ..Type::new("refused")
};

static REFUSED_CHILD: Type = Type {
  sup: Some(&REFUSED),
  ..Type::new("refused_child")
};

#[test]
fn test_create_from_type_keeps_error_kind() -> Void {
  info!("> create_from_type returns the class error unchanged");

  let lib = Library::new();
  assert!(matches!(
    lib.create_from_type(&REFUSED, &()),
    Err(Error::ConstructionFailed(_))
  ));
  // Failing parent fails the child the same way
  // 父类失败时子类以同样错误失败
  assert!(matches!(
    lib.create_from_type(&REFUSED_CHILD, &()),
    Err(Error::ConstructionFailed(_))
  ));
  assert!(lib.meta().is_empty());
  OK
}

thread_local! {
  static TEARDOWN: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

fn record_done(class: &Class) {
  TEARDOWN.with(|t| t.borrow_mut().push(class.name()));
}

static TD_PARENT: Type = Type {
  class_done: Some(record_done),
  ..Type::new("td_parent")
};

static TD_CHILD: Type = Type {
  sup: Some(&TD_PARENT),
  ..Type::new("td_child")
};

#[test]
fn test_teardown_children_first() -> Void {
  info!("> library drop runs class_done, children first");

  let lib = Library::new();
  lib.class_from_type(&TD_CHILD)?;
  drop(lib);
  let order = TEARDOWN.with(|t| t.borrow().clone());
  assert_eq!(order, ["td_child", "td_parent"]);
  OK
}

// --- structural type equality / 结构相等 ---

static TWIN_A: Type = Type {
  sup: Some(&BASE),
  obj_size: 12,
  ..Type::new("twin")
};

static TWIN_B: Type = Type {
  sup: Some(&BASE),
  obj_size: 12,
  ..Type::new("twin")
};

static TWIN_C: Type = Type {
  sup: Some(&UNRELATED),
  obj_size: 12,
  ..Type::new("twin")
};

#[test]
fn test_equal_descriptors_share_class() -> Void {
  info!("> identical descriptors collapse to one class");

  assert!(!std::ptr::eq(&TWIN_A, &TWIN_B));
  assert_eq!(TWIN_A, TWIN_B);
  assert_ne!(TWIN_A, TWIN_C);

  let lib = Library::new();
  let a = lib.class_from_type(&TWIN_A)?;
  let b = lib.class_from_type(&TWIN_B)?;
  let c = lib.class_from_type(&TWIN_C)?;
  assert!(Rc::ptr_eq(&a, &b));
  assert!(!Rc::ptr_eq(&a, &c));
  OK
}

// --- meta-class / 元类 ---

#[test]
fn test_meta_class_link() -> Void {
  info!("> every class is an instance of the meta-class");

  let lib = Library::new();
  let base = lib.class_from_type(&BASE)?;
  let root = lib.meta().root();
  assert!(Rc::ptr_eq(&base.class().expect("meta"), root));
  assert!(Rc::ptr_eq(&root.class().expect("meta"), root));
  assert!(root.is_valid());
  assert!(matches!(
    object_create(root, &()),
    Err(Error::InvalidArgument(_))
  ));
  OK
}
