//! Error types / 错误类型

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// Handle or argument names nothing live / 句柄或参数无效
  #[error("invalid argument: {0}")]
  InvalidArgument(&'static str),

  /// Class or object block allocation failed / 类或对象内存分配失败
  #[error("out of memory")]
  OutOfMemory,

  /// `class_init` or `obj_init` refused / 构造回调失败
  #[error("construction failed: {0}")]
  ConstructionFailed(String),
}
