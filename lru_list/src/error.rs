//! Error types / 错误类型

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// Handle or argument names nothing live / 句柄或参数无效
  #[error("invalid argument: {0}")]
  InvalidArgument(&'static str),

  /// Slab growth failed / 节点槽扩容失败
  #[error("out of memory")]
  OutOfMemory,

  /// Node callback refused to build / 节点回调构造失败
  #[error("construction failed: {0}")]
  ConstructionFailed(String),
}
