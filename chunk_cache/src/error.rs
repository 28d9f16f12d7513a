//! Error types / 错误类型

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// Object is not a chunk family / 对象不是块族
  #[error("not a family object")]
  NotFamily,

  /// Item index past the family end / 条目索引越界
  #[error("index {index} out of range, family has {total} items")]
  OutOfRange { index: u32, total: u32 },

  /// Item loader failure / 条目加载失败
  #[error("load: {0}")]
  Load(String),

  #[error("lru: {0}")]
  Lru(#[from] lru_list::Error),

  #[error("class: {0}")]
  Class(#[from] meta_class::Error),
}
