//! Cache configuration
//! 缓存配置

/// Default configuration values
/// 默认配置值
pub mod default {
  pub const MAX_NODES: usize = 128;
  pub const CHUNK_SIZE: u32 = 16;
}

/// Chunk cache configuration
/// 块缓存配置
#[derive(Debug, Clone, Copy)]
pub enum Conf {
  /// Max cached chunks, 0 = unbounded
  /// 最大缓存块数，0 表示不限
  MaxNodes(usize),
  /// Items per chunk for families that leave `item_count` at 0
  /// `item_count` 为 0 的族所用的每块条目数
  ChunkSize(u32),
}

/// Parsed configuration
/// 解析后的配置
#[derive(Debug, Clone, Copy)]
pub struct ParsedConf {
  pub max_nodes: usize,
  pub chunk_size: u32,
}

impl Default for ParsedConf {
  fn default() -> Self {
    Self {
      max_nodes: default::MAX_NODES,
      chunk_size: default::CHUNK_SIZE,
    }
  }
}

impl ParsedConf {
  pub fn new(conf: &[Conf]) -> Self {
    let mut c = Self::default();
    for item in conf {
      match *item {
        Conf::MaxNodes(v) => c.max_nodes = v,
        Conf::ChunkSize(v) => c.chunk_size = v.max(1),
      }
    }
    c
  }
}
