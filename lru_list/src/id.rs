//! Node handle / 节点句柄
//!
//! Format: [32 bits generation][32 bits slot index]
//! 格式: [32位代数][32位槽索引]

/// Handle to a node inside one list.
///
/// The generation changes whenever the slot gets a new key or is freed,
/// so a handle kept across an eviction stops resolving.
///
/// 节点句柄。槽位换键或释放时代数改变，淘汰后的旧句柄失效。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
  pub(crate) idx: u32,
  pub(crate) generation: u32,
}

impl NodeId {
  #[inline]
  pub(crate) const fn new(idx: u32, generation: u32) -> Self {
    Self { idx, generation }
  }

  /// Slot index / 槽索引
  #[inline]
  pub const fn idx(self) -> u32 {
    self.idx
  }

  /// Pack into u64 / 打包为 u64
  #[inline]
  pub const fn to_u64(self) -> u64 {
    ((self.generation as u64) << 32) | self.idx as u64
  }

  /// Unpack from u64 / 从 u64 解包
  #[inline]
  pub const fn from_u64(v: u64) -> Self {
    Self {
      idx: v as u32,
      generation: (v >> 32) as u32,
    }
  }
}
