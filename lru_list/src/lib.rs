//! # lru_list - Bounded LRU list with node classes / 带节点类的有界 LRU 链表
//!
//! A small recency-ordered cache of nodes whose lifecycle is driven by a
//! shared [`LruClass`]. Nodes are looked up by key with a linear scan,
//! promoted to the head on hit, and the tail is recycled in place when
//! the list is full (`node_flush`), or torn down and rebuilt
//! (`node_done` + `node_init`) when the class cannot flush.
//!
//! 节点生命周期由共享的 [`LruClass`] 驱动。命中时移到表头，满时原地回收尾节点。
#![cfg_attr(docsrs, feature(doc_cfg))]

mod class;
mod error;
mod id;
mod list;

pub use class::LruClass;
pub use error::{Error, Result};
pub use id::NodeId;
pub use list::{Iter, LruList};
