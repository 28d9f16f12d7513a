//! # chunk_cache - Chunked item cache over family objects / 基于族对象的分块条目缓存
//!
//! Items of a family (e.g. glyphs of one face at one size) are cached in
//! chunks of `item_count` consecutive indices. Each chunk is one node of
//! an [`lru_list::LruList`]; a full list retargets its tail chunk in
//! place instead of freeing it. Families are [`meta_class`] objects whose
//! type inherits [`FAMILY_TYPE`].
//!
//! 族内条目按连续 `item_count` 个索引分块缓存，每块是 LRU 链表的一个节点。
//! 链表满时原地改指尾块。族是继承 [`FAMILY_TYPE`] 的对象。
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cache;
mod class;
mod conf;
mod error;
mod family;
mod node;

pub use cache::ChunkCache;
pub use class::{ChunkClass, ItemLoader};
pub use conf::{Conf, ParsedConf, default};
pub use error::{Error, Result};
pub use family::{FAMILY_SIZE, FAMILY_TYPE, Family, FamilyInit, family_init, in_range};
pub use node::{ChunkNode, Query};
