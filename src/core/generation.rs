//! 代际（generation）竞技场
//!
//! 每次构建运行时管理器都会开启一个新的代际。与该代际绑定的原生对象按代际编号存放，
//! 在管理器销毁时整体移除，保证旧代际的实例在重载后不可再访问。

use std::collections::BTreeMap;
use std::fmt;

/// 代际编号，单调递增，第一次构建为 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GenerationId(u64);

impl GenerationId {
    /// 尚未构建任何管理器时的编号
    pub const NONE: GenerationId = GenerationId(0);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// 按代际索引的存储
#[derive(Debug)]
pub struct GenerationArena<T> {
    entries: BTreeMap<GenerationId, T>,
}

impl<T> Default for GenerationArena<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> GenerationArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入某代际的条目，返回被替换的旧值
    pub fn insert(&mut self, generation: GenerationId, value: T) -> Option<T> {
        self.entries.insert(generation, value)
    }

    pub fn get(&self, generation: GenerationId) -> Option<&T> {
        self.entries.get(&generation)
    }

    /// 移除整个代际
    pub fn remove(&mut self, generation: GenerationId) -> Option<T> {
        self.entries.remove(&generation)
    }

    pub fn contains(&self, generation: GenerationId) -> bool {
        self.entries.contains_key(&generation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generations(&self) -> impl Iterator<Item = GenerationId> + '_ {
        self.entries.keys().copied()
    }
}
