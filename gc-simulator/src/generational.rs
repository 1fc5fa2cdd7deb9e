use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::object::{ObjectId, SimulatedObject};

/// 代
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// 新生代
    Young,
    /// 中生代
    Middle,
    /// 老生代（终点，年龄不再增长）
    Old,
}

impl Generation {
    pub const ALL: [Generation; 3] = [Generation::Young, Generation::Middle, Generation::Old];

    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::Young => "young",
            Generation::Middle => "middle",
            Generation::Old => "old",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分代堆（对象注册表）
///
/// 三个互不相交的有序桶加上年龄表：
/// - 新分配对象进入新生代，年龄为 0
/// - 晋升时年龄随对象一起移动
/// - 回收时删除年龄；没有对应对象的年龄条目会被保留
#[derive(Debug, Clone, Default)]
pub struct GenerationalHeap {
    /// 新生代
    young: Vec<SimulatedObject>,
    /// 中生代
    middle: Vec<SimulatedObject>,
    /// 老生代
    old: Vec<SimulatedObject>,
    /// 对象年龄映射
    ages: HashMap<ObjectId, u32>,
}

impl GenerationalHeap {
    /// 创建空堆
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配对象到新生代，年龄置 0
    pub fn allocate(&mut self, object: SimulatedObject) {
        self.ages.insert(object.id(), 0);
        self.young.push(object);
    }

    /// 直接把对象放到指定代的末尾（不修改年龄）
    pub fn insert(&mut self, generation: Generation, object: SimulatedObject) {
        self.bucket_mut(generation).push(object);
    }

    /// 获取某一代的对象
    pub fn bucket(&self, generation: Generation) -> &[SimulatedObject] {
        match generation {
            Generation::Young => &self.young,
            Generation::Middle => &self.middle,
            Generation::Old => &self.old,
        }
    }

    pub(crate) fn bucket_mut(&mut self, generation: Generation) -> &mut Vec<SimulatedObject> {
        match generation {
            Generation::Young => &mut self.young,
            Generation::Middle => &mut self.middle,
            Generation::Old => &mut self.old,
        }
    }

    /// 某一代的对象数
    pub fn len(&self, generation: Generation) -> usize {
        self.bucket(generation).len()
    }

    /// 所有代的对象总数
    pub fn live_count(&self) -> usize {
        self.young.len() + self.middle.len() + self.old.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    /// 查找对象所在的代
    pub fn generation_of(&self, id: ObjectId) -> Option<Generation> {
        Generation::ALL
            .into_iter()
            .find(|generation| self.bucket(*generation).iter().any(|obj| obj.id() == id))
    }

    /// 获取对象年龄
    pub fn age(&self, id: ObjectId) -> Option<u32> {
        self.ages.get(&id).copied()
    }

    /// 设置对象年龄
    pub fn set_age(&mut self, id: ObjectId, age: u32) {
        self.ages.insert(id, age);
    }

    /// 年龄加一并返回新值（缺失条目按 0 处理）
    pub(crate) fn increment_age(&mut self, id: ObjectId) -> u32 {
        let age = self.ages.entry(id).or_insert(0);
        *age += 1;
        *age
    }

    /// 删除年龄条目
    pub(crate) fn forget_age(&mut self, id: ObjectId) {
        self.ages.remove(&id);
    }

    /// 年龄表条目数（包括孤立条目）
    pub fn age_entries(&self) -> usize {
        self.ages.len()
    }

    /// 清空堆
    pub fn clear(&mut self) {
        self.young.clear();
        self.middle.clear();
        self.old.clear();
        self.ages.clear();
    }
}
