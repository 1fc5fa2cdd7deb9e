use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// 默认创建对象总数
pub const TOTAL_OBJECTS: usize = 5000;
/// 初始晋升阈值（对象年龄）
pub const INITIAL_SURVIVAL_THRESHOLD: u32 = 3;
/// 每创建多少个对象执行一次回收
pub const GC_CYCLE_INTERVAL: usize = 200;
/// 对象被标记为泄漏的概率
pub const LEAK_PROBABILITY: f64 = 0.01;
/// 触发压缩的碎片率阈值
pub const FRAGMENTATION_THRESHOLD: f64 = 0.2;
/// 压缩耗时下限（毫秒）
pub const COMPACTION_COST_MIN_MS: u64 = 50;
/// 压缩耗时上限（毫秒）
pub const COMPACTION_COST_MAX_MS: u64 = 200;

/// 模拟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 创建对象总数
    pub total_objects: usize,
    /// 初始晋升阈值
    pub initial_survival_threshold: u32,
    /// 回收间隔（创建对象数）
    pub cycle_interval: usize,
    /// 泄漏概率
    pub leak_probability: f64,
    /// 新对象链接到已有根对象的概率
    pub link_probability: f64,
    /// 新对象成为强引用根的概率
    pub root_probability: f64,
    /// 每次回收前释放一个根的概率（0 表示不释放）
    pub release_probability: f64,
    /// 碎片率阈值
    pub fragmentation_threshold: f64,
    /// 压缩耗时下限（毫秒）
    pub compaction_cost_min_ms: u64,
    /// 压缩耗时上限（毫秒）
    pub compaction_cost_max_ms: u64,
    /// 随机种子（None 表示使用系统熵）
    pub seed: Option<u64>,
    /// 测试模式：不真实休眠，允许注入碎片率
    pub test_mode: bool,
    /// 测试模式下使用的固定碎片率
    pub mock_fragmentation: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_objects: TOTAL_OBJECTS,
            initial_survival_threshold: INITIAL_SURVIVAL_THRESHOLD,
            cycle_interval: GC_CYCLE_INTERVAL,
            leak_probability: LEAK_PROBABILITY,
            link_probability: 0.5,
            root_probability: 0.5,
            release_probability: 0.0,
            fragmentation_threshold: FRAGMENTATION_THRESHOLD,
            compaction_cost_min_ms: COMPACTION_COST_MIN_MS,
            compaction_cost_max_ms: COMPACTION_COST_MAX_MS,
            seed: None,
            test_mode: false,
            mock_fragmentation: None,
        }
    }
}

impl SimulationConfig {
    /// 测试模式配置：不休眠，其余保持默认
    pub fn testing() -> Self {
        Self {
            test_mode: true,
            ..Self::default()
        }
    }

    /// 从 TOML 字符串解析配置并校验
    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SimError::config_io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// 校验配置
    pub fn validate(&self) -> SimResult<()> {
        if self.cycle_interval == 0 {
            return Err(SimError::invalid_config("cycle_interval must be positive"));
        }
        if self.initial_survival_threshold == 0 {
            return Err(SimError::invalid_config(
                "initial_survival_threshold must be at least 1",
            ));
        }

        for (name, value) in [
            ("leak_probability", self.leak_probability),
            ("link_probability", self.link_probability),
            ("root_probability", self.root_probability),
            ("release_probability", self.release_probability),
            ("fragmentation_threshold", self.fragmentation_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.compaction_cost_min_ms > self.compaction_cost_max_ms {
            return Err(SimError::invalid_config(format!(
                "compaction cost range is inverted: {}..={}",
                self.compaction_cost_min_ms, self.compaction_cost_max_ms
            )));
        }

        if let Some(level) = self.mock_fragmentation {
            if !(0.0..=1.0).contains(&level) {
                return Err(SimError::InvalidFragmentation(level));
            }
            if !self.test_mode {
                return Err(SimError::OverrideRequiresTestMode);
            }
        }

        Ok(())
    }
}
