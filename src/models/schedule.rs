//! 排班结果数据结构
//!
//! 完全由远端引擎生成，本地只读。

use phf::phf_map;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// 缺员标记：远端无法填满监考位时用它代替监考人姓名
pub const SHORTAGE_MARKER: &str = "**نقص**";

/// 考场容量等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HallTier {
    /// 大考场（4 名监考）
    Large,
    /// 中考场（2 名监考）
    Medium,
    /// 小考场（1 名监考）
    Small,
}

/// 线上的等级标签 → 等级
static TIER_LABELS: phf::Map<&'static str, HallTier> = phf_map! {
    "كبيرة" => HallTier::Large,
    "متوسطة" => HallTier::Medium,
    "صغيرة" => HallTier::Small,
    "large" => HallTier::Large,
    "medium" => HallTier::Medium,
    "small" => HallTier::Small,
};

impl HallTier {
    /// 渲染时的固定分组顺序
    pub const ORDER: [HallTier; 3] = [HallTier::Large, HallTier::Medium, HallTier::Small];

    /// 每个考场需要的监考人数
    pub fn capacity(self) -> usize {
        match self {
            HallTier::Large => 4,
            HallTier::Medium => 2,
            HallTier::Small => 1,
        }
    }

    /// 服务端使用的标签
    pub fn wire_label(self) -> &'static str {
        match self {
            HallTier::Large => "كبيرة",
            HallTier::Medium => "متوسطة",
            HallTier::Small => "صغيرة",
        }
    }

    /// 分组标题
    pub fn title(self) -> &'static str {
        match self {
            HallTier::Large => "القاعة الكبيرة",
            HallTier::Medium => "القاعات المتوسطة",
            HallTier::Small => "القاعات الصغيرة",
        }
    }

    /// 从标签解析（未知标签返回 None）
    pub fn from_label(label: &str) -> Option<Self> {
        TIER_LABELS.get(label.trim()).copied()
    }
}

/// 考场
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hall {
    pub name: String,
    #[serde(rename = "type", default)]
    pub hall_type: String,
}

impl Hall {
    pub fn new(name: impl Into<String>, tier: HallTier) -> Self {
        Self {
            name: name.into(),
            hall_type: tier.wire_label().to_string(),
        }
    }

    pub fn tier(&self) -> Option<HallTier> {
        HallTier::from_label(&self.hall_type)
    }
}

/// 单场考试
///
/// `guards` 的长度只是"期望等于"各考场容量之和，远端不足时会更短，
/// 不能假设二者相等。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamSlot {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub professor: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub halls: Vec<Hall>,
    #[serde(default)]
    pub guards: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub guards_incomplete: bool,
    /// 其余字段原样保留，导出时回传给服务端
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ExamSlot {
    /// 按考场容量计算的期望监考人数
    pub fn expected_guard_count(&self) -> usize {
        self.halls
            .iter()
            .filter_map(Hall::tier)
            .map(HallTier::capacity)
            .sum()
    }

    /// 实际缺少的监考位数（包括缺员标记和未返回的位置）
    pub fn missing_guard_count(&self) -> usize {
        let marked = self.guards.iter().filter(|g| is_shortage(g)).count();
        let absent = self.expected_guard_count().saturating_sub(self.guards.len());
        marked + absent
    }
}

/// 判断监考条目是否为缺员标记
pub fn is_shortage(guard: &str) -> bool {
    guard.contains(SHORTAGE_MARKER)
}

/// 日期 → 时间段 → 考试列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleResult(pub BTreeMap<String, BTreeMap<String, Vec<ExamSlot>>>);

impl ScheduleResult {
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|times| times.values().all(Vec::is_empty))
    }

    /// 按 (日期, 时间段, 考试) 依次遍历
    pub fn slots(&self) -> impl Iterator<Item = (&str, &str, &ExamSlot)> {
        self.0.iter().flat_map(|(date, times)| {
            times.iter().flat_map(move |(time, slots)| {
                slots
                    .iter()
                    .map(move |slot| (date.as_str(), time.as_str(), slot))
            })
        })
    }

    /// 所有考试中出现的缺员位数
    pub fn total_missing_guards(&self) -> usize {
        self.slots().map(|(_, _, slot)| slot.missing_guard_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_labels() {
        assert_eq!(HallTier::from_label("كبيرة"), Some(HallTier::Large));
        assert_eq!(HallTier::from_label(" medium "), Some(HallTier::Medium));
        assert_eq!(HallTier::from_label("قاعة"), None);
    }

    #[test]
    fn test_expected_guard_count_ignores_unknown_tiers() {
        let slot = ExamSlot {
            halls: vec![
                Hall::new("A", HallTier::Large),
                Hall::new("B", HallTier::Medium),
                Hall {
                    name: "X".to_string(),
                    hall_type: "unknown".to_string(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(slot.expected_guard_count(), 6);
    }

    #[test]
    fn test_slot_deserializes_with_missing_fields() {
        let json = r#"{"subject": "رياضيات", "halls": [{"name": "A", "type": "صغيرة"}], "room_note": "x"}"#;
        let slot: ExamSlot = serde_json::from_str(json).unwrap();
        assert_eq!(slot.level, None);
        assert!(slot.guards.is_empty());
        assert_eq!(slot.missing_guard_count(), 1);
        assert_eq!(slot.extra.get("room_note"), Some(&JsonValue::from("x")));
    }

    #[test]
    fn test_schedule_result_is_transparent_map() {
        let json = r#"{"2024-06-02": {"08:00-10:00": [{"subject": "S", "professor": "P", "level": "L1", "halls": [], "guards": []}]}}"#;
        let schedule: ScheduleResult = serde_json::from_str(json).unwrap();
        assert!(!schedule.is_empty());
        let (date, time, slot) = schedule.slots().next().unwrap();
        assert_eq!((date, time, slot.subject.as_str()), ("2024-06-02", "08:00-10:00", "S"));
    }
}
