//! 结果组装服务 - 业务能力层
//!
//! 把远端返回的排班结果整理成"年级 × 时间段 × 日期"的网格。
//! 纯函数，不做任何 IO。

use crate::models::{is_shortage, ExamSlot, HallTier, ScheduleResult};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// 周日开头的星期名称
const WEEKDAY_NAMES: [&str; 7] = [
    "الأحد",
    "الاثنين",
    "الثلاثاء",
    "الأربعاء",
    "الخميس",
    "الجمعة",
    "السبت",
];

/// 日期列
#[derive(Debug, Clone, PartialEq)]
pub struct DateColumn {
    pub date: String,
    /// 日期无法解析时为 None
    pub weekday: Option<&'static str>,
}

/// 单个监考位
#[derive(Debug, Clone, PartialEq)]
pub enum GuardEntry {
    Named(String),
    /// 缺员，保留原始文本用于显示
    Shortage(String),
}

impl GuardEntry {
    fn from_raw(raw: &str) -> Self {
        if is_shortage(raw) {
            GuardEntry::Shortage(raw.to_string())
        } else {
            GuardEntry::Named(raw.to_string())
        }
    }

    pub fn text(&self) -> &str {
        match self {
            GuardEntry::Named(s) | GuardEntry::Shortage(s) => s,
        }
    }

    pub fn is_shortage(&self) -> bool {
        matches!(self, GuardEntry::Shortage(_))
    }
}

/// 同一等级考场的分组
#[derive(Debug, Clone, PartialEq)]
pub struct HallGroup {
    pub tier: HallTier,
    pub hall_names: Vec<String>,
    /// 该组应有的监考人数
    pub expected: usize,
    /// 实际分到的监考（可能少于 expected）
    pub guards: Vec<GuardEntry>,
}

/// 网格中的一格
#[derive(Debug, Clone, PartialEq)]
pub struct ExamCell {
    pub subject: String,
    pub professor: String,
    pub guards_incomplete: bool,
    pub hall_groups: Vec<HallGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub time: String,
    /// 与 `ScheduleView::columns` 一一对应
    pub cells: Vec<Option<ExamCell>>,
}

/// 一个年级的表格
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    pub level: String,
    pub rows: Vec<GridRow>,
}

/// 组装后的展示结构
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleView {
    pub columns: Vec<DateColumn>,
    pub times: Vec<String>,
    pub levels: Vec<LevelTable>,
}

impl ScheduleView {
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// 日期对应的星期名称
pub fn weekday_name(date: &str) -> Option<&'static str> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    Some(WEEKDAY_NAMES[parsed.weekday().num_days_from_sunday() as usize])
}

/// 组装排班结果
///
/// # 参数
/// - `result`: 远端返回的排班结果
///
/// # 返回
/// 每个年级一张表；同一单元格有多场同年级考试时只取第一场
pub fn assemble(result: &ScheduleResult) -> ScheduleView {
    let columns: Vec<DateColumn> = result
        .0
        .keys()
        .map(|date| DateColumn {
            date: date.clone(),
            weekday: weekday_name(date),
        })
        .collect();

    let times: Vec<String> = result
        .0
        .values()
        .flat_map(|by_time| by_time.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let levels: BTreeSet<&str> = result
        .slots()
        .filter_map(|(_, _, slot)| slot.level.as_deref())
        .filter(|level| !level.is_empty())
        .collect();

    let levels = levels
        .into_iter()
        .map(|level| LevelTable {
            level: level.to_string(),
            rows: times
                .iter()
                .map(|time| GridRow {
                    time: time.clone(),
                    cells: columns
                        .iter()
                        .map(|col| find_slot(result, &col.date, time, level).map(build_cell))
                        .collect(),
                })
                .collect(),
        })
        .collect();

    ScheduleView {
        columns,
        times,
        levels,
    }
}

fn find_slot<'a>(
    result: &'a ScheduleResult,
    date: &str,
    time: &str,
    level: &str,
) -> Option<&'a ExamSlot> {
    result
        .0
        .get(date)?
        .get(time)?
        .iter()
        .find(|slot| slot.level.as_deref() == Some(level))
}

/// 按 大 → 中 → 小 的顺序把监考名单切给各组考场
///
/// 名单比期望短时，后面的组拿到的更少或为空；
/// 未知等级的考场不参与分组。
pub fn build_cell(slot: &ExamSlot) -> ExamCell {
    let mut cursor = 0;
    let mut hall_groups = Vec::new();

    for tier in HallTier::ORDER {
        let hall_names: Vec<String> = slot
            .halls
            .iter()
            .filter(|h| h.tier() == Some(tier))
            .map(|h| h.name.clone())
            .collect();
        if hall_names.is_empty() {
            continue;
        }

        let expected = hall_names.len() * tier.capacity();
        let start = cursor.min(slot.guards.len());
        let end = (cursor + expected).min(slot.guards.len());
        cursor += expected;

        hall_groups.push(HallGroup {
            tier,
            hall_names,
            expected,
            guards: slot.guards[start..end]
                .iter()
                .map(|g| GuardEntry::from_raw(g))
                .collect(),
        });
    }

    ExamCell {
        subject: slot.subject.clone(),
        professor: slot.professor.clone(),
        guards_incomplete: slot.guards_incomplete,
        hall_groups,
    }
}
