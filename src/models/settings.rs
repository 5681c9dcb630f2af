//! 排班设置
//!
//! 提交任务时原样发送给服务端的配置对象。字段名与服务端保持一致（camelCase），
//! 未知字段在边界处直接拒绝。
//!
//! 浏览器表单提交的数值全部是字符串，服务端也按字符串比较
//! （例如 `maxShifts != '0'`），所以数值字段序列化时仍写成字符串，
//! 读取时同时接受数字和数字字符串。

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// 均衡策略（由远端执行，本地只负责选择和传参）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancingStrategy {
    #[default]
    Advanced,
    Annealing,
    Genetic,
    TabuSearch,
    Lns,
    Vns,
    ConstraintSolver,
}

/// 教师监考天数模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DutyPattern {
    #[serde(rename = "one_day_only")]
    OneDayOnly,
    #[serde(rename = "flexible_2_days")]
    Flexible2Days,
    #[serde(rename = "flexible_3_days")]
    Flexible3Days,
    #[serde(rename = "consecutive_strict")]
    ConsecutiveStrict,
}

/// 考试时段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    #[default]
    Primary,
    Reserve,
}

/// 某天的一个考试时段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExamPeriod {
    /// "HH:MM-HH:MM"
    pub time: String,
    pub levels: Vec<String>,
    #[serde(rename = "type", default)]
    pub period_type: PeriodType,
}

/// 自定义目标分布
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomTargetPattern {
    pub large: u32,
    pub other: u32,
    pub count: u32,
}

/// 完整的排班设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct GenerationSettings {
    pub exam_schedule: BTreeMap<String, Vec<ExamPeriod>>,
    pub duty_patterns: BTreeMap<String, DutyPattern>,
    pub unavailable_days: BTreeMap<String, Vec<String>>,
    pub level_hall_assignments: BTreeMap<String, Vec<String>>,

    pub assign_owner_as_guard: bool,
    /// 0 表示不限
    #[serde(with = "form_number")]
    pub max_shifts: u32,
    /// 0 表示不限
    #[serde(with = "form_number")]
    pub max_large_hall_shifts: u32,
    pub intensive_search: bool,
    pub group_subjects: bool,
    #[serde(with = "form_number")]
    pub iterations: u32,
    /// "none" 或 "last_<n>"
    pub last_day_restriction: String,

    #[serde(with = "form_number")]
    pub large_hall_weight: f64,
    #[serde(with = "form_number")]
    pub other_hall_weight: f64,
    #[serde(with = "form_number")]
    pub guards_large_hall: u32,
    #[serde(with = "form_number")]
    pub guards_medium_hall: u32,
    #[serde(with = "form_number")]
    pub guards_small_hall: u32,

    pub enable_custom_targets: bool,
    pub custom_target_patterns: Vec<CustomTargetPattern>,

    pub balancing_strategy: BalancingStrategy,
    #[serde(with = "form_number")]
    pub swap_attempts: u32,
    #[serde(with = "form_number")]
    pub polishing_swaps: u32,
    #[serde(with = "form_number")]
    pub annealing_temp: f64,
    #[serde(with = "form_number")]
    pub annealing_cooling: f64,
    #[serde(with = "form_number")]
    pub annealing_iterations: u32,
    #[serde(with = "form_number")]
    pub solver_timelimit: u32,
    #[serde(with = "form_number")]
    pub genetic_population: u32,
    #[serde(with = "form_number")]
    pub genetic_generations: u32,
    #[serde(with = "form_number")]
    pub genetic_elitism: u32,
    #[serde(with = "form_number")]
    pub genetic_mutation: f64,
    #[serde(with = "form_number")]
    pub tabu_iterations: u32,
    #[serde(with = "form_number")]
    pub tabu_tenure: u32,
    #[serde(with = "form_number")]
    pub tabu_neighborhood_size: u32,
    #[serde(with = "form_number")]
    pub lns_iterations: u32,
    #[serde(with = "form_number")]
    pub lns_destroy_fraction: f64,
    #[serde(with = "form_number")]
    pub vns_iterations: u32,
    #[serde(with = "form_number")]
    pub vns_max_k: u32,

    pub professor_partnerships: Vec<[String; 2]>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            exam_schedule: BTreeMap::new(),
            duty_patterns: BTreeMap::new(),
            unavailable_days: BTreeMap::new(),
            level_hall_assignments: BTreeMap::new(),
            assign_owner_as_guard: false,
            max_shifts: 0,
            max_large_hall_shifts: 2,
            intensive_search: false,
            group_subjects: false,
            iterations: 200,
            last_day_restriction: "none".to_string(),
            large_hall_weight: 3.0,
            other_hall_weight: 1.0,
            guards_large_hall: 4,
            guards_medium_hall: 2,
            guards_small_hall: 1,
            enable_custom_targets: false,
            custom_target_patterns: Vec::new(),
            balancing_strategy: BalancingStrategy::Advanced,
            swap_attempts: 50,
            polishing_swaps: 15,
            annealing_temp: 1000.0,
            annealing_cooling: 0.995,
            annealing_iterations: 1000,
            solver_timelimit: 30,
            genetic_population: 100,
            genetic_generations: 500,
            genetic_elitism: 4,
            genetic_mutation: 0.15,
            tabu_iterations: 100,
            tabu_tenure: 15,
            tabu_neighborhood_size: 50,
            lns_iterations: 100,
            lns_destroy_fraction: 0.2,
            vns_iterations: 100,
            vns_max_k: 10,
            professor_partnerships: Vec::new(),
        }
    }
}

fn time_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}:\d{2}-\d{2}:\d{2}$").expect("时间段正则为字面量"))
}

fn last_day_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(none|last_\d+)$").expect("最后一天限制正则为字面量"))
}

impl GenerationSettings {
    /// 校验字段取值范围（保存设置时使用，允许考试日程为空）
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (date, periods) in &self.exam_schedule {
            for period in periods {
                if !time_range_regex().is_match(&period.time) {
                    return Err(ValidationError::BadTimeRange {
                        date: date.clone(),
                        time: period.time.clone(),
                    });
                }
            }
        }

        if !last_day_regex().is_match(&self.last_day_restriction) {
            return Err(ValidationError::UnknownValue {
                field: "lastDayRestriction",
                value: self.last_day_restriction.clone(),
            });
        }

        positive("largeHallWeight", self.large_hall_weight)?;
        positive("otherHallWeight", self.other_hall_weight)?;
        positive("annealingTemp", self.annealing_temp)?;
        open_unit("annealingCooling", self.annealing_cooling, false)?;
        open_unit("lnsDestroyFraction", self.lns_destroy_fraction, true)?;
        if !(0.0..=1.0).contains(&self.genetic_mutation) {
            return Err(ValidationError::OutOfRange {
                field: "geneticMutation",
                value: self.genetic_mutation.to_string(),
                expected: "[0, 1]",
            });
        }
        if self.genetic_elitism > self.genetic_population {
            return Err(ValidationError::OutOfRange {
                field: "geneticElitism",
                value: self.genetic_elitism.to_string(),
                expected: "<= geneticPopulation",
            });
        }

        for pattern in &self.custom_target_patterns {
            if pattern.count == 0 {
                return Err(ValidationError::OutOfRange {
                    field: "customTargetPatterns.count",
                    value: "0".to_string(),
                    expected: "> 0",
                });
            }
        }

        for [first, second] in &self.professor_partnerships {
            if first.trim().is_empty() || second.trim().is_empty() || first == second {
                return Err(ValidationError::BadPartnership(format!("{} / {}", first, second)));
            }
        }

        Ok(())
    }

    /// 提交任务前的完整校验：考试日程不能为空
    pub fn validate_for_submission(&self) -> Result<(), ValidationError> {
        if self.exam_schedule.is_empty() {
            return Err(ValidationError::EmptyExamSchedule);
        }
        self.validate()
    }

    /// 考试日程中所有日期（升序）
    pub fn exam_dates(&self) -> Vec<&str> {
        self.exam_schedule.keys().map(String::as_str).collect()
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "> 0",
        })
    }
}

fn open_unit(field: &'static str, value: f64, include_one: bool) -> Result<(), ValidationError> {
    let ok = value > 0.0 && if include_one { value <= 1.0 } else { value < 1.0 };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            expected: if include_one { "(0, 1]" } else { "(0, 1)" },
        })
    }
}

/// 表单数值：读取时接受数字或数字字符串，写出时为字符串
mod form_number {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;
    use std::marker::PhantomData;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: fmt::Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FormNumber,
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FormNumberVisitor(PhantomData))
    }

    /// 可以从表单值转换的数值类型
    pub trait FormNumber: FromStr + Sized {
        fn from_u64(v: u64) -> Option<Self>;
        fn from_i64(v: i64) -> Option<Self>;
        fn from_f64(v: f64) -> Option<Self>;
    }

    impl FormNumber for u32 {
        fn from_u64(v: u64) -> Option<Self> {
            u32::try_from(v).ok()
        }
        fn from_i64(v: i64) -> Option<Self> {
            u32::try_from(v).ok()
        }
        fn from_f64(v: f64) -> Option<Self> {
            if v.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&v) {
                Some(v as u32)
            } else {
                None
            }
        }
    }

    impl FormNumber for f64 {
        fn from_u64(v: u64) -> Option<Self> {
            Some(v as f64)
        }
        fn from_i64(v: i64) -> Option<Self> {
            Some(v as f64)
        }
        fn from_f64(v: f64) -> Option<Self> {
            v.is_finite().then_some(v)
        }
    }

    struct FormNumberVisitor<T>(PhantomData<T>);

    impl<'de, T: FormNumber> Visitor<'de> for FormNumberVisitor<T> {
        type Value = T;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
            T::from_u64(v).ok_or_else(|| E::custom(format!("number out of range: {}", v)))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
            T::from_i64(v).ok_or_else(|| E::custom(format!("number out of range: {}", v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<T, E> {
            T::from_f64(v).ok_or_else(|| E::custom(format!("number out of range: {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
            v.trim()
                .parse::<T>()
                .map_err(|_| E::custom(format!("not a number: '{}'", v)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_one_day() -> GenerationSettings {
        let mut settings = GenerationSettings::default();
        settings.exam_schedule.insert(
            "2024-06-02".to_string(),
            vec![ExamPeriod {
                time: "08:00-10:00".to_string(),
                levels: vec!["L1".to_string()],
                period_type: PeriodType::Primary,
            }],
        );
        settings
    }

    #[test]
    fn test_accepts_browser_form_strings() {
        let json = r#"{
            "examSchedule": {"2024-06-02": [{"time": "08:00-10:00", "levels": ["L1"], "type": "reserve"}]},
            "maxShifts": "0",
            "largeHallWeight": "2.5",
            "guardsLargeHall": 4,
            "balancingStrategy": "tabu_search",
            "dutyPatterns": {"أحمد": "flexible_2_days"},
            "professorPartnerships": [["أحمد", "سعيد"]]
        }"#;
        let settings: GenerationSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.max_shifts, 0);
        assert_eq!(settings.large_hall_weight, 2.5);
        assert_eq!(settings.balancing_strategy, BalancingStrategy::TabuSearch);
        assert_eq!(settings.exam_schedule["2024-06-02"][0].period_type, PeriodType::Reserve);
        assert_eq!(settings.tabu_tenure, 15);
        assert!(settings.validate_for_submission().is_ok());
    }

    #[test]
    fn test_numbers_serialize_as_strings() {
        let value = serde_json::to_value(GenerationSettings::default()).unwrap();
        assert_eq!(value["maxShifts"], "0");
        assert_eq!(value["maxLargeHallShifts"], "2");
        assert_eq!(value["annealingCooling"], "0.995");
        assert_eq!(value["balancingStrategy"], "advanced");
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let result: Result<GenerationSettings, _> = serde_json::from_str(r#"{"maxShift": "3"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_numeric_string() {
        let result: Result<GenerationSettings, _> = serde_json::from_str(r#"{"iterations": "many"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_schedule_blocks_submission_only() {
        let settings = GenerationSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.validate_for_submission(),
            Err(ValidationError::EmptyExamSchedule)
        );
    }

    #[test]
    fn test_format_patterns() {
        assert!(time_range_regex().is_match("08:00-10:00"));
        assert!(!time_range_regex().is_match("8:00-10:00"));
        assert!(!time_range_regex().is_match("08:00-10:00 "));
        assert!(last_day_regex().is_match("none"));
        assert!(last_day_regex().is_match("last_2"));
        assert!(!last_day_regex().is_match("last_"));
    }

    #[test]
    fn test_bad_time_range() {
        let mut settings = settings_with_one_day();
        settings.exam_schedule.get_mut("2024-06-02").unwrap()[0].time = "8:00-10:00".to_string();
        assert!(matches!(
            settings.validate_for_submission(),
            Err(ValidationError::BadTimeRange { .. })
        ));
    }

    #[test]
    fn test_range_checks() {
        let mut settings = settings_with_one_day();
        settings.annealing_cooling = 1.0;
        assert!(settings.validate().is_err());

        let mut settings = settings_with_one_day();
        settings.last_day_restriction = "last_2".to_string();
        assert!(settings.validate().is_ok());
        settings.last_day_restriction = "final".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::UnknownValue { field: "lastDayRestriction", .. })
        ));

        let mut settings = settings_with_one_day();
        settings.professor_partnerships = vec![["أحمد".to_string(), "أحمد".to_string()]];
        assert!(matches!(settings.validate(), Err(ValidationError::BadPartnership(_))));
    }
}
