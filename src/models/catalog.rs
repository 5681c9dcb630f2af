use crate::models::schedule::HallTier;
use serde::{Deserialize, Serialize};

/// 教师记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessorRecord {
    pub name: String,
}

/// 考场记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub hall_type: String,
}

impl HallRecord {
    pub fn tier(&self) -> Option<HallTier> {
        HallTier::from_label(&self.hall_type)
    }
}

/// 科目记录（所属年级）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub name: String,
    pub level: String,
}

/// 服务端维护的实体目录，只用于自动填充分配计算器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub professors: Vec<ProfessorRecord>,
    #[serde(default)]
    pub halls: Vec<HallRecord>,
    #[serde(default)]
    pub subjects: Vec<SubjectRecord>,
}

impl Catalog {
    pub fn find_hall(&self, name: &str) -> Option<&HallRecord> {
        self.halls.iter().find(|h| h.name == name)
    }
}
