//! 高炉日志（BFJ）数据结构

use serde::{Deserialize, Deserializer, Serialize};

/// 高炉编号
pub type FurnaceId = i32;

/// 日志编号
pub type JournalId = i32;

/// 高炉列表响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FurnaceList {
    #[serde(rename = "name", default)]
    pub furnaces: Vec<FurnaceId>,
}

/// 最新日志响应（BFJ 与 MIX 结构相同）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalPage {
    #[serde(rename = "dataJournals", default)]
    pub entries: Vec<JournalEntry>,
}

impl JournalPage {
    /// 取第一条（最新）日志编号
    pub fn latest_id(&self) -> Option<JournalId> {
        self.entries.first().map(|entry| entry.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalId,
}

/// 出铁记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tapping {
    #[serde(rename = "numTapping")]
    pub num_tapping: i32,
    #[serde(rename = "dtCloseTaphole", default)]
    pub dt_close_taphole: String,
    #[serde(rename = "temper", default)]
    pub temperature: f64,
    #[serde(rename = "listLadles", default)]
    pub ladles: Vec<Ladle>,
}

/// 铁水罐
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ladle {
    #[serde(rename = "ladle")]
    pub ladle_id: i32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub chemical: ChemicalAnalysis,
}

/// 化验成分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemicalAnalysis {
    #[serde(default)]
    pub proba: f64,
    #[serde(rename = "numTaphole", default)]
    pub num_taphole: i32,
    /// 化验时间，源字段为空字符串或 null 时为 `None`
    #[serde(rename = "dt", default, deserialize_with = "deserialize_empty_as_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "si", default)]
    pub silicon: f64,
    #[serde(rename = "mn", default)]
    pub manganese: f64,
    #[serde(rename = "s", default)]
    pub sulfur: f64,
    #[serde(rename = "p", default)]
    pub phosphorus: f64,
}

fn deserialize_empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
