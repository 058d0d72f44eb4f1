//! 混铁炉（MIX）数据结构

use serde::{Deserialize, Serialize};

use super::bfj::FurnaceId;

/// 混铁站编号
pub type MixStationId = i32;

/// 化验记录的归属标记
pub const BELONGS_TO_LADLE_MOVEMENT: &str = "LadleMovement";

/// 推送到 MIX 的化验记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalDto {
    #[serde(rename = "nMix")]
    pub mix_station: MixStationId,
    #[serde(rename = "ladle")]
    pub ladle_id: i32,
    pub proba: i32,
    #[serde(rename = "numTaphole")]
    pub num_taphole: i32,
    #[serde(rename = "dt", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "si")]
    pub silicon: f64,
    #[serde(rename = "mn")]
    pub manganese: f64,
    #[serde(rename = "s")]
    pub sulfur: f64,
    #[serde(rename = "p")]
    pub phosphorus: f64,
    #[serde(rename = "belong")]
    pub belongs_to: String,
}

/// 铁水罐移动记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LadleMovement {
    pub date: String,
    #[serde(rename = "numDp")]
    pub furnace_id: FurnaceId,
    #[serde(rename = "numTapping")]
    pub tapping_number: i32,
    #[serde(rename = "dtCloseTaphole")]
    pub close_taphole_time: String,
    #[serde(rename = "temperExhaustIron")]
    pub exhaust_temperature: i32,
    #[serde(rename = "ladleTapping")]
    pub ladle_id: i32,
    #[serde(rename = "massCastIron")]
    pub cast_iron_mass: i32,
}
