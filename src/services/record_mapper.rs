//! BFJ 记录 → MIX 记录
//!
//! 纯函数，不修改源记录。

use crate::models::{
    ChemicalDto, FurnaceId, Ladle, LadleMovement, MixStationId, Tapping, BELONGS_TO_LADLE_MOVEMENT,
};

/// 由出铁记录构造铁水罐移动的公共部分，罐号与铁水量为 0
pub fn to_ladle_movement(furnace_id: FurnaceId, tapping: &Tapping) -> LadleMovement {
    LadleMovement {
        date: tapping.dt_close_taphole.clone(),
        furnace_id,
        tapping_number: tapping.num_tapping,
        close_taphole_time: tapping.dt_close_taphole.clone(),
        exhaust_temperature: tapping.temperature as i32,
        ladle_id: 0,
        cast_iron_mass: 0,
    }
}

impl LadleMovement {
    /// 填入某个铁水罐的罐号与铁水量
    pub fn for_ladle(&self, ladle: &Ladle) -> LadleMovement {
        LadleMovement {
            ladle_id: ladle.ladle_id,
            cast_iron_mass: ladle.weight as i32,
            ..self.clone()
        }
    }
}

/// 每个混铁站 × 每个铁水罐生成一条化验记录
pub fn to_chemical_dtos(ladles: &[Ladle], stations: &[MixStationId]) -> Vec<ChemicalDto> {
    stations
        .iter()
        .flat_map(|&station| ladles.iter().map(move |ladle| to_chemical_dto(station, ladle)))
        .collect()
}

fn to_chemical_dto(station: MixStationId, ladle: &Ladle) -> ChemicalDto {
    let chem = &ladle.chemical;
    ChemicalDto {
        mix_station: station,
        ladle_id: ladle.ladle_id,
        proba: chem.proba as i32,
        num_taphole: chem.num_taphole,
        timestamp: chem.timestamp.clone().filter(|dt| !dt.is_empty()),
        silicon: chem.silicon,
        manganese: chem.manganese,
        sulfur: chem.sulfur,
        phosphorus: chem.phosphorus,
        belongs_to: BELONGS_TO_LADLE_MOVEMENT.to_string(),
    }
}
