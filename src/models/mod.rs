pub mod bfj;
pub mod mix;
pub mod session;

pub use bfj::{
    ChemicalAnalysis, FurnaceId, FurnaceList, JournalEntry, JournalId, JournalPage, Ladle, Tapping,
};
pub use mix::{ChemicalDto, LadleMovement, MixStationId, BELONGS_TO_LADLE_MOVEMENT};
pub use session::{Session, SessionCookie};

use std::fmt;

/// 外部系统
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum System {
    /// 高炉日志系统
    Bfj,
    /// 混铁炉系统
    Mix,
}

impl System {
    /// 是否使用 `NotAuthorized` 响应体标记未授权
    pub fn honours_not_authorized_marker(self) -> bool {
        matches!(self, System::Mix)
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            System::Bfj => write!(f, "BFJ"),
            System::Mix => write!(f, "MIX"),
        }
    }
}
