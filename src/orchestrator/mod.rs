//! 编排层（Orchestration Layer）
//!
//! ```text
//! app (轮询、会话与连接池的所有者)
//!     ↓
//! sync_cycle (单轮: BFJ → 映射 → MIX)
//!     ↓
//! services (journal_reader / record_mapper / mix_writer)
//!     ↓
//! clients (api_client / session_auth)
//! ```

pub mod app;
pub mod sync_cycle;

pub use app::App;
pub use sync_cycle::{CycleStats, Sessions, SyncCycle};
