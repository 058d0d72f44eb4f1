pub mod journal_lookup;
pub mod journal_reader;
pub mod mix_writer;
pub mod record_mapper;

pub use journal_lookup::JournalLookup;
pub use journal_reader::JournalReader;
pub use mix_writer::{MixWriter, PostReport};
