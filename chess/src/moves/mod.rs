mod base;
mod make;

pub mod record;

pub use base::*;
pub use make::{Make, MakeError};
pub use record::{MoveRecord, RecordKind};
