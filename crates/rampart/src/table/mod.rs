//! The in-memory table model consumed by checks.

mod column;
mod dtype;
mod frame;
mod loader;
mod mask;
mod value;

pub use column::Column;
pub use dtype::{DType, TimeUnit};
pub use frame::{Index, Table, Tabular};
pub use loader::CsvOptions;
pub use mask::Mask;
pub use value::{Complex, Label, Value};
