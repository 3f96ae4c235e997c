/// The conversion pipeline from an input file to an output file.
pub mod conversion;
/// Typed solver records.
pub mod input;
/// Open-PSA MEF XML emission.
pub mod mef;
/// The on-disk store of encoded sequence logic.
pub mod sequence_store;

pub use conversion::{ConvertError, Summary};
pub use input::{LoadError, SolveInput};
pub use mef::{ToMef, to_xml_string, write_document};
pub use sequence_store::{SequenceStore, StoreError, persist_sequence_logic};
