//! Load taxonomy, combinations, and equivalent load descriptions

mod combination;
mod equivalent;
mod product;

pub use combination::LoadingCombination;
pub use equivalent::{
    BendingAxis, EquivTendonLoad, ExternalLoadKind, LoadDirection, NamedLoadDef, StrandType,
};
pub use product::{LoadCaseId, ProductForceType, ProductLoadMap};
