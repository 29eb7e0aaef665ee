//! Single-operator modules.

mod addmm;
mod fill;
mod pad;

pub use addmm::AddmmModule;
pub use fill::FillAnyLikeModule;
pub use pad::{ListPadModule, PadModule};
