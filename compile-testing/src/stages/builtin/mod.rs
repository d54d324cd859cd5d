//! The stages every compilation can use.
//!
//! | id | runs | owns |
//! |---|---|---|
//! | `annotation-processing` | before `primary-compile` | `annotation-processing/` |
//! | `symbol-processing` | before `primary-compile` | `symbol-processing/` |
//! | `primary-compile` | always | `primary/` |
//! | `secondary-compile` | after `primary-compile` | `secondary/` |
//!
//! Each stage recreates its own subtree of the working directory and never
//! touches anything outside it.

mod annotation;
mod common;
mod primary;
mod secondary;
mod symbol;

pub use annotation::AnnotationProcessingStage;
pub use common::{common_arguments, common_classpaths};
pub use primary::PrimaryCompileStage;
pub use secondary::SecondaryCompileStage;
pub use symbol::SymbolProcessingStage;
