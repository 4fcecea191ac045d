//! AI module - AI shooter profiles and shot decisions

mod decision;
mod profiles;

pub use decision::*;
pub use profiles::*;
