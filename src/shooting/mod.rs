//! Shooting module - power, classification, trajectory, and the shot lifecycle

mod bank_assist;
mod charge;
mod session;
mod signals;
mod systems;
mod trajectory;
mod zones;

pub use bank_assist::*;
pub use charge::*;
pub use session::*;
pub use signals::*;
pub use systems::*;
pub use trajectory::*;
pub use zones::*;
