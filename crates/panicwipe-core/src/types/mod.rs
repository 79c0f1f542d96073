mod remote;
mod report;
mod stage;
mod state;
mod trigger;

pub use remote::*;
pub use report::*;
pub use stage::*;
pub use state::*;
pub use trigger::*;
