mod live;
mod position;
mod vessel;

pub use live::*;
pub use position::*;
pub use vessel::*;
