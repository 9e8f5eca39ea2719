// Operations
mod operations;
pub use operations::*;

// Models
mod period;
pub use period::*;

mod profiles;
pub use profiles::*;

mod entries;
pub use entries::*;

mod summary;
pub use summary::*;
