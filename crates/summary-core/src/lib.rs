pub mod clock;
pub mod keywords;
pub mod record;
pub mod refine;

pub use clock::*;
pub use keywords::*;
pub use record::*;
pub use refine::*;
