pub mod factcheck;
pub mod report;
pub mod ruleset;
pub mod sus;

pub use factcheck::*;
pub use report::*;
pub use ruleset::*;
pub use sus::*;
