pub mod params;
pub mod schema;
pub mod steps;

pub use params::{ParamDef, Params};
pub use schema::{BrowserOptions, EvidenceConfig, OnFailure, Scenario, Target, Viewport};
pub use steps::{Locator, Step};
