//! Fleet supervisor: a thin monitoring station that watches every
//! truck's published state/position and renders a live dashboard. Stands
//! in for the "supervisory GUI" component named in the external
//! interfaces, grounded on the teacher's `advanced/dashboard.rs`.

pub mod dashboard;
pub mod fleet;

pub use dashboard::Dashboard;
pub use fleet::{FleetState, FleetWatcher, TruckSnapshot};
