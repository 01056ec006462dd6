/// Rendering layer: every function here draws from `DashboardState` and
/// only mutates it through its methods.
pub mod panels;
pub mod plot;
pub mod table;
