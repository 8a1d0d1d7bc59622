//! Domain model types

pub mod axis;
pub mod scale;
pub mod worklist;

pub use axis::{AxisChoice, AxisFamily, AxisPair, HorizontalOrientation, VerticalOrientation};
pub use scale::ScalingFactor;
pub use worklist::Worklist;
