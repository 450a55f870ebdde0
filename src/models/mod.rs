pub mod stock;
pub mod notice;
pub mod response;

pub use stock::*;
pub use notice::*;
pub use response::*;
