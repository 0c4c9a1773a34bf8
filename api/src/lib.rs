pub mod address;
pub mod asset;
mod codec;
pub mod consts;
pub mod error;
pub mod estimate;
pub mod math;
pub mod message;
pub mod params;
pub mod pool_key;
pub mod sdk;
pub mod state;

pub mod prelude {
    pub use crate::address::*;
    pub use crate::asset::*;
    pub use crate::consts::*;
    pub use crate::error::*;
    pub use crate::estimate::*;
    pub use crate::message::*;
    pub use crate::params::*;
    pub use crate::pool_key::*;
    pub use crate::sdk::*;
    pub use crate::state::*;
}
