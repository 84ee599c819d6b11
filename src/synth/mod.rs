//! Explosion synthesis
//!
//! Parameters, layer synthesis and the staged composer that turns an
//! [`ExplosionDef`] into a finished mono buffer.

pub mod composer;
pub mod def;
pub mod layer;

pub use composer::{ExplosionComposer, Stage};
pub use def::{ExplosionDef, MAX_LAYERS};
pub use layer::{make_explosion, make_layer, LayerShape};
