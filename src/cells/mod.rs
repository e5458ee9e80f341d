//! Cell scale models.

pub mod pc2015_masoli;
pub use pc2015_masoli::{PurkinjeCell, PurkinjeCellOptions, ModelState};

/// Scale name of every model in this module
pub const MODEL_SCALE: &str = "cells";
