//! Box construction: fonts, glue and the lowering of atoms into positioned boxes.

pub mod environment;
pub mod font;
pub mod font_registry;
pub mod glue;
mod layout;
pub mod math_box;
mod multiscripts;
pub mod stretchy;

pub use self::environment::StyleEnvironment;
pub use self::font_registry::{FontRegistry, GeneralSettings, MathConstant};
pub use self::glue::{GlueAmount, GlueEngine, GlueRule};
pub use self::layout::MathBoxLayout;
