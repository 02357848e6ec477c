pub mod clothing;
pub mod color;
pub mod face;
pub mod harmony;
pub mod image;
pub mod orchestration;
