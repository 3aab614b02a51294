pub mod flavours;
pub mod generate;
