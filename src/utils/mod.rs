pub mod layout_calculator;
pub mod traits;

#[cfg(test)]
pub(crate) mod synthetic_image;
