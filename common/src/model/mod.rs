pub mod address;
pub mod owner;
pub mod pdf_form;
pub mod prospect;
pub mod signature;
pub mod template;
pub mod testing;
