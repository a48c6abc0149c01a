pub mod data;
pub mod deduction;
pub mod knowledge;
pub mod llm;
pub mod media;
pub mod pages;
pub mod video;
