pub mod fetcher;
pub mod ocr;
pub mod pipeline;
pub mod seafile;
