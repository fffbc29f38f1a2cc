mod common;
mod filter_tests;
mod watermark_tests;
