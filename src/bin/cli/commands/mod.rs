pub mod lessons;
pub mod progress;
pub mod review;
pub mod transfer;
