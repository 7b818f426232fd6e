pub mod numbers;
pub mod sampling;
pub mod util;
pub mod vector;
