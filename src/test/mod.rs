pub mod registrations;
pub mod utils;

pub use utils::test_db as test_utils;
