pub mod mock;
pub mod traits;

pub use mock::MockVocab;
pub use traits::TokenVocab;
