pub mod factory;
pub mod parsers;
pub mod traits;

pub use factory::{ParserFactory, PooledParser, ReasoningParserType};
pub use parsers::Ernie45Parser;
pub use traits::{ParseError, ParserResult, ReasoningParser, StreamPhase, StreamingContext};
