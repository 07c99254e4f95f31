pub mod block;
pub mod estimate;
pub mod id;
pub mod paginate;
pub mod parser;

pub use block::{Block, BlockKind, HeadingLevel, ImageSource, Page, SpacerSize};
pub use estimate::{estimate_block_height, estimate_text_height};
pub use id::{IdGenerator, SequentialIds, UuidIds};
pub use paginate::paginate;
pub use parser::{parse_to_blocks, parse_to_pages};
