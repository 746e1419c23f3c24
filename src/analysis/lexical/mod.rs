pub mod block_tracker;
pub mod scanner;

pub use block_tracker::{BlockTracker, LineDepth, DEFAULT_TAB_WIDTH};
pub use scanner::{indent_width, scan_line, LexicalScanner, LineClass, ScanState, ScannedLine};
