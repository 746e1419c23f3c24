pub mod declarations;
pub mod lambda;
pub mod lines;
pub mod statements;

pub use declarations::{
    ClassCounter, ConstructorCounter, GetterSetterCounter, InterfaceParameterCounter, MethodCounter, ObjectKind,
    ObjectTypeClassifier,
};
pub use lambda::LambdaCounter;
pub use lines::{CommentLineCounter, CommentRatioCalculator, LineCounter};
pub use statements::{IfCounter, ImportCounter, LoopCounter};

use crate::analysis::lexical::{LexicalScanner, ScannedLine};
use crate::document::Document;

/// Scan every line of a document with its language profile.
pub(crate) fn scan(document: &Document) -> Vec<ScannedLine> {
    LexicalScanner::scan_all(document.language().profile(), document.lines())
}
