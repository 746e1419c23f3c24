use serde::{Deserialize, Serialize};
use std::fmt;

/// Every metric the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    LineCount,
    CommentLineCount,
    CommentRatio,
    CodeDuplication,
    CodeDuplicationV2,
    NestingDepth,
    IfCount,
    LoopCount,
    ImportCount,
    ClassCount,
    MethodCount,
    LambdaCount,
    AverageMethodSize,
    Cohesion,
    CognitiveComplexity,
    ConstructorCount,
    GetterSetterCount,
    ObjectType,
    InterfaceConstructorParameters,
}

impl MetricKind {
    pub const ALL: [MetricKind; 19] = [
        MetricKind::LineCount,
        MetricKind::CommentLineCount,
        MetricKind::CommentRatio,
        MetricKind::CodeDuplication,
        MetricKind::CodeDuplicationV2,
        MetricKind::NestingDepth,
        MetricKind::IfCount,
        MetricKind::LoopCount,
        MetricKind::ImportCount,
        MetricKind::ClassCount,
        MetricKind::MethodCount,
        MetricKind::LambdaCount,
        MetricKind::AverageMethodSize,
        MetricKind::Cohesion,
        MetricKind::CognitiveComplexity,
        MetricKind::ConstructorCount,
        MetricKind::GetterSetterCount,
        MetricKind::ObjectType,
        MetricKind::InterfaceConstructorParameters,
    ];

    /// Stable identifier used on the command line and in JSON output.
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::LineCount => "line_count",
            MetricKind::CommentLineCount => "comment_line_count",
            MetricKind::CommentRatio => "comment_ratio",
            MetricKind::CodeDuplication => "code_duplication",
            MetricKind::CodeDuplicationV2 => "code_duplication_v2",
            MetricKind::NestingDepth => "nesting_depth",
            MetricKind::IfCount => "if_count",
            MetricKind::LoopCount => "loop_count",
            MetricKind::ImportCount => "import_count",
            MetricKind::ClassCount => "class_count",
            MetricKind::MethodCount => "method_count",
            MetricKind::LambdaCount => "lambda_count",
            MetricKind::AverageMethodSize => "average_method_size",
            MetricKind::Cohesion => "cohesion",
            MetricKind::CognitiveComplexity => "cognitive_complexity",
            MetricKind::ConstructorCount => "constructor_count",
            MetricKind::GetterSetterCount => "getter_setter_count",
            MetricKind::ObjectType => "object_type",
            MetricKind::InterfaceConstructorParameters => "interface_constructor_parameters",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::LineCount => "Line count",
            MetricKind::CommentLineCount => "Comment lines",
            MetricKind::CommentRatio => "Comment ratio (%)",
            MetricKind::CodeDuplication => "Duplicated code (%)",
            MetricKind::CodeDuplicationV2 => "Duplicated code, normalized (%)",
            MetricKind::NestingDepth => "Nesting depth",
            MetricKind::IfCount => "If statements",
            MetricKind::LoopCount => "Loops",
            MetricKind::ImportCount => "Imports",
            MetricKind::ClassCount => "Classes",
            MetricKind::MethodCount => "Methods",
            MetricKind::LambdaCount => "Lambda expressions",
            MetricKind::AverageMethodSize => "Average method size",
            MetricKind::Cohesion => "Method cohesion (%)",
            MetricKind::CognitiveComplexity => "Cognitive complexity",
            MetricKind::ConstructorCount => "Constructors",
            MetricKind::GetterSetterCount => "Getters and setters",
            MetricKind::ObjectType => "Object type",
            MetricKind::InterfaceConstructorParameters => "Interface constructor parameters",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_parse_back() {
        let names: HashSet<&str> = MetricKind::ALL.iter().map(|kind| kind.name()).collect();
        assert_eq!(names.len(), MetricKind::ALL.len());
        for kind in MetricKind::ALL {
            assert_eq!(MetricKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(MetricKind::from_name("halstead"), None);
    }
}
