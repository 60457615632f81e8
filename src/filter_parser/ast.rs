/// Comparison operator of a binary relation
/// Both protocol versions spell these the same way (eq, ne, gt, ge, lt, le)
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CompareOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl CompareOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOperator::Equal => "eq",
            CompareOperator::NotEqual => "ne",
            CompareOperator::GreaterThan => "gt",
            CompareOperator::GreaterOrEqual => "ge",
            CompareOperator::LessThan => "lt",
            CompareOperator::LessOrEqual => "le",
        }
    }
}

/// A single binary relation: `Path op literal`
/// Example: SO_2_BP/CompanyName eq 'SAP'
#[derive(Debug, PartialEq, Clone)]
pub struct FilterExpression<'a> {
    /// Slash-separated property path, navigations included
    pub path: &'a str,
    pub operator: CompareOperator,
    /// Literal token exactly as written, quotes included for strings
    pub literal: &'a str,
}
