//! Formula expression types

use std::fmt;

use ahash::AHashSet;

use crate::cell::{CellAddress, Value};

/// Formula expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// Constant value
    Literal(Value),

    /// Value of another cell, passed through as-is
    CellRef(CellAddress),

    /// Reduction over an ordered list of cells
    Range { op: RangeOp, cells: Vec<CellAddress> },

    /// Arithmetic chain: `left op right` followed by more `op operand` pairs
    Arithmetic {
        left: Box<Formula>,
        op: ArithOp,
        right: Box<Formula>,
        tail: Vec<(ArithOp, Formula)>,
    },

    /// `IF(lhs cmp rhs, then_branch, else_branch)`
    Conditional {
        lhs: Box<Formula>,
        cmp: Comparator,
        rhs: Box<Formula>,
        then_branch: Box<Formula>,
        else_branch: Box<Formula>,
    },
}

impl Formula {
    /// Constant formula
    pub fn literal<V: Into<Value>>(value: V) -> Self {
        Formula::Literal(value.into())
    }

    /// Reference to a single cell
    pub fn cell(addr: CellAddress) -> Self {
        Formula::CellRef(addr)
    }

    /// Reduction over `cells`
    pub fn range(op: RangeOp, cells: Vec<CellAddress>) -> Self {
        Formula::Range { op, cells }
    }

    pub fn sum(cells: Vec<CellAddress>) -> Self {
        Self::range(RangeOp::Sum, cells)
    }

    pub fn product(cells: Vec<CellAddress>) -> Self {
        Self::range(RangeOp::Product, cells)
    }

    pub fn difference(cells: Vec<CellAddress>) -> Self {
        Self::range(RangeOp::Difference, cells)
    }

    pub fn average(cells: Vec<CellAddress>) -> Self {
        Self::range(RangeOp::Average, cells)
    }

    pub fn concat(cells: Vec<CellAddress>) -> Self {
        Self::range(RangeOp::Concat, cells)
    }

    /// Binary arithmetic `left op right`
    pub fn arithmetic(left: Formula, op: ArithOp, right: Formula) -> Self {
        Formula::Arithmetic {
            left: Box::new(left),
            op,
            right: Box::new(right),
            tail: Vec::new(),
        }
    }

    /// Build an arithmetic chain from its first operand and the following
    /// `(operator, operand)` pairs
    ///
    /// An empty chain is just `first`.
    pub fn chain(first: Formula, rest: Vec<(ArithOp, Formula)>) -> Self {
        let mut rest = rest.into_iter();
        match rest.next() {
            None => first,
            Some((op, right)) => Formula::Arithmetic {
                left: Box::new(first),
                op,
                right: Box::new(right),
                tail: rest.collect(),
            },
        }
    }

    /// `IF(lhs cmp rhs, then_branch, else_branch)`
    pub fn conditional(
        lhs: Formula,
        cmp: Comparator,
        rhs: Formula,
        then_branch: Formula,
        else_branch: Formula,
    ) -> Self {
        Formula::Conditional {
            lhs: Box::new(lhs),
            cmp,
            rhs: Box::new(rhs),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// Every cell referenced anywhere in this formula
    ///
    /// This becomes the parent set of the cell the formula is assigned to.
    /// Both branches of a conditional count, whichever one is taken.
    pub fn depends_on(&self) -> AHashSet<CellAddress> {
        let mut refs = AHashSet::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut AHashSet<CellAddress>) {
        match self {
            Formula::Literal(_) => {}
            Formula::CellRef(addr) => {
                refs.insert(*addr);
            }
            Formula::Range { cells, .. } => refs.extend(cells.iter().copied()),
            Formula::Arithmetic {
                left, right, tail, ..
            } => {
                left.collect_references(refs);
                right.collect_references(refs);
                for (_, operand) in tail {
                    operand.collect_references(refs);
                }
            }
            Formula::Conditional {
                lhs,
                rhs,
                then_branch,
                else_branch,
                ..
            } => {
                lhs.collect_references(refs);
                rhs.collect_references(refs);
                then_branch.collect_references(refs);
                else_branch.collect_references(refs);
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Arithmetic { .. } => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Literal(Value::Text(s)) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            Formula::Literal(v) => write!(f, "{}", v),
            Formula::CellRef(addr) => write!(f, "{}", addr),
            Formula::Range { op, cells } => {
                write!(f, "{}(", op.name())?;
                for (i, addr) in cells.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", addr)?;
                }
                write!(f, ")")
            }
            Formula::Arithmetic {
                left,
                op,
                right,
                tail,
            } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f)?;
                for (op, operand) in tail {
                    write!(f, " {} ", op.symbol())?;
                    operand.fmt_operand(f)?;
                }
                Ok(())
            }
            Formula::Conditional {
                lhs,
                cmp,
                rhs,
                then_branch,
                else_branch,
            } => write!(
                f,
                "IF({} {} {}, {}, {})",
                lhs,
                cmp.symbol(),
                rhs,
                then_branch,
                else_branch
            ),
        }
    }
}

/// Reductions applied by [`Formula::Range`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOp {
    Sum,
    Product,
    /// First value minus each of the following, left to right
    Difference,
    Average,
    /// Joins the display text of every value
    Concat,
}

impl RangeOp {
    /// Get the function name used in formula text
    pub fn name(&self) -> &'static str {
        match self {
            RangeOp::Sum => "SUM",
            RangeOp::Product => "PRODUCT",
            RangeOp::Difference => "DIFF",
            RangeOp::Average => "AVERAGE",
            RangeOp::Concat => "CONCAT",
        }
    }

    /// Look up a reduction by function name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "SUM" => Some(RangeOp::Sum),
            "PRODUCT" => Some(RangeOp::Product),
            "DIFF" | "DIFFERENCE" => Some(RangeOp::Difference),
            "AVERAGE" | "AVG" => Some(RangeOp::Average),
            "CONCAT" => Some(RangeOp::Concat),
            _ => None,
        }
    }
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithOp {
    pub fn symbol(&self) -> char {
        match self {
            ArithOp::Add => '+',
            ArithOp::Subtract => '-',
            ArithOp::Multiply => '*',
            ArithOp::Divide => '/',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(ArithOp::Add),
            '-' => Some(ArithOp::Subtract),
            '*' => Some(ArithOp::Multiply),
            '/' => Some(ArithOp::Divide),
            _ => None,
        }
    }
}

/// Comparison operators used by [`Formula::Conditional`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Greater,
    Less,
    Equal,
    NotEqual,
    GreaterEqual,
    LessEqual,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Greater => ">",
            Comparator::Less => "<",
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::GreaterEqual => ">=",
            Comparator::LessEqual => "<=",
        }
    }

    /// Parse a comparator; `=` and `<>` are accepted as spreadsheet spellings
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            ">" => Some(Comparator::Greater),
            "<" => Some(Comparator::Less),
            "==" | "=" => Some(Comparator::Equal),
            "!=" | "<>" => Some(Comparator::NotEqual),
            ">=" => Some(Comparator::GreaterEqual),
            "<=" => Some(Comparator::LessEqual),
            _ => None,
        }
    }

    /// Whether the comparator only asks about equality
    pub fn is_equality(&self) -> bool {
        matches!(self, Comparator::Equal | Comparator::NotEqual)
    }
}
