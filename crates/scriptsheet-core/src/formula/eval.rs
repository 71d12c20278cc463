//! Formula evaluator

use super::ast::{ArithOp, Comparator, Formula, RangeOp};
use crate::cell::{CellAddress, ErrorKind, Value};

type EvalResult<T> = std::result::Result<T, ErrorKind>;

/// Read access to cell values during evaluation
pub trait ValueLookup {
    /// Get the current value at `addr`, or `None` if there is no such cell
    fn lookup(&self, addr: CellAddress) -> Option<&Value>;
}

impl Formula {
    /// Evaluate against current cell values
    ///
    /// This is the one place evaluation failures are caught: they come back
    /// as [`Value::Error`], never as a panic or a `Result`.
    pub fn evaluate<L: ValueLookup + ?Sized>(&self, cells: &L) -> Value {
        self.try_evaluate(cells).unwrap_or_else(Value::Error)
    }

    fn try_evaluate<L: ValueLookup + ?Sized>(&self, cells: &L) -> EvalResult<Value> {
        match self {
            Formula::Literal(value) => Ok(value.clone()),
            Formula::CellRef(addr) => lookup(cells, *addr).cloned(),
            Formula::Range { op, cells: refs } => reduce(*op, refs, cells),
            Formula::Arithmetic {
                left,
                op,
                right,
                tail,
            } => {
                let first = number(&left.try_evaluate(cells)?)?;
                let mut rest = Vec::with_capacity(tail.len() + 1);
                rest.push((*op, number(&right.try_evaluate(cells)?)?));
                for (op, operand) in tail {
                    rest.push((*op, number(&operand.try_evaluate(cells)?)?));
                }
                apply_chain(first, &rest).map(Value::Number)
            }
            Formula::Conditional {
                lhs,
                cmp,
                rhs,
                then_branch,
                else_branch,
            } => {
                let lhs = lhs.try_evaluate(cells)?;
                let rhs = rhs.try_evaluate(cells)?;
                if compare(*cmp, &lhs, &rhs)? {
                    then_branch.try_evaluate(cells)
                } else {
                    else_branch.try_evaluate(cells)
                }
            }
        }
    }
}

fn lookup<L: ValueLookup + ?Sized>(cells: &L, addr: CellAddress) -> EvalResult<&Value> {
    cells.lookup(addr).ok_or(ErrorKind::InvalidOperand)
}

fn number(value: &Value) -> EvalResult<f64> {
    value.as_number().ok_or(ErrorKind::InvalidOperand)
}

fn reduce<L: ValueLookup + ?Sized>(
    op: RangeOp,
    refs: &[CellAddress],
    cells: &L,
) -> EvalResult<Value> {
    let numbers = || {
        refs.iter()
            .map(|addr| lookup(cells, *addr).and_then(number))
            .collect::<EvalResult<Vec<f64>>>()
    };

    let result: f64 = match op {
        RangeOp::Concat => {
            let mut joined = String::new();
            for addr in refs {
                match lookup(cells, *addr)? {
                    Value::Error(_) => return Err(ErrorKind::InvalidOperand),
                    value => joined.push_str(&value.to_string()),
                }
            }
            return Ok(Value::Text(joined));
        }
        RangeOp::Sum => numbers()?.iter().sum(),
        RangeOp::Product => numbers()?.iter().product(),
        RangeOp::Difference => match numbers()?.split_first() {
            Some((first, rest)) => rest.iter().fold(*first, |acc, n| acc - n),
            None => 0.0,
        },
        RangeOp::Average => {
            let numbers = numbers()?;
            if numbers.is_empty() {
                return Err(ErrorKind::DivideByZero);
            }
            numbers.iter().sum::<f64>() / numbers.len() as f64
        }
    };

    finite(result).map(Value::Number)
}

/// Overflow (and the NaN it can lead to) is an invalid operand, not a number
fn finite(n: f64) -> EvalResult<f64> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ErrorKind::InvalidOperand)
    }
}

/// Apply an operator chain, `*` and `/` binding tighter than `+` and `-`,
/// left to right within each level
fn apply_chain(first: f64, rest: &[(ArithOp, f64)]) -> EvalResult<f64> {
    let mut total = 0.0;
    let mut term = first;

    for &(op, n) in rest {
        match op {
            ArithOp::Add => {
                total += term;
                term = n;
            }
            ArithOp::Subtract => {
                total += term;
                term = -n;
            }
            ArithOp::Multiply => term *= n,
            ArithOp::Divide => {
                if n == 0.0 {
                    return Err(ErrorKind::DivideByZero);
                }
                term /= n;
            }
        }
    }

    finite(total + term)
}

fn compare(cmp: Comparator, lhs: &Value, rhs: &Value) -> EvalResult<bool> {
    match (lhs, rhs) {
        (Value::Error(_), _) | (_, Value::Error(_)) => Err(ErrorKind::InvalidOperand),
        (Value::Number(a), Value::Number(b)) => Ok(match cmp {
            Comparator::Greater => a > b,
            Comparator::Less => a < b,
            Comparator::Equal => a == b,
            Comparator::NotEqual => a != b,
            Comparator::GreaterEqual => a >= b,
            Comparator::LessEqual => a <= b,
        }),
        _ if cmp.is_equality() => {
            let equal = lhs.to_string() == rhs.to_string();
            Ok(if cmp == Comparator::Equal { equal } else { !equal })
        }
        _ => Err(ErrorKind::InvalidOperand),
    }
}
