//! Interactive session over one grid

use scriptsheet_core::{CellAddress, Grid, GridOptions, PropagationStats, Value};
use scriptsheet_formula::parse_formula;
use tracing::debug;

use crate::command::{Command, Input};
use crate::error::CommandResult;
use crate::render::{render_dependencies, render_table};

/// Help text shown by `/help`
pub const HELP: &str = "\
Assign a cell:
  A1 = 42             number
  A2 = hello          text
  A3 = \"42\"           quoted text
  B1 = =SUM(A1:A3)    formula

Formulas:
  arithmetic          =A1 + 2 * (B1 - 1)
  reductions          =SUM(A1:B2)  PRODUCT  DIFF  AVERAGE (AVG)  CONCAT
  conditional         =IF(A1 > 0, \"yes\", \"no\")   > < = == != <> >= <=

Commands:
  /table              show the grid
  /dependencies       show cell links (alias /deps)
  /clear              clear the screen
  /help               show this help
  /quit               leave (alias /exit)
";

/// What the caller should show after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A cell was assigned; `table` is the redrawn grid
    Assigned {
        target: CellAddress,
        stats: PropagationStats,
        table: String,
    },
    /// Rendered grid
    Table(String),
    /// Rendered dependency listing
    Dependencies(String),
    /// Help text
    Help(&'static str),
    /// Clear the terminal
    Clear,
    /// End the session
    Quit,
    /// Nothing to show
    Nothing,
}

impl Outcome {
    /// Text to print, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Assigned { table, .. } => Some(table),
            Outcome::Table(text) | Outcome::Dependencies(text) => Some(text),
            Outcome::Help(text) => Some(text),
            Outcome::Clear | Outcome::Quit | Outcome::Nothing => None,
        }
    }
}

/// A grid plus the command language driving it
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
}

impl Session {
    /// Start a session on a fresh grid
    pub fn new(options: GridOptions) -> scriptsheet_core::Result<Self> {
        Ok(Self::with_grid(Grid::with_options(options)?))
    }

    /// Start a session on an existing grid
    pub fn with_grid(grid: Grid) -> Self {
        Self { grid }
    }

    /// Get the grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Give the grid back
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Parse and run one line
    ///
    /// A failing line leaves the grid untouched.
    pub fn execute(&mut self, line: &str) -> CommandResult<Outcome> {
        let command = Command::parse(line)?;
        self.run(command)
    }

    /// Run an already parsed command
    pub fn run(&mut self, command: Command) -> CommandResult<Outcome> {
        debug!(?command, "running command");

        match command {
            Command::Assign { target, input } => {
                let stats = self.assign(target, input)?;
                Ok(Outcome::Assigned {
                    target,
                    stats,
                    table: render_table(&self.grid.snapshot()),
                })
            }
            Command::Help => Ok(Outcome::Help(HELP)),
            Command::Table => Ok(Outcome::Table(render_table(&self.grid.snapshot()))),
            Command::Dependencies => Ok(Outcome::Dependencies(render_dependencies(&self.grid))),
            Command::Clear => Ok(Outcome::Clear),
            Command::Quit => Ok(Outcome::Quit),
            Command::Nothing => Ok(Outcome::Nothing),
        }
    }

    fn assign(&mut self, target: CellAddress, input: Input) -> CommandResult<PropagationStats> {
        // Reject targets outside the grid before parsing anything
        self.grid.cell(target)?;

        let stats = match input {
            Input::Literal(text) => self.grid.set_literal(target, &text)?,
            Input::Text(text) => self.grid.set_value(target, Value::Text(text))?,
            Input::Formula(text) => {
                let formula = parse_formula(&text, &self.grid)?;
                self.grid.set_formula(target, formula)?
            }
        };
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use scriptsheet_core::ErrorKind;

    fn session() -> Session {
        Session::new(GridOptions::default()).unwrap()
    }

    fn value(session: &Session, s: &str) -> Value {
        session
            .grid()
            .value(CellAddress::parse(s).unwrap())
            .unwrap()
            .clone()
    }

    #[test]
    fn test_assign_and_recalculate() {
        let mut session = session();
        session.execute("A1 = 3").unwrap();
        session.execute("B1 = 2").unwrap();
        session.execute("A2 = =SUM(A1, B1)").unwrap();
        assert_eq!(value(&session, "A2"), Value::Number(5.0));

        let outcome = session.execute("A1 = 4").unwrap();
        assert_eq!(value(&session, "A2"), Value::Number(6.0));
        match outcome {
            Outcome::Assigned { target, stats, table } => {
                assert_eq!(target, CellAddress::parse("A1").unwrap());
                assert_eq!(stats.recomputed, vec![CellAddress::parse("A2").unwrap()]);
                assert!(table.contains("| 6 |"));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_quoted_literal_stays_text() {
        let mut session = session();
        session.execute("A1 = \"42\"").unwrap();
        session.execute("A2 = 42").unwrap();
        assert_eq!(value(&session, "A1"), Value::text("42"));
        assert_eq!(value(&session, "A2"), Value::Number(42.0));

        session.execute("B1 = =A1 + 1").unwrap();
        assert_eq!(value(&session, "B1"), Value::Error(ErrorKind::InvalidOperand));
    }

    #[test]
    fn test_failed_formula_leaves_grid_untouched() {
        let mut session = session();
        session.execute("A1 = 1").unwrap();
        session.execute("B1 = =A1 * 2").unwrap();

        assert!(matches!(
            session.execute("B1 = =A1 +"),
            Err(CommandError::Formula(_))
        ));
        assert!(matches!(
            session.execute("B1 = =A9"),
            Err(CommandError::Formula(_))
        ));
        assert!(matches!(
            session.execute("E1 = 1"),
            Err(CommandError::Grid(_))
        ));

        assert_eq!(value(&session, "B1"), Value::Number(2.0));
        let b1 = session.grid().cell(CellAddress::parse("B1").unwrap()).unwrap();
        assert_eq!(b1.parents(), vec![CellAddress::parse("A1").unwrap()]);
    }

    #[test]
    fn test_slash_commands() {
        let mut session = session();
        assert_eq!(session.execute("/help").unwrap(), Outcome::Help(HELP));
        assert_eq!(session.execute("/clear").unwrap(), Outcome::Clear);
        assert_eq!(session.execute("/quit").unwrap(), Outcome::Quit);
        assert_eq!(session.execute("").unwrap(), Outcome::Nothing);
        assert_eq!(
            session.execute("/deps").unwrap(),
            Outcome::Dependencies("No dependencies\n".into())
        );
        match session.execute("/table").unwrap() {
            Outcome::Table(table) => assert!(table.contains("| A | B | C | D |")),
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_outcome_text() {
        assert_eq!(Outcome::Help(HELP).text(), Some(HELP));
        assert_eq!(Outcome::Quit.text(), None);
    }
}
