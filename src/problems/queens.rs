//! The N-Queens placement problem: one variable per row, holding the
//! queen's column.

use std::fmt::Write as _;

use crate::{
    error::Result,
    solver::{csp::Csp, expr::Var},
};

/// Builds the N-Queens problem: variables `x_i` in `[1, n]` give the
/// column of the queen on row `i`, with one enumerated constraint per row
/// pair forbidding shared columns and diagonals.
pub fn queens_csp(n: usize) -> Result<(Csp, Vec<Var>)> {
    let mut csp = Csp::new();
    let vars: Vec<Var> = (0..n)
        .map(|i| csp.add_variable(format!("x{}", i + 1), 1, n as i64))
        .collect::<Result<_>>()?;

    for i in 0..n {
        for j in (i + 1)..n {
            let row_gap = (j - i) as i64;
            csp.add_enumerated(vars[i], vars[j], move |a, b| {
                a != b && (a - b).abs() != row_gap
            })?;
        }
    }

    Ok((csp, vars))
}

/// Checks a placement without going through the solver: every row holds
/// a column in `[1, n]`, no two rows share a column or a diagonal.
pub fn verify_queens(assignments: &[Option<i64>]) -> bool {
    let n = assignments.len() as i64;
    let columns: Vec<i64> = match assignments.iter().copied().collect::<Option<Vec<i64>>>() {
        Some(columns) => columns,
        None => return false,
    };
    for (i, &a) in columns.iter().enumerate() {
        if a < 1 || a > n {
            return false;
        }
        for (j, &b) in columns.iter().enumerate().skip(i + 1) {
            if a == b || (a - b).abs() == (j - i) as i64 {
                return false;
            }
        }
    }
    true
}

/// Renders a placement as an ASCII board, one row per line.
pub fn render_board(assignments: &[Option<i64>]) -> String {
    let n = assignments.len() as i64;
    let mut board = String::new();
    for &row in assignments {
        for column in 1..=n {
            board.push_str(if row == Some(column) { "Q " } else { ". " });
        }
        let _ = writeln!(board);
    }
    board
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{queens_csp, render_board, verify_queens};
    use crate::solver::{
        heuristics::{value::ValueSelection, variable::VariableSelection},
        search::LookAhead,
    };

    const ALL_LOOK_AHEADS: [LookAhead; 4] =
        [LookAhead::Bt, LookAhead::Fc, LookAhead::Mac3, LookAhead::Mac4];

    #[test]
    fn the_classic_four_queens_solution_passes_the_checker() {
        assert!(verify_queens(&[Some(2), Some(4), Some(1), Some(3)]));
        assert!(verify_queens(&[Some(3), Some(1), Some(4), Some(2)]));
        // shared column
        assert!(!verify_queens(&[Some(2), Some(2), Some(4), Some(1)]));
        // shared diagonal
        assert!(!verify_queens(&[Some(1), Some(2), Some(4), Some(3)]));
        // incomplete
        assert!(!verify_queens(&[Some(1), None]));
    }

    #[test]
    fn four_queens_is_feasible_under_every_configuration() {
        let variable_selections = [
            VariableSelection::Arbitrary,
            VariableSelection::SmallestDomain,
            VariableSelection::MostConstrained,
            VariableSelection::DomOverConstr,
        ];
        let value_selections = [
            ValueSelection::Arbitrary,
            ValueSelection::Ascending,
            ValueSelection::Descending,
            ValueSelection::MostSupported,
        ];
        for look_ahead in ALL_LOOK_AHEADS {
            for variable_selection in variable_selections {
                for value_selection in value_selections {
                    let (mut csp, _) = queens_csp(4).unwrap();
                    csp.set_look_ahead(look_ahead);
                    csp.set_variable_selection(variable_selection);
                    csp.set_value_selection(value_selection);
                    assert!(
                        csp.solve().unwrap(),
                        "{look_ahead:?}/{variable_selection:?}/{value_selection:?} \
                         found no placement"
                    );
                    assert!(verify_queens(csp.assignments()));
                }
            }
        }
    }

    #[test]
    fn three_queens_is_infeasible() {
        for look_ahead in ALL_LOOK_AHEADS {
            let (mut csp, _) = queens_csp(3).unwrap();
            csp.set_look_ahead(look_ahead);
            assert!(!csp.solve().unwrap(), "{look_ahead:?} placed 3 queens");
            assert!(!csp.timed_out());
        }
    }

    #[test]
    fn eight_queens_is_feasible_and_verified() {
        let _ = tracing_subscriber::fmt::try_init();
        let (mut csp, _) = queens_csp(8).unwrap();
        csp.set_look_ahead(LookAhead::Fc);
        assert!(csp.solve().unwrap());
        assert!(csp.is_feasible());
        assert!(verify_queens(csp.assignments()));
    }

    #[test]
    fn the_board_shows_one_queen_per_row() {
        let board = render_board(&[Some(2), Some(4), Some(1), Some(3)]);
        let rows: Vec<&str> = board.lines().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].trim_end(), ". Q . .");
        assert_eq!(rows[2].trim_end(), "Q . . .");
        for row in rows {
            assert_eq!(row.matches('Q').count(), 1);
        }
    }
}
