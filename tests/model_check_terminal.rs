//! Exhaustive small-state model checker for terminal invariants.
//!
//! Enumerates all short byte-sequence operations on tiny terminals to prove
//! structural invariants (grid dimensions, cursor bounds, cell accessibility)
//! hold under all reachable states.

use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use vterm_core::Terminal;

#[derive(Clone, Eq, PartialEq)]
struct StateSnapshot {
    cells: Vec<char>,
    cursor_row: u16,
    cursor_col: u16,
}

impl Hash for StateSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cells.hash(state);
        self.cursor_row.hash(state);
        self.cursor_col.hash(state);
    }
}

fn snapshot(term: &Terminal) -> StateSnapshot {
    let (rows, cols) = (term.rows(), term.cols());
    let mut cells = Vec::with_capacity((rows * cols) as usize);
    for r in 0..rows {
        for c in 0..cols {
            cells.push(term.grid().cell(r, c).map_or('\0', |cell| cell.content()));
        }
    }
    let (cursor_row, cursor_col) = term.cursor_position();
    StateSnapshot {
        cells,
        cursor_row,
        cursor_col,
    }
}

fn restore(cols: u16, rows: u16, snap: &StateSnapshot) -> Terminal {
    let mut term = Terminal::new(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            let ch = snap.cells[(r * cols + c) as usize];
            if ch != ' ' && ch != '\0' {
                let mut bytes = Vec::new();
                bytes.extend_from_slice(format!("\x1b[{};{}H", r + 1, c + 1).as_bytes());
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                term.feed_bytes(&bytes);
            }
        }
    }
    term.feed_bytes(format!("\x1b[{};{}H", snap.cursor_row + 1, snap.cursor_col + 1).as_bytes());
    term
}

fn check_invariants(term: &Terminal, cols: u16, rows: u16) -> Result<(), String> {
    if term.cols() != cols {
        return Err(format!("cols changed: {} != {}", term.cols(), cols));
    }
    if term.rows() != rows {
        return Err(format!("rows changed: {} != {}", term.rows(), rows));
    }
    let (row, col) = term.cursor_position();
    if row >= rows {
        return Err(format!("cursor.row={row} >= rows={rows}"));
    }
    if col >= cols {
        return Err(format!("cursor.col={col} >= cols={cols}"));
    }
    for r in 0..rows {
        for c in 0..cols {
            if term.grid().cell(r, c).is_none() {
                return Err(format!("cell ({r}, {c}) not accessible"));
            }
        }
    }
    Ok(())
}

/// The operation alphabet for model checking: short byte sequences covering
/// printing, control codes, cursor motion, scrolling, and erasing.
fn operation_alphabet(cols: u16, rows: u16) -> Vec<&'static [u8]> {
    let mut ops: Vec<&'static [u8]> = vec![
        b"A",
        b"Z",
        b"\n",
        b"\r",
        b"\x1b[A",
        b"\x1b[B",
        b"\x1b[C",
        b"\x1b[D",
        b"\x1b[H",
        b"\x1b[S",
        b"\x1b[T",
        b"\x1b[L",
        b"\x1b[M",
        b"\x1b[@",
        b"\x1b[P",
        b"\x1b[0J",
        b"\x1b[1J",
        b"\x1b[2J",
        b"\x1b[0K",
        b"\x1b[1K",
        b"\x1b[2K",
        b"\x1bD",
        b"\x1bM",
        b"\x1bE",
        b"\x1bc",
    ];
    if rows >= 2 {
        ops.push(b"\x1b[1;2r");
    }
    if rows > 0 && cols > 0 {
        ops.push(b"\x1b[999;999H");
    }
    ops
}

struct ModelCheckResult {
    states_explored: usize,
    transitions: usize,
    max_depth: usize,
    violations: Vec<String>,
    duration: Duration,
}

fn model_check(cols: u16, rows: u16, max_depth: usize, time_limit: Duration) -> ModelCheckResult {
    let start = Instant::now();
    let ops = operation_alphabet(cols, rows);

    let mut visited: HashSet<StateSnapshot> = HashSet::new();
    let mut queue: VecDeque<(StateSnapshot, usize)> = VecDeque::new();
    let mut violations: Vec<String> = Vec::new();
    let mut transitions = 0usize;
    let mut max_depth_seen = 0usize;

    let initial = Terminal::new(rows, cols);
    if let Err(e) = check_invariants(&initial, cols, rows) {
        violations.push(format!("Initial state violation: {e}"));
    }
    let initial_snap = snapshot(&initial);
    visited.insert(initial_snap.clone());
    queue.push_back((initial_snap, 0));

    while let Some((snap, depth)) = queue.pop_front() {
        if start.elapsed() >= time_limit {
            break;
        }
        if depth >= max_depth {
            continue;
        }
        max_depth_seen = max_depth_seen.max(depth + 1);

        for op in &ops {
            let mut state = restore(cols, rows, &snap);
            state.feed_bytes(op);
            transitions += 1;

            if let Err(e) = check_invariants(&state, cols, rows) {
                violations.push(format!(
                    "Violation after {:?} at depth {}: {e}",
                    String::from_utf8_lossy(op),
                    depth + 1,
                ));
                if violations.len() >= 10 {
                    return ModelCheckResult {
                        states_explored: visited.len(),
                        transitions,
                        max_depth: max_depth_seen,
                        violations,
                        duration: start.elapsed(),
                    };
                }
            }

            let new_snap = snapshot(&state);
            if visited.insert(new_snap.clone()) {
                queue.push_back((new_snap, depth + 1));
            }
        }
    }

    ModelCheckResult {
        states_explored: visited.len(),
        transitions,
        max_depth: max_depth_seen,
        violations,
        duration: start.elapsed(),
    }
}

#[test]
fn model_check_2x2_depth4() {
    let result = model_check(2, 2, 4, Duration::from_secs(30));
    eprintln!(
        "[model-check 2x2 depth=4] states={} transitions={} depth={} violations={} time={:?}",
        result.states_explored,
        result.transitions,
        result.max_depth,
        result.violations.len(),
        result.duration
    );
    for v in &result.violations {
        eprintln!("  VIOLATION: {v}");
    }
    assert!(
        result.violations.is_empty(),
        "Model check found {} violations on 2x2 grid",
        result.violations.len()
    );
    assert!(
        result.states_explored > 20,
        "Too few states explored: {}",
        result.states_explored
    );
}

#[test]
fn model_check_2x2_deep_exploration() {
    let result = model_check(2, 2, 6, Duration::from_secs(60));
    eprintln!(
        "[model-check 2x2 depth=6] states={} transitions={} depth={} violations={} time={:?}",
        result.states_explored,
        result.transitions,
        result.max_depth,
        result.violations.len(),
        result.duration
    );
    for v in &result.violations {
        eprintln!("  VIOLATION: {v}");
    }
    assert!(
        result.violations.is_empty(),
        "Model check found {} violations on 2x2 grid at depth 6",
        result.violations.len()
    );
}

#[test]
fn model_check_3x3_depth3() {
    let result = model_check(3, 3, 3, Duration::from_secs(30));
    eprintln!(
        "[model-check 3x3 depth=3] states={} transitions={} depth={} violations={} time={:?}",
        result.states_explored,
        result.transitions,
        result.max_depth,
        result.violations.len(),
        result.duration
    );
    for v in &result.violations {
        eprintln!("  VIOLATION: {v}");
    }
    assert!(
        result.violations.is_empty(),
        "Model check found {} violations on 3x3 grid",
        result.violations.len()
    );
}

#[test]
fn model_check_4x3_depth3() {
    let result = model_check(4, 3, 3, Duration::from_secs(30));
    eprintln!(
        "[model-check 4x3 depth=3] states={} transitions={} depth={} violations={} time={:?}",
        result.states_explored,
        result.transitions,
        result.max_depth,
        result.violations.len(),
        result.duration
    );
    for v in &result.violations {
        eprintln!("  VIOLATION: {v}");
    }
    assert!(
        result.violations.is_empty(),
        "Model check found {} violations on 4x3 grid",
        result.violations.len()
    );
}

/// Coverage report: prints a summary of model check results across sizes.
#[test]
fn model_check_coverage_report() {
    let configs = vec![(2, 2, 4, 30), (3, 2, 3, 20), (2, 3, 3, 20), (3, 3, 3, 20)];

    let mut total_states = 0;
    let mut total_transitions = 0;
    let mut total_violations = 0;

    eprintln!("\n=== Terminal Model Check Coverage Report ===\n");
    for (cols, rows, depth, seconds) in configs {
        let result = model_check(cols, rows, depth, Duration::from_secs(seconds));
        eprintln!(
            "{}x{} depth={} states={} transitions={} violations={} time={:?}",
            cols,
            rows,
            result.max_depth,
            result.states_explored,
            result.transitions,
            result.violations.len(),
            result.duration
        );
        total_states += result.states_explored;
        total_transitions += result.transitions;
        total_violations += result.violations.len();
        for v in &result.violations {
            eprintln!("  VIOLATION [{cols}x{rows}]: {v}");
        }
    }

    eprintln!(
        "TOTAL: {} states, {} transitions, {} violations",
        total_states, total_transitions, total_violations
    );
    assert_eq!(
        total_violations, 0,
        "Model check found {total_violations} total violations"
    );
}
