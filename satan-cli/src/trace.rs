use anyhow::{bail, Context, Result};
use satan_core::{MatrixSnapshot, COLS, ROWS};

/// Switches held closed for a number of consecutive scan passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    pub closed: MatrixSnapshot,
    pub repeat: u32,
    /// Source line, 1-based.
    pub line: usize,
}

/// Parse a scan trace.
///
/// One scan pass per line: whitespace separated `row,col` positions that are
/// pressed, or `-` when nothing is. A trailing `*N` token repeats the line for
/// `N` passes. Everything after `#` is a comment.
///
/// ```text
/// # tap (2,3)
/// 2,3 *5
/// -   *5
/// ```
pub fn parse_trace(input: &str) -> Result<Vec<TraceStep>> {
    let mut steps = Vec::new();

    for (line_num, line) in input.lines().enumerate() {
        let line_num = line_num + 1;
        let line = match line.find('#') {
            Some(i) => &line[..i],
            None => line,
        };
        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let mut repeat = 1;
        if let Some(count) = tokens.last().and_then(|t| t.strip_prefix('*')) {
            repeat = count
                .parse::<u32>()
                .with_context(|| format!("line {}: invalid repeat count '{}'", line_num, count))?;
            if repeat == 0 {
                bail!("line {}: repeat count must be at least 1", line_num);
            }
            tokens.pop();
        }

        let mut closed = [0; ROWS];
        match tokens.as_slice() {
            [] => bail!("line {}: repeat without positions, use '-' for none", line_num),
            ["-"] => {}
            positions => {
                for token in positions {
                    let (row, col) = parse_position(token)
                        .with_context(|| format!("line {}: bad position '{}'", line_num, token))?;
                    closed[row] |= 1 << col;
                }
            }
        }

        steps.push(TraceStep {
            closed,
            repeat,
            line: line_num,
        });
    }

    if steps.is_empty() {
        bail!("trace contains no scan passes");
    }
    Ok(steps)
}

fn parse_position(token: &str) -> Result<(usize, usize)> {
    let Some((row, col)) = token.split_once(',') else {
        bail!("expected row,col");
    };
    let row: usize = row.trim().parse().context("invalid row")?;
    let col: usize = col.trim().parse().context("invalid column")?;
    if row >= ROWS {
        bail!("row {} out of range (0..{})", row, ROWS);
    }
    if col >= COLS {
        bail!("column {} out of range (0..{})", col, COLS);
    }
    Ok((row, col))
}

/// Total number of scan passes in a trace.
pub fn total_passes(steps: &[TraceStep]) -> u64 {
    steps.iter().map(|s| u64::from(s.repeat)).sum()
}
