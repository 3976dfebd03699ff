use std::fs;
use std::io::Read as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use desminado_core::{
    infer, Board, CellMark, Classification, Coord, Variant, CODE_CLUE_UNREAD, CODE_FLAGGED,
    CODE_UNKNOWN,
};

/// Classify the provably safe and provably mined cells of a partially
/// observed board.
///
/// Sketch cells are `.` (unknown), `F` (flagged), `?` (a clue whose value was
/// never read) and the digits 0-8, separated by whitespace or written as one
/// token per row.
#[derive(Debug, Parser)]
#[command(name = "desminado", version, about)]
struct Cli {
    /// Board sketch file, `-` for stdin.
    board: PathBuf,

    /// Adjacency rule: standard, knight, manhattan, parity or cross.
    #[arg(short = 'r', long, default_value = "standard")]
    variant: String,

    /// Total number of mines, when known. With --json this overrides the
    /// snapshot's own budget.
    #[arg(short, long)]
    mines: Option<u16>,

    /// Parse the input as a JSON board snapshot instead of a sketch. The
    /// snapshot carries its own variant, so --variant is ignored.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let text = read_input(&cli.board)?;

    let board = if cli.json {
        let mut board: Board =
            serde_json::from_str(&text).context("parsing JSON board snapshot")?;
        if cli.mines.is_some() {
            board.set_mine_budget(cli.mines);
        }
        board
    } else {
        let variant: Variant = cli.variant.parse()?;
        parse_sketch(&text, variant, cli.mines)?
    };

    log::info!(
        "classifying a {}x{} {} board, {} unresolved cells",
        board.rows(),
        board.cols(),
        board.variant(),
        board.unresolved_count()
    );

    let classification = infer(&board)?;
    print_report(&board, &classification);
    Ok(())
}

fn read_input(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading board from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn parse_sketch(text: &str, variant: Variant, mines: Option<u16>) -> anyhow::Result<Board> {
    let mut rows: Vec<Vec<i8>> = Vec::new();

    for (line_index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<String> = if line.contains(char::is_whitespace) {
            line.split_whitespace().map(str::to_owned).collect()
        } else {
            line.chars().map(String::from).collect()
        };

        let mut row = Vec::with_capacity(tokens.len());
        for token in tokens {
            row.push(parse_cell_token(&token).with_context(|| {
                format!("line {}: unrecognized cell `{token}`", line_index + 1)
            })?);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        bail!("board sketch contains no cells");
    }
    let cols = rows[0].len();
    if rows.iter().any(|row| row.len() != cols) {
        bail!("board sketch rows differ in length");
    }
    if rows.len() > usize::from(Coord::MAX) || cols > usize::from(Coord::MAX) {
        bail!("board sketch exceeds {} rows or columns", Coord::MAX);
    }

    let size = (rows.len() as Coord, cols as Coord);
    let codes: Vec<i8> = rows.into_iter().flatten().collect();
    Ok(Board::from_codes(size, variant, mines, &codes)?)
}

fn parse_cell_token(token: &str) -> anyhow::Result<i8> {
    match token {
        "." => Ok(CODE_UNKNOWN),
        "F" | "f" => Ok(CODE_FLAGGED),
        "?" => Ok(CODE_CLUE_UNREAD),
        _ => {
            let value: i8 = token.parse()?;
            if !(0..=8).contains(&value) {
                bail!("clue values go 0..=8");
            }
            Ok(value)
        }
    }
}

fn print_report(board: &Board, classification: &Classification) {
    for row in 0..board.rows() {
        let mut line = String::new();
        for col in 0..board.cols() {
            if col > 0 {
                line.push(' ');
            }
            line.push(cell_symbol(board, classification, (row, col)));
        }
        println!("{line}");
    }

    if classification.is_empty() {
        println!("no cell is forced either way");
        return;
    }

    if !classification.proven_safe.is_empty() {
        println!("proven safe: {}", format_cells(&classification.proven_safe));
    }
    if !classification.proven_mine.is_empty() {
        println!("proven mine: {}", format_cells(&classification.proven_mine));
    }
}

fn cell_symbol(board: &Board, classification: &Classification, pos: (Coord, Coord)) -> char {
    match board[pos] {
        CellMark::Unknown if classification.proven_mine.contains(&pos) => 'M',
        CellMark::Unknown if classification.proven_safe.contains(&pos) => 'S',
        CellMark::Unknown => '.',
        CellMark::Flagged => 'F',
        CellMark::ClueUnread => '?',
        CellMark::Clue(count) => char::from(b'0' + count),
    }
}

fn format_cells(cells: &std::collections::BTreeSet<(Coord, Coord)>) -> String {
    cells
        .iter()
        .map(|(row, col)| format!("({row}, {col})"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sketch_tokens_cover_every_mark() {
        let board = parse_sketch(". F ? 3\n. . . .\n", Variant::Standard, None).unwrap();
        assert_eq!(board.size(), (2, 4));
        assert_eq!(board[(0, 0)], CellMark::Unknown);
        assert_eq!(board[(0, 1)], CellMark::Flagged);
        assert_eq!(board[(0, 2)], CellMark::ClueUnread);
        assert_eq!(board[(0, 3)], CellMark::Clue(3));
    }

    #[test]
    fn compact_rows_parse_one_char_per_cell() {
        let board = parse_sketch("..F\n?18\n", Variant::Cross, Some(3)).unwrap();
        assert_eq!(board.size(), (2, 3));
        assert_eq!(board[(1, 2)], CellMark::Clue(8));
        assert_eq!(board.mine_budget(), Some(3));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let board = parse_sketch("# header\n\n. .\n. .\n", Variant::Standard, None).unwrap();
        assert_eq!(board.size(), (2, 2));
    }

    #[test]
    fn ragged_sketches_are_rejected() {
        assert!(parse_sketch(". .\n.\n", Variant::Standard, None).is_err());
        assert!(parse_sketch("", Variant::Standard, None).is_err());
        assert!(parse_sketch("9\n", Variant::Standard, None).is_err());
    }
}
