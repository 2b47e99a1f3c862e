//! Item selection loop shown after the table.
//!
//! `N` prints details for item N, `oN` opens item N in the system browser,
//! an empty line exits.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use anyhow::Context;
use saletrack_core::SaleItem;

use crate::display;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Show(usize),
    Open(usize),
    Quit,
}

fn parse_action(input: &str, count: usize) -> Result<Action, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Action::Quit);
    }

    let (open, digits) = match input.strip_prefix(['o', 'O']) {
        Some(rest) => (true, rest.trim()),
        None => (false, input),
    };
    let number: usize = digits
        .parse()
        .map_err(|_| format!("'{input}' is not a number; enter N, oN or press Enter"))?;
    if number == 0 || number > count {
        return Err(format!("choose a number between 1 and {count}"));
    }

    Ok(if open {
        Action::Open(number)
    } else {
        Action::Show(number)
    })
}

/// Runs the prompt until the user enters an empty line or input ends.
pub(crate) fn run(
    items: &[SaleItem],
    mut input: impl BufRead,
    mut output: impl Write,
) -> anyhow::Result<()> {
    let mut line = String::new();
    loop {
        write!(
            output,
            "\nItem number for details, o<number> to open, Enter to quit: "
        )?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        match parse_action(&line, items.len()) {
            Ok(Action::Quit) => return Ok(()),
            Ok(Action::Show(number)) => {
                write!(output, "\n{}", display::render_details(number, &items[number - 1]))?;
            }
            Ok(Action::Open(number)) => {
                let item = &items[number - 1];
                match open_in_browser(&item.url) {
                    Ok(()) => writeln!(output, "Opened {}", item.url)?,
                    Err(e) => {
                        tracing::warn!(url = item.url.as_str(), error = %e, "browser launch failed");
                        writeln!(output, "Could not open browser: {e}")?;
                    }
                }
            }
            Err(message) => writeln!(output, "{message}")?,
        }
    }
}

fn browser_command(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(url);
        command
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}

fn open_in_browser(url: &str) -> anyhow::Result<()> {
    let mut command = browser_command(url);
    let program = command.get_program().to_string_lossy().into_owned();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch {program}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rust_decimal::Decimal;

    use super::*;

    fn items() -> Vec<SaleItem> {
        ["Mackinaw Wool Cruiser", "Tin Cloth Vest"]
            .iter()
            .map(|name| SaleItem {
                name: (*name).to_owned(),
                url: format!(
                    "https://www.filson.com/products/{}",
                    name.to_lowercase().replace(' ', "-")
                ),
                sale_price: Decimal::new(3570, 2),
                original_price: Some(Decimal::new(11900, 2)),
                discount_percent: 70,
                amount_saved: Decimal::new(8330, 2),
                sizes: vec!["XL".to_owned()],
                website: "Filson".to_owned(),
                image_url: None,
            })
            .collect()
    }

    #[test]
    fn parses_number_as_show() {
        assert_eq!(parse_action("2\n", 5), Ok(Action::Show(2)));
    }

    #[test]
    fn parses_o_prefix_as_open() {
        assert_eq!(parse_action("o3", 5), Ok(Action::Open(3)));
        assert_eq!(parse_action("O 1", 5), Ok(Action::Open(1)));
    }

    #[test]
    fn empty_input_quits() {
        assert_eq!(parse_action("\n", 5), Ok(Action::Quit));
        assert_eq!(parse_action("   ", 5), Ok(Action::Quit));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(parse_action("0", 5).is_err());
        assert!(parse_action("6", 5).unwrap_err().contains("between 1 and 5"));
        assert!(parse_action("abc", 5).unwrap_err().contains("not a number"));
        assert!(parse_action("o", 5).is_err());
    }

    #[test]
    fn loop_shows_details_then_quits() {
        let mut output = Vec::new();
        run(&items(), Cursor::new("2\n\n"), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("#2 Tin Cloth Vest"));
        assert!(text.contains("https://www.filson.com/products/tin-cloth-vest"));
    }

    #[test]
    fn loop_reports_invalid_input_and_continues() {
        let mut output = Vec::new();
        run(&items(), Cursor::new("9\n1\n"), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("choose a number between 1 and 2"));
        assert!(text.contains("#1 Mackinaw Wool Cruiser"));
    }

    #[test]
    fn loop_ends_at_end_of_input() {
        let mut output = Vec::new();
        run(&items(), Cursor::new(""), &mut output).unwrap();
        assert!(String::from_utf8(output).unwrap().contains("Enter to quit"));
    }

    #[test]
    fn browser_command_passes_url() {
        let command = browser_command("https://www.filson.com/products/x");
        assert!(command
            .get_args()
            .any(|arg| arg == "https://www.filson.com/products/x"));
    }
}
