// Interactive lookup session

use std::io::{self, BufRead, Write};

use torent_engine::{QueryOptions, TimelineView};
use torent_io::Catalog;

use crate::render;

const HELP: &str = "\
Enter an address to look it up.
  <number>              look up a suggestion from the last result
  :view yearly|monthly  switch the timeline view
  :help                 show this help
  :quit                 leave the session";

enum Input<'a> {
    Blank,
    Query(String),
    View(&'a str),
    Help,
    Quit,
    Unknown(&'a str),
}

fn classify<'a>(line: &'a str, suggestions: &[String]) -> Input<'a> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Blank;
    }
    if let Some(command) = line.strip_prefix(':') {
        let mut parts = command.split_whitespace();
        return match (parts.next(), parts.next()) {
            (Some("q" | "quit" | "exit"), None) => Input::Quit,
            (Some("h" | "help"), None) => Input::Help,
            (Some("view"), Some(view)) => Input::View(view),
            _ => Input::Unknown(line),
        };
    }
    // A number picks a suggestion; out-of-range numbers are ordinary queries
    if let Ok(n) = line.parse::<usize>() {
        if let Some(picked) = n.checked_sub(1).and_then(|i| suggestions.get(i)) {
            return Input::Query(picked.clone());
        }
    }
    Input::Query(line.to_string())
}

/// Read queries line by line until `:quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    catalog: &Catalog,
    mut options: QueryOptions,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    let mut suggestions: Vec<String> = Vec::new();
    writeln!(out, "Toronto Highrise Safety Check (:help for commands)")?;

    let mut lines = input.lines();
    loop {
        write!(out, "address> ")?;
        out.flush()?;
        let Some(line) = lines.next().transpose()? else {
            writeln!(out)?;
            break;
        };

        match classify(&line, &suggestions) {
            Input::Blank => {}
            Input::Quit => break,
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Unknown(command) => writeln!(out, "unknown command '{command}' (try :help)")?,
            Input::View(view) => match view.parse::<TimelineView>() {
                Ok(view) => {
                    options.view = view;
                    writeln!(out, "timeline view: {view}")?;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            Input::Query(query) => {
                if let Some(report) = catalog.search(&query, &options) {
                    render::report(out, &report)?;
                    suggestions = report.suggestions();
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sugg() -> Vec<String> {
        vec!["1 KING ST W".to_string(), "1 KING ST E".to_string()]
    }

    #[test]
    fn number_picks_suggestion() {
        match classify(" 2 ", &sugg()) {
            Input::Query(q) => assert_eq!(q, "1 KING ST E"),
            _ => panic!("expected query"),
        }
    }

    #[test]
    fn out_of_range_number_is_a_query() {
        match classify("3", &sugg()) {
            Input::Query(q) => assert_eq!(q, "3"),
            _ => panic!("expected query"),
        }
        assert!(matches!(classify("0", &[]), Input::Query(_)));
    }

    #[test]
    fn commands() {
        assert!(matches!(classify(":quit", &[]), Input::Quit));
        assert!(matches!(classify(":q", &[]), Input::Quit));
        assert!(matches!(classify(":view monthly", &[]), Input::View("monthly")));
        assert!(matches!(classify(":view", &[]), Input::Unknown(_)));
        assert!(matches!(classify("   ", &[]), Input::Blank));
    }
}
