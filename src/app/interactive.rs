//! Interactive prompting: URL entry, range selection and save path.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use edu_downloader::parser::{select_indices, split_url_list};
use edu_downloader::resolver::is_fetchable_url;

use crate::output::url_list_lines;

/// Default answer for the range selection prompt.
const SELECT_ALL: &str = "A";

/// One batch chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BatchRequest {
    pub urls: Vec<String>,
    pub target_dir: PathBuf,
}

/// Line-oriented prompter over any reader/writer pair.
///
/// End of input is treated as a request to exit.
pub(crate) struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub(crate) fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let Some(answer) = self.ask(&format!("{prompt} [{hint}]: "))? else {
                return Ok(default);
            };
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n")?,
            }
        }
    }

    /// Runs the menu until a batch is chosen; `None` means exit.
    pub(crate) fn next_batch(&mut self, default_output: &Path) -> io::Result<Option<BatchRequest>> {
        loop {
            self.say("\nChoose a mode:")?;
            self.say("1. Enter URLs")?;
            self.say("0. Exit")?;
            let Some(choice) = self.ask("Select: ")? else {
                return Ok(None);
            };
            match choice.as_str() {
                "0" => return Ok(None),
                "1" => {}
                _ => {
                    self.say("Invalid choice, enter 1 or 0")?;
                    continue;
                }
            }

            let Some(entered) = self.prompt_urls()? else {
                return Ok(None);
            };
            let Some(selected) = self.prompt_selection(&entered)? else {
                return Ok(None);
            };

            let urls: Vec<String> = selected
                .into_iter()
                .filter(|url| is_fetchable_url(url))
                .collect();
            if urls.is_empty() {
                self.say("No downloadable http(s) URL in the selection")?;
                continue;
            }

            let Some(target_dir) = self.prompt_save_path(default_output)? else {
                return Ok(None);
            };
            return Ok(Some(BatchRequest { urls, target_dir }));
        }
    }

    /// Asks whether to run another batch.
    pub(crate) fn ask_continue(&mut self) -> io::Result<bool> {
        self.confirm("\nContinue downloading?", true)
    }

    fn prompt_urls(&mut self) -> io::Result<Option<Vec<String>>> {
        loop {
            self.say("\nEnter URLs (comma separated):")?;
            let Some(line) = self.ask("> ")? else {
                return Ok(None);
            };
            let urls = split_url_list(&line);
            if !urls.is_empty() {
                for line in url_list_lines("Entered URLs", &urls) {
                    self.say(&line)?;
                }
                return Ok(Some(urls));
            }
            self.say("No URL entered, try again")?;
        }
    }

    fn prompt_selection(&mut self, urls: &[String]) -> io::Result<Option<Vec<String>>> {
        loop {
            self.say("\nSelect URLs to download (index or range, e.g. 1-3,5,7-9):")?;
            let Some(answer) = self.ask("Selection [all]: ")? else {
                return Ok(None);
            };
            let expression = if answer.is_empty() { SELECT_ALL } else { answer.as_str() };

            match select_indices(expression, urls.len()) {
                Ok(indices) if !indices.is_empty() => {
                    return Ok(Some(
                        indices
                            .iter()
                            .filter_map(|index| index.checked_sub(1).and_then(|i| urls.get(i)))
                            .cloned()
                            .collect(),
                    ));
                }
                _ => self.say("Invalid selection, try again")?,
            }
        }
    }

    fn prompt_save_path(&mut self, default_output: &Path) -> io::Result<Option<PathBuf>> {
        loop {
            self.say(&format!("\nSave path (default: {})", default_output.display()))?;
            if self.confirm("Use the default path?", true)? {
                return Ok(Some(default_output.to_path_buf()));
            }
            let Some(raw) = self.ask("New save path: ")? else {
                return Ok(None);
            };
            match validate_save_path(&raw) {
                Ok(path) => return Ok(Some(path)),
                Err(e) => self.say(&format!("Invalid path: {raw} ({e}), try again"))?,
            }
        }
    }
}

/// Creates the directory if needed and returns its absolute form.
pub(crate) fn validate_save_path(raw: &str) -> io::Result<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }
    fs::create_dir_all(trimmed)?;
    fs::canonicalize(trimmed)
}
