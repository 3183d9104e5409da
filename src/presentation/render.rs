use colored::{ColoredString, Colorize};

use crate::commands::{BatchOutcome, CommandOutput, CommandReport, Listing, ListingEntry, TreeView};
use crate::config::ListingSettings;
use crate::filesystem::LineDescriptor;
use crate::filesystem::path::EMPTY_PLACEHOLDER;

const INDENT_WIDTH: usize = 2;
const COLUMN_GAP: usize = 2;

const PIPE: char = '┃';
const PIPE_SIDE: char = '┣';
const PIPE_END: char = '┗';

/// Turns command reports into terminal text.
#[derive(Debug, Clone)]
pub struct Renderer {
    columns: usize,
}

impl Renderer {
    pub fn new(settings: &ListingSettings) -> Self {
        Renderer {
            columns: settings.columns.max(1),
        }
    }

    pub fn render(&self, report: &CommandReport) -> String {
        match &report.output {
            CommandOutput::Help { text, .. } => text.clone(),
            CommandOutput::Tree(view) => render_tree(view),
            CommandOutput::WorkingDirectory(pwd) => current_directory(pwd),
            CommandOutput::Listing(listing) => self.render_listing(listing),
            CommandOutput::Created(outcome) => render_batch(
                outcome,
                "Created these folders successfully:",
                "Failed to create these folders:",
            ),
            CommandOutput::Removed(outcome) => render_batch(
                outcome,
                "Removed these items successfully:",
                "Failed to remove these items:",
            ),
            CommandOutput::Uploaded { directory, outcome } => render_batch(
                outcome,
                &format!("Uploaded these files successfully to {directory}:"),
                &format!("Failed to upload these files to {directory}:"),
            ),
            CommandOutput::Failed(err) => format!(
                "{}: {}",
                format!("error: {}", report.command).red().bold(),
                snafu::Report::from_error(err)
            ),
        }
    }

    fn render_listing(&self, listing: &Listing) -> String {
        let title = format!("ls: {}", listing.path).bold();
        if listing.entries.is_empty() {
            return format!("{title}\n{}", EMPTY_PLACEHOLDER.dimmed());
        }

        let labels: Vec<String> = listing.entries.iter().map(entry_label).collect();
        let width = labels.iter().map(|label| label.chars().count()).max().unwrap_or(0) + COLUMN_GAP;

        let mut output = title.to_string();
        for (row_entries, row_labels) in listing
            .entries
            .chunks(self.columns)
            .zip(labels.chunks(self.columns))
        {
            output.push('\n');
            let last = row_labels.len() - 1;
            for (i, (entry, label)) in row_entries.iter().zip(row_labels).enumerate() {
                output.push_str(&colorize_entry(entry, label).to_string());
                if i < last {
                    let padding = width - label.chars().count();
                    output.extend(std::iter::repeat_n(' ', padding));
                }
            }
        }
        output
    }
}

fn current_directory(pwd: &str) -> String {
    format!("Current directory: {}", pwd.bold())
}

fn render_tree(view: &TreeView) -> String {
    let mut output = current_directory(&view.pwd);
    for line in &view.lines {
        output.push('\n');
        output.push_str(&tree_line(line));
    }
    output
}

fn tree_line(line: &LineDescriptor) -> String {
    let mut label = match &line.link {
        Some(link) => format!("{} ({})", line.name, link.dimmed()),
        None => {
            let name = line.name.blue().bold();
            if line.is_pwd {
                name.underline().to_string()
            } else {
                name.to_string()
            }
        }
    };
    if line.is_empty_dir {
        label = format!("{label} {}", EMPTY_PLACEHOLDER.dimmed());
    }
    if line.is_root() {
        return label;
    }

    let mut prefix = vec![' '; line.depth * INDENT_WIDTH + 1];
    prefix[line.depth * INDENT_WIDTH] = if line.is_last_child { PIPE_END } else { PIPE_SIDE };
    for &depth in &line.continuation_depths {
        prefix[depth * INDENT_WIDTH] = PIPE;
    }

    let prefix: String = prefix.into_iter().collect();
    format!("{prefix} {label}")
}

fn entry_label(entry: &ListingEntry) -> String {
    match &entry.link {
        Some(link) => format!("{} ({link})", entry.name),
        None => format!("{}/", entry.name),
    }
}

fn colorize_entry(entry: &ListingEntry, label: &str) -> ColoredString {
    if entry.is_directory() {
        label.blue().bold()
    } else {
        label.normal()
    }
}

fn render_batch(outcome: &BatchOutcome, succeeded: &str, failed: &str) -> String {
    let mut sections = Vec::new();

    if !outcome.successes.is_empty() {
        let mut section = succeeded.green().bold().to_string();
        for target in &outcome.successes {
            section.push('\n');
            section.push_str(target);
        }
        sections.push(section);
    }

    if !outcome.failures.is_empty() {
        let mut section = failed.red().bold().to_string();
        for failure in &outcome.failures {
            section.push_str(&format!("\n{} -> {}", failure.target, failure.error));
        }
        sections.push(section);
    }

    sections.join("\n\n")
}
