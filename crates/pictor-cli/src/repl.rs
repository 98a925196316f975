//! Interactive REPL presentation layer.
//!
//! Reads session snapshots and invokes controller commands; it never
//! mutates session state directly. Typing plain text sets the edit
//! prompt; slash commands drive the session.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use pictor_application::EditingUseCase;
use pictor_core::image::ImageResource;
use pictor_core::session::{SessionSnapshot, SessionStatus};
use pictor_infrastructure::{FileImage, save_data_uri};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

const COMMANDS: &[&str] = &[
    "/upload", "/edit", "/use", "/save", "/reset", "/status", "/help",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Runs the REPL until the user quits.
pub async fn run(usecase: Arc<EditingUseCase>, output_dir: &Path) -> Result<()> {
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Pictor ===".bright_magenta().bold());
    println!(
        "{}",
        "Upload an image with '/upload <path>', type the edit you want, then '/edit'. '/help' lists all commands."
            .bright_black()
    );
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                handle_line(&usecase, output_dir, trimmed).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Input error: {err}").red());
                break;
            }
        }
    }

    Ok(())
}

async fn handle_line(usecase: &EditingUseCase, output_dir: &Path, line: &str) {
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    if !command.starts_with('/') {
        usecase.set_prompt(line).await;
        println!("{}", format!("Prompt set: {line}").green());
        return;
    }

    match command {
        "/upload" => upload(usecase, rest).await,
        "/edit" => edit(usecase).await,
        "/use" => promote(usecase).await,
        "/save" => save(usecase, rest, output_dir).await,
        "/reset" => {
            usecase.reset().await;
            println!("{}", "Session cleared.".green());
        }
        "/status" => print_status(&usecase.snapshot().await),
        "/help" => print_help(),
        _ => println!("{}", "Unknown command".bright_black()),
    }
}

async fn upload(usecase: &EditingUseCase, path: &str) {
    if path.is_empty() {
        println!("{}", "Usage: /upload <path>".yellow());
        return;
    }

    let path = PathBuf::from(path);
    if !path.is_file() {
        eprintln!("{}", format!("No such file: {}", path.display()).red());
        return;
    }

    let image = FileImage::new(path);
    println!(
        "{}",
        format!("Uploaded {} ({})", image.name(), image.mime_type()).green()
    );
    usecase.upload_image(Arc::new(image)).await;
}

async fn edit(usecase: &EditingUseCase) {
    let snapshot = usecase.snapshot().await;
    if !snapshot.has_original() {
        println!("{}", "Upload an image first.".yellow());
        return;
    }
    if snapshot.prompt.is_empty() {
        println!("{}", "Type the edit you want first.".yellow());
        return;
    }

    println!("{}", "Editing in progress...".bright_black());
    usecase.submit().await;

    let snapshot = usecase.snapshot().await;
    if let Some(error) = &snapshot.last_error {
        eprintln!("{}", error.as_str().red());
    } else if snapshot.edited_image.is_some() {
        println!(
            "{}",
            "Edit ready. '/save' to download it, '/use' to iterate on it.".bright_blue()
        );
    }
}

async fn promote(usecase: &EditingUseCase) {
    if usecase.snapshot().await.edited_image.is_none() {
        println!("{}", "Nothing to promote yet - run an edit first.".yellow());
        return;
    }

    usecase.promote_edited_to_original().await;

    match &usecase.snapshot().await.last_error {
        Some(error) => eprintln!("{}", error.as_str().red()),
        None => println!("{}", "Edited image is now the original.".green()),
    }
}

async fn save(usecase: &EditingUseCase, rest: &str, output_dir: &Path) {
    let snapshot = usecase.snapshot().await;
    let Some(uri) = snapshot.edited_image else {
        println!("{}", "Nothing to save yet - run an edit first.".yellow());
        return;
    };

    let dir = if rest.is_empty() {
        output_dir.to_path_buf()
    } else {
        PathBuf::from(rest)
    };

    match save_data_uri(&uri, &dir).await {
        Ok(path) => println!("{}", format!("Saved to {}", path.display()).green()),
        Err(err) => eprintln!("{}", format!("Save failed: {err}").red()),
    }
}

fn print_status(snapshot: &SessionSnapshot) {
    let original = match (&snapshot.original_name, &snapshot.original_mime_type) {
        (Some(name), Some(mime_type)) => format!("{name} ({mime_type})"),
        _ => "none".to_string(),
    };
    let status = match snapshot.status {
        SessionStatus::Idle => "idle",
        SessionStatus::Submitting => "submitting",
        SessionStatus::Ready => "ready",
    };

    println!("  original: {original}");
    println!(
        "  prompt:   {}",
        if snapshot.prompt.is_empty() {
            "(empty)"
        } else {
            snapshot.prompt.as_str()
        }
    );
    println!(
        "  edited:   {}",
        if snapshot.edited_image.is_some() {
            "ready"
        } else {
            "none"
        }
    );
    println!("  status:   {status}");
    if let Some(error) = &snapshot.last_error {
        println!("  error:    {}", error.as_str().red());
    }
}

fn print_help() {
    println!("  {}         set the edit prompt", "<text>".bright_cyan());
    println!(
        "  {}  load an image as the session original",
        "/upload <path>".bright_cyan()
    );
    println!(
        "  {}           apply the prompt to the original",
        "/edit".bright_cyan()
    );
    println!(
        "  {}            make the edited image the new original",
        "/use".bright_cyan()
    );
    println!(
        "  {}    write the edited image to a directory",
        "/save [dir]".bright_cyan()
    );
    println!("  {}          start over", "/reset".bright_cyan());
    println!("  {}         show the session", "/status".bright_cyan());
    println!("  {}      leave", "quit".bright_cyan());
}
