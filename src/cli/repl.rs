// Interactive review session

use anyhow::Result;
use crossterm::style::Stylize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, IsTerminal};

use super::commands::{format_help, Command};
use super::render::{render_catalog, render_document};
use crate::clipboard::ClipboardExporter;
use crate::document::{CopyTarget, SectionKey};
use crate::errors::ReviewError;
use crate::selection::ToggleOutcome;
use crate::workflow::{GenerationWorkflow, Outcome, WorkflowState};

/// Result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Error(String),
    Quit,
}

pub struct Repl {
    workflow: GenerationWorkflow,
    exporter: ClipboardExporter,
    is_interactive: bool,
}

impl Repl {
    pub fn new(workflow: GenerationWorkflow, exporter: ClipboardExporter) -> Self {
        Self {
            workflow,
            exporter,
            is_interactive: io::stdout().is_terminal(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;

        if self.is_interactive {
            println!("Portfolio Review v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "Loaded {} capabilities ✓",
                self.workflow.catalog().len()
            );
            println!("Select 1-3 capabilities with /toggle, then /generate. Type /help for commands.");
        }

        loop {
            let prompt = format!("{}> ", self.workflow.state().await.as_str());
            let line = match editor.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };
            if line.trim().is_empty() {
                continue;
            }
            let _ = editor.add_history_entry(line.as_str());

            let command = match Command::parse(&line) {
                Some(Ok(command)) => command,
                Some(Err(e)) => {
                    self.print_error(&e.to_string());
                    continue;
                }
                None => {
                    println!("Commands start with '/'. Type /help for commands.");
                    continue;
                }
            };

            match self.execute(command).await {
                Reply::Output(out) if out.is_empty() => {}
                Reply::Output(out) => println!("{}", out),
                Reply::Error(message) => self.print_error(&message),
                Reply::Quit => break,
            }
        }

        if self.is_interactive {
            println!("Goodbye!");
        }
        Ok(())
    }

    fn print_error(&self, message: &str) {
        if self.is_interactive {
            eprintln!("{} {}", "Error:".red().bold(), message);
        } else {
            eprintln!("Error: {}", message);
        }
    }

    pub async fn execute(&self, command: Command) -> Reply {
        match command {
            Command::Help => Reply::Output(format_help()),
            Command::Quit => Reply::Quit,
            Command::Caps => {
                let selection = self.workflow.selection().await;
                Reply::Output(render_catalog(self.workflow.catalog(), Some(&selection)))
            }
            Command::Toggle(name) => {
                let message = match self.workflow.toggle_capability(&name).await {
                    ToggleOutcome::Added => format!("Selected {}", name),
                    ToggleOutcome::Removed => format!("Deselected {}", name),
                    ToggleOutcome::Saturated => {
                        return Reply::Error("Already 3 capabilities selected".to_string())
                    }
                    ToggleOutcome::Unknown => {
                        return Reply::Error(format!("Unknown capability {:?}", name))
                    }
                };
                let selection = self.workflow.selection().await;
                Reply::Output(format!("{} ({}/3)", message, selection.len()))
            }
            Command::Generate(description) => {
                let selection = self.workflow.selection().await;
                match self.workflow.generate(&description, &selection).await {
                    Ok(Outcome::Applied) => self.show().await,
                    Ok(Outcome::Discarded) => Reply::Output("Request superseded".to_string()),
                    Err(e) => review_error(e),
                }
            }
            Command::Show => self.show().await,
            Command::Edit(key, text) => match self.workflow.set_field(key, &text).await {
                Ok(_) => Reply::Output(format!("Updated {}", key.title())),
                Err(e) => Reply::Error(e.to_string()),
            },
            Command::EditCapability(name, text) => {
                match self.workflow.set_capability_field(&name, &text).await {
                    Ok(true) => Reply::Output(format!("Updated {}", name)),
                    Ok(false) => Reply::Error(format!("No capability section named {:?}", name)),
                    Err(e) => Reply::Error(e.to_string()),
                }
            }
            Command::Copy(target) => self.copy(target).await,
            Command::Improve => match self.workflow.enter_improve().await {
                Ok(()) => Reply::Output(
                    "Enter improvement instructions with /apply <instruction> (/cancel to close)"
                        .to_string(),
                ),
                Err(e) => Reply::Error(e.to_string()),
            },
            Command::Cancel => match self.workflow.cancel_improve().await {
                Ok(()) => Reply::Output("Improvement cancelled".to_string()),
                Err(e) => Reply::Error(e.to_string()),
            },
            Command::Apply(instruction) => match self.workflow.improve(&instruction).await {
                Ok(Outcome::Applied) => self.show().await,
                Ok(Outcome::Discarded) => Reply::Output("Request superseded".to_string()),
                Err(e) => review_error(e),
            },
            Command::New => {
                self.workflow.new_case().await;
                self.exporter.clear();
                Reply::Output("Started a new case".to_string())
            }
        }
    }

    async fn show(&self) -> Reply {
        match self.workflow.snapshot().await {
            Some(document) => {
                let mut out = render_document(&document, &self.exporter.copied_targets());
                if self.workflow.state().await == WorkflowState::Improving {
                    out.push_str("\n\n(improving: /apply <instruction> or /cancel)");
                }
                Reply::Output(out)
            }
            None => Reply::Error("No review yet; use /generate".to_string()),
        }
    }

    async fn copy(&self, target: CopyTarget) -> Reply {
        let Some(document) = self.workflow.snapshot().await else {
            return Reply::Error("No review to copy from".to_string());
        };
        let copied = if target == CopyTarget::Section(SectionKey::Capabilities) {
            self.exporter.copy_all_capabilities(&document).await
        } else {
            let Some(text) = document.target_text(&target) else {
                return Reply::Error(format!("No section {}", target));
            };
            self.exporter.copy_section(target.clone(), text).await
        };
        if copied {
            Reply::Output(format!("Copied {}", target))
        } else {
            // Clipboard failures are logged by the exporter; nothing to report.
            Reply::Output(String::new())
        }
    }
}

fn review_error(e: ReviewError) -> Reply {
    match e {
        ReviewError::Validation(e) => Reply::Error(e.to_string()),
        ReviewError::Service(e) => Reply::Error(e.message().to_string()),
    }
}
