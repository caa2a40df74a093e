//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the ares-research CLI.
//! Progress lines go to stderr so stdout carries only the report.

use crate::types::Source;
use owo_colors::OwoColorize;

/// Output style configuration
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                r#"
   {}
   {}
   {}
   {}
   {}
"#,
                "    _    ____  _____ ____  ".bright_cyan().bold(),
                "   / \\  |  _ \\| ____/ ___| ".bright_cyan().bold(),
                "  / _ \\ | |_) |  _| \\___ \\ ".cyan().bold(),
                " / ___ \\|  _ <| |___ ___) |".blue().bold(),
                "/_/   \\_\\_| \\_\\_____|____/ ".blue().bold(),
            );
            println!(
                "   {} {}\n",
                "Deep Research".bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!(
                r#"
    _    ____  _____ ____
   / \  |  _ \| ____/ ___|
  / _ \ | |_) |  _| \___ \
 / ___ \|  _ <| |___ ___) |
/_/   \_\_| \_\_____|____/

   Deep Research v{}
"#,
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message to stderr
    pub fn warning(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            eprintln!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a research progress line to stderr
    pub fn progress(&self, stage: &str, message: &str) {
        if self.colored {
            eprintln!("  {} {}", format!("[{}]", stage).dimmed(), message.bright_white());
        } else {
            eprintln!("  [{}] {}", stage, message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file skipped message
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print completion message with next steps
    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "🚀".green(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Print a clarifying question from the pipeline
    pub fn question(&self, question: &str) {
        if self.colored {
            println!("{} {}", "?".bright_yellow().bold(), question.bright_white());
        } else {
            println!("[?] {}", question);
        }
    }

    /// Print the markdown report verbatim
    pub fn report(&self, report: &str) {
        println!("{}", report.trim_end());
    }

    /// Print a compact citation list to stderr
    pub fn sources(&self, sources: &[Source]) {
        if sources.is_empty() {
            return;
        }
        for source in sources {
            let line = match &source.url {
                Some(url) if url != &source.title => format!("[{}] {} ({})", source.number, source.title, url),
                _ => format!("[{}] {}", source.number, source.title),
            };
            if self.colored {
                eprintln!("    {}", line.dimmed());
            } else {
                eprintln!("    {}", line);
            }
        }
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}
