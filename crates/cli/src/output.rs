//! CLI output formatting utilities.
//!
//! Consistent colored status lines for the terminal; colors are dropped
//! automatically when the stream is not a tty.

use owo_colors::{OwoColorize, Stream};

pub mod symbols {
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const MODIFY: &str = "~";
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_change(path: &str) {
  println!(
    "  {} {}",
    symbols::MODIFY.if_supports_color(Stream::Stdout, |s| s.yellow()),
    path
  );
}
