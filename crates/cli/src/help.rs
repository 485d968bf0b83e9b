// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.
//!
//! Respects `NO_COLOR=1` (disable) and `COLOR=1` (force without a TTY).

use std::io::IsTerminal;

use clap::builder::styling::Styles;

use crate::env;

/// Section headers: steel blue.
const HEADER: u8 = 74;
/// Commands and flags: light grey.
const LITERAL: u8 = 250;
/// Placeholders and values: medium grey.
const CONTEXT: u8 = 245;

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if env::no_color() {
        return false;
    }
    if env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let color = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));

    Styles::styled()
        .header(color(HEADER))
        .usage(color(HEADER))
        .literal(color(LITERAL))
        .placeholder(color(CONTEXT))
        .valid(color(CONTEXT))
}

/// Main help template with colorized Options header.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        paint(HEADER, "Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    let lit = |name: &str| paint(LITERAL, name);
    format!(
        "\
{reports}
  {capture}       Capture a daily report
  {pending}       List reports waiting for delivery
  {sync}          Deliver queued reports now
  {watch}         Deliver queued reports whenever online
  {status}        Show queue counts and last sync
  {feedback}      Show risk feedback for this facility

{queue}
  {dead_letters}  List reports the server rejected
  {requeue}       Return rejected reports to the queue
  {clear}         Delete every undelivered report
  {completion}    Generate shell completions
",
        reports = paint(HEADER, "Reports:"),
        queue = paint(HEADER, "Queue Maintenance:"),
        capture = lit("capture"),
        pending = lit("pending"),
        sync = lit("sync"),
        watch = lit("watch"),
        status = lit("status"),
        feedback = lit("feedback"),
        dead_letters = lit("dead-letters"),
        requeue = lit("requeue"),
        clear = lit("clear"),
        completion = lit("completion"),
    )
}

/// Quickstart help shown after options in main help.
pub fn quickstart() -> String {
    format!(
        "{}
  phip capture --fever 3 --diarrhea 1    Capture today's report
  phip status                            Check what is still queued
  phip watch                             Deliver automatically when online",
        paint(HEADER, "Get started:")
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
