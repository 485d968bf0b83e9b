// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_commands_lists_every_subcommand() {
    use clap::CommandFactory;

    let listed = commands();
    for sub in crate::cli::Cli::command().get_subcommands() {
        let name = sub.get_name();
        if name == "help" {
            continue;
        }
        assert!(listed.contains(name), "{} missing from help", name);
    }
}

#[test]
fn test_template_has_placeholders() {
    let template = template();
    assert!(template.contains("{usage}"));
    assert!(template.contains("{options}"));
    assert!(template.contains("Options:"));
}

#[test]
fn test_quickstart_mentions_capture() {
    assert!(quickstart().contains("phip capture"));
}

#[test]
fn test_color_env_overrides() {
    std::env::set_var(env::vars::COLOR, "1");
    std::env::remove_var(env::vars::NO_COLOR);
    assert!(env::force_color());
    assert!(should_colorize());
    assert!(paint(HEADER, "Usage").starts_with("\x1b[38;5;74m"));

    std::env::set_var(env::vars::NO_COLOR, "1");
    assert!(env::no_color());
    assert!(!should_colorize());
    assert_eq!(paint(HEADER, "Usage"), "Usage");

    std::env::remove_var(env::vars::NO_COLOR);
    std::env::remove_var(env::vars::COLOR);
    assert!(!env::no_color());
    assert!(!env::force_color());
}
