//! Layering rules, checked by scanning the source tree.
//!
//! `domain` is pure, `application` talks to the outside world through
//! `application::ports`, `infra` implements those ports, and `commands` /
//! `output` sit on top. Lines inside `#[cfg(test)]` blocks and comments are
//! ignored.

use std::path::{Path, PathBuf};

/// One source file reduced to the lines that ship in the binary.
struct Source {
    rel: String,
    lines: Vec<(usize, String)>,
}

impl Source {
    fn load(path: &Path) -> Self {
        let rel = path
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(path)
            .display()
            .to_string()
            .replace('\\', "/");
        let content = std::fs::read_to_string(path).unwrap_or_default();
        Self {
            rel,
            lines: production_lines(&content),
        }
    }

    fn is_under(&self, dir: &str) -> bool {
        self.rel.starts_with(&format!("src/{dir}/"))
    }

    fn body(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|(_, l)| l.as_str())
    }

    /// `file:line: text` for every line containing one of `patterns`.
    fn find(&self, patterns: &[&str]) -> Vec<String> {
        self.lines
            .iter()
            .filter(|(_, line)| patterns.iter().any(|p| line.contains(p)))
            .map(|(n, line)| format!("{}:{n}: {}", self.rel, line.trim()))
            .collect()
    }
}

fn sources() -> Vec<Source> {
    let mut files = Vec::new();
    walk(&Path::new(env!("CARGO_MANIFEST_DIR")).join("src"), &mut files);
    files.sort();
    files
        .iter()
        // Compiled only under cfg(test) via its `mod` declaration.
        .filter(|p| !p.ends_with("test_support.rs"))
        .map(|p| Source::load(p))
        .collect()
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            walk(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            out.push(path);
        }
    }
}

/// Non-comment lines outside `#[cfg(test)]` items, numbered from 1.
fn production_lines(content: &str) -> Vec<(usize, String)> {
    let mut depth: i32 = 0;
    let mut test_depth: Option<i32> = None;
    let mut pending_cfg_test = false;
    let mut out = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("#[cfg(test)]") || trimmed.starts_with("#[cfg(all(test") {
            pending_cfg_test = true;
        }
        let skipping = test_depth.is_some() || pending_cfg_test;
        for ch in line.chars() {
            match ch {
                '{' => {
                    if pending_cfg_test {
                        test_depth = Some(depth);
                        pending_cfg_test = false;
                    }
                    depth += 1;
                }
                '}' => {
                    depth -= 1;
                    if test_depth == Some(depth) {
                        test_depth = None;
                    }
                }
                _ => {}
            }
        }
        // `#[cfg(test)] mod tests;` has no body.
        if pending_cfg_test && trimmed.ends_with(';') {
            pending_cfg_test = false;
        }
        let comment = trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*');
        if !skipping && !comment && !trimmed.is_empty() {
            out.push((i + 1, line.to_string()));
        }
    }
    out
}

fn assert_clean(rule: &str, violations: Vec<String>) {
    assert!(violations.is_empty(), "{rule}:\n{}", violations.join("\n"));
}

#[test]
fn production_line_filter_skips_test_modules() {
    let content = "fn a() {}\n#[cfg(test)]\nmod tests {\n    fn b() { std::fs::read(\"x\"); }\n}\n// c\nfn d() {}\n";
    let kept: Vec<usize> = production_lines(content).iter().map(|(n, _)| *n).collect();
    assert_eq!(kept, [1, 7]);
}

#[test]
fn domain_is_pure() {
    let forbidden = [
        "std::fs",
        "std::process",
        "std::net",
        "tokio",
        "ureq",
        "crate::application",
        "crate::infra",
        "crate::commands",
        "crate::output",
    ];
    let violations = sources()
        .iter()
        .filter(|s| s.is_under("domain"))
        .flat_map(|s| s.find(&forbidden))
        .collect();
    assert_clean("domain/ must not perform I/O or import outer layers", violations);
}

#[test]
fn application_reaches_io_only_through_ports() {
    let forbidden = [
        "crate::infra",
        "crate::output",
        "crate::commands",
        "std::fs",
        "std::process::Command",
        "tokio::process",
        "ureq::",
        "println!",
        "eprintln!",
    ];
    let violations = sources()
        .iter()
        .filter(|s| s.is_under("application"))
        .flat_map(|s| s.find(&forbidden))
        .collect();
    assert_clean(
        "application/ must use LocalFs, ContainerRuntime, ReleaseSource and ProgressReporter",
        violations,
    );
}

#[test]
fn service_signatures_use_port_bounds() {
    let adapters = [
        "StdFs",
        "EmbeddedTemplates",
        "HttpReleaseSource",
        "RuntimeCli",
        "TokioCommandRunner",
        "TomlConfigStore",
    ];
    let violations = sources()
        .iter()
        .filter(|s| s.is_under("application"))
        .flat_map(|s| {
            s.lines
                .iter()
                .filter(|(_, l)| l.contains("fn ") && adapters.iter().any(|a| l.contains(a)))
                .map(|(n, l)| format!("{}:{n}: {}", s.rel, l.trim()))
                .collect::<Vec<_>>()
        })
        .collect();
    assert_clean("services take port traits, not concrete adapters", violations);
}

#[test]
fn infra_does_not_reach_up() {
    let violations = sources()
        .iter()
        .filter(|s| s.is_under("infra"))
        .flat_map(|s| s.find(&["crate::commands", "crate::output", "crate::app::", "println!"]))
        .collect();
    assert_clean("infra/ must not depend on commands/, output/ or AppContext", violations);
}

#[test]
fn adapters_are_built_in_app_context() {
    let violations = sources()
        .iter()
        .filter(|s| s.is_under("commands"))
        .flat_map(|s| {
            s.find(&[
                "TokioCommandRunner::new",
                "RuntimeCli::new",
                "HttpReleaseSource::from_env",
                "EmbeddedTemplates::load",
            ])
        })
        .collect();
    assert_clean("commands/ get adapters from AppContext", violations);
}

#[test]
fn commands_render_through_renderer() {
    let violations = sources()
        .iter()
        .filter(|s| s.is_under("commands"))
        .flat_map(|s| {
            s.find(&[
                "json: bool",
                "if json",
                "serde_json::",
                "println!",
                "Confirm::new()",
                "io::stdin()",
            ])
        })
        .collect();
    assert_clean(
        "commands/ print through app.renderer() and prompt through app.confirm()",
        violations,
    );
}

#[test]
fn command_handlers_take_app_context() {
    let violations = sources()
        .iter()
        .filter(|s| s.is_under("commands") && !s.rel.ends_with("mod.rs"))
        .filter(|s| {
            s.body().any(|l| l.contains("pub fn run(") || l.contains("pub async fn run("))
                && !s.body().any(|l| l.contains("app: &AppContext"))
        })
        .map(|s| s.rel.clone())
        .collect();
    assert_clean("every command run() takes &AppContext", violations);
}

#[test]
fn command_handlers_stay_thin() {
    const LIMIT: usize = 125;
    let violations = sources()
        .iter()
        .filter(|s| s.is_under("commands") && s.lines.len() > LIMIT)
        .map(|s| format!("{}: {} lines", s.rel, s.lines.len()))
        .collect();
    assert_clean("command handlers over the line limit; move logic into services", violations);
}

#[test]
fn installed_version_is_written_only_by_the_migrator() {
    let violations = sources()
        .iter()
        .filter(|s| !s.rel.ends_with("services/migration.rs") && !s.rel.ends_with("services/sidecar.rs"))
        .flat_map(|s| s.find(&["set_installed_version"]))
        .collect();
    assert_clean(".version is the migration commit point", violations);
}

#[test]
fn no_blanket_dead_code_allows() {
    let violations = sources()
        .iter()
        .flat_map(|s| s.find(&["#![allow(dead_code)]"]))
        .collect();
    assert_clean("module-level dead_code allows hide unused engine code", violations);
}
