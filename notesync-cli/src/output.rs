//! Human-readable rendering of pass results.

use anyhow::Result;
use notesync_core::{Agent, StatusReport, SyncReport};
use std::io::Write;

fn print_group(writer: &mut dyn Write, title: &str, marker: char, items: &[String]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(writer, "{}", title)?;
    for item in items {
        writeln!(writer, "  {} {}", marker, item)?;
    }
    Ok(())
}

/// Print the result of a pull.
pub fn print_pull(report: &SyncReport, writer: &mut dyn Write) -> Result<()> {
    print_group(writer, "Created:", '+', &report.created)?;
    print_group(writer, "Updated:", '~', &report.updated)?;
    print_group(writer, "Conflicts (see .conflict.md files):", '!', &report.conflicts)?;
    if report.is_noop() {
        writeln!(writer, "Already up to date.")?;
    }
    Ok(())
}

/// Print the result of a push.
pub fn print_push(report: &SyncReport, writer: &mut dyn Write) -> Result<()> {
    print_group(writer, "Created:", '+', &report.created)?;
    print_group(writer, "Updated:", '~', &report.updated)?;
    print_group(
        writer,
        "Conflicts (pull first to see remote changes):",
        '!',
        &report.conflicts,
    )?;
    if report.is_noop() {
        writeln!(writer, "Nothing to push.")?;
    }
    Ok(())
}

/// Print a status report.
pub fn print_status(report: &StatusReport, writer: &mut dyn Write) -> Result<()> {
    print_group(writer, "Modified locally (push to upload):", 'M', &report.modified_locally)?;
    print_group(writer, "Modified remotely (pull to download):", 'M', &report.modified_remotely)?;
    print_group(writer, "Conflicts (both changed):", '!', &report.conflicts)?;
    print_group(writer, "Untracked local (push to create):", '?', &report.untracked_local)?;
    print_group(writer, "Untracked remote (pull to download):", '?', &report.untracked_remote)?;
    if !report.has_changes() {
        writeln!(writer, "Everything in sync. ({} files)", report.synced.len())?;
    }
    Ok(())
}

/// Print an agent table.
pub fn print_agents(agents: &[Agent], filter: Option<&str>, writer: &mut dyn Write) -> Result<()> {
    if agents.is_empty() {
        match filter {
            Some(name) => writeln!(writer, "No agents found matching name '{}'", name)?,
            None => writeln!(writer, "No agents found")?,
        }
        return Ok(());
    }

    writeln!(writer, "{:<40}  {}", "ID", "NAME")?;
    writeln!(writer, "{:<40}  {}", "----", "----")?;
    for agent in agents {
        writeln!(writer, "{:<40}  {}", agent.id, agent.name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_print_pull() {
        let report = SyncReport {
            created: vec!["/todo".to_string()],
            conflicts: vec!["/ideas".to_string()],
            ..Default::default()
        };
        let out = render(|w| print_pull(&report, w));
        assert_eq!(
            out,
            "Created:\n  + /todo\nConflicts (see .conflict.md files):\n  ! /ideas\n"
        );

        let out = render(|w| print_pull(&SyncReport::default(), w));
        assert_eq!(out, "Already up to date.\n");
    }

    #[test]
    fn test_print_push_noop() {
        let report = SyncReport {
            unchanged: vec!["/todo".to_string()],
            ..Default::default()
        };
        assert_eq!(render(|w| print_push(&report, w)), "Nothing to push.\n");
    }

    #[test]
    fn test_print_status() {
        let report = StatusReport {
            modified_locally: vec!["/todo".to_string()],
            untracked_remote: vec!["/ideas".to_string()],
            ..Default::default()
        };
        let out = render(|w| print_status(&report, w));
        assert!(out.contains("Modified locally (push to upload):\n  M /todo\n"));
        assert!(out.contains("Untracked remote (pull to download):\n  ? /ideas\n"));
        assert!(!out.contains("Everything in sync"));

        let clean = StatusReport {
            synced: vec!["/a".to_string(), "/b".to_string()],
            ..Default::default()
        };
        assert_eq!(
            render(|w| print_status(&clean, w)),
            "Everything in sync. (2 files)\n"
        );
    }

    #[test]
    fn test_print_agents() {
        let out = render(|w| print_agents(&[], Some("bob"), w));
        assert_eq!(out, "No agents found matching name 'bob'\n");

        let agents = vec![Agent {
            id: "agent-1".to_string(),
            name: "Research".to_string(),
            description: None,
            created_at: None,
        }];
        let out = render(|w| print_agents(&agents, None, w));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("agent-1 "));
        assert!(lines[2].ends_with("  Research"));
    }
}
