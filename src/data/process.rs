//! Top processes by CPU, read from `ps`.

use super::command::CommandRunner;
use crate::data::snapshot::ProcessInfo;

pub const PS_PROGRAM: &str = "ps";
pub const PS_ARGS: &[&str] = &["-eo", "pid,%cpu,%mem,args", "--sort=-%cpu", "--no-headers"];

/// `ps` already sorts by CPU, so the first `limit` parseable rows are the top.
pub fn parse_ps_output(output: &str, limit: usize) -> Vec<ProcessInfo> {
    output
        .lines()
        .filter_map(parse_ps_line)
        .take(limit)
        .collect()
}

fn parse_ps_line(line: &str) -> Option<ProcessInfo> {
    let line = line.trim_start();
    let (pid, rest) = split_field(line)?;
    let (cpu, rest) = split_field(rest)?;
    let (mem, rest) = split_field(rest)?;

    let command = rest.trim();
    Some(ProcessInfo {
        pid: pid.parse().ok()?,
        cpu_percent: cpu.parse().ok()?,
        mem_percent: mem.parse().ok()?,
        command: if command.is_empty() {
            "<unknown>".to_string()
        } else {
            command.to_string()
        },
    })
}

fn split_field(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(text.split_once(char::is_whitespace).unwrap_or((text, "")))
}

pub fn collect_top_processes(runner: &dyn CommandRunner, limit: usize) -> Vec<ProcessInfo> {
    if limit == 0 {
        return Vec::new();
    }
    runner
        .run(PS_PROGRAM, PS_ARGS)
        .map(|output| parse_ps_output(&output, limit))
        .unwrap_or_default()
}
