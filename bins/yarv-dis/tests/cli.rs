//! Exercises the compiled binary end to end (subcommand parsing, demo
//! lookup, and the underlying `yarv` facade all wired together), rather
//! than calling `cmd::*` in-process.

use std::process::Command;

use anyhow::Result;

fn yarv_dis() -> Command {
    Command::new(env!("CARGO_BIN_EXE_yarv-dis"))
}

#[test]
fn disasm_with_no_name_lists_the_available_demos() -> Result<()> {
    let output = yarv_dis().arg("disasm").output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.lines().any(|line| line == "plus"));
    Ok(())
}

#[test]
fn disasm_plus_renders_the_opt_arith_instruction() -> Result<()> {
    let output = yarv_dis().args(["disasm", "plus"]).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("opt_plus") || stdout.contains("send"));
    Ok(())
}

#[test]
fn run_interpolate_prints_the_interpolated_string() -> Result<()> {
    let output = yarv_dis().args(["run", "interpolate"]).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.trim(), "\"5\"");
    Ok(())
}

#[test]
fn run_an_unknown_program_fails_with_a_nonzero_exit() -> Result<()> {
    let output = yarv_dis().args(["run", "does-not-exist"]).output()?;
    assert!(!output.status.success());
    Ok(())
}
