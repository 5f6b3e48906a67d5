//! E2E tests for the `cotick` binary: stdin commands, stdout output.

mod common;

use common::{cotick_cmd, write_file};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

// ─── Startup / Shutdown ────────────────────────────────────────────

#[test]
fn empty_stdin_exits_gracefully() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.write_stdin("")
        .assert()
        .success()
        .stdout(contains("'cotick' initialized. Run 'help' for more info"));
}

#[test]
fn quit_skips_remaining_input() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.write_stdin("echo before\nq\necho after\n")
        .assert()
        .success()
        .stdout(contains("before"))
        .stdout(contains("after").not());
}

#[test]
fn quit_long_form() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.write_stdin("quit\necho after\n")
        .assert()
        .success()
        .stdout(contains("after").not());
}

#[test]
fn version_flag() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

// ─── Commands ──────────────────────────────────────────────────────

#[test]
fn echo_prints_arguments() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.write_stdin("echo hello \"big world\"\n")
        .assert()
        .success()
        .stdout(contains("hello big world"));
}

#[test]
fn help_lists_commands() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.write_stdin("help\n")
        .assert()
        .success()
        .stdout(contains("Available commands on cotick:"))
        .stdout(contains("ar: Interacts with the routines"))
        .stdout(contains("echo: Prints its arguments"))
        .stdout(contains("kill: Kills processes by id or by name"));
}

#[test]
fn unknown_command_is_reported() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.write_stdin("nope\n")
        .assert()
        .success()
        .stdout(contains("Unknown command \"nope\". Run 'help' for more info."));
}

#[test]
fn wrong_arity_is_reported() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.write_stdin("get\n")
        .assert()
        .success()
        .stdout(contains("Wrong number of arguments for \"get\""));
}

#[test]
fn help_switch_prints_command_help() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.write_stdin("set -h\n")
        .assert()
        .success()
        .stdout(contains("set: "))
        .stdout(contains("Takes 2 arguments"))
        .stdout(contains("Wrong number").not());
}

#[test]
fn trailing_arguments_run_first() {
    let (mut cmd, _guard) = cotick_cmd();
    cmd.args(["echo", "two words", "-v"])
        .write_stdin("echo then stdin\n")
        .assert()
        .success()
        .stdout(contains("two words -v\nthen stdin"));
}

// ─── Routines ──────────────────────────────────────────────────────

#[test]
fn routine_runs_to_completion_after_input_ends() {
    let (mut cmd, guard) = cotick_cmd();
    let routines = write_file(
        guard.path(),
        "routines.txt",
        "= greet\n-echo hi $1\nwait 5\n-echo bye $1\n",
    );
    cmd.args(["--routines", &routines])
        .write_stdin("ar execute greet bob\n")
        .assert()
        .success()
        .stdout(contains("hi bob\nbye bob"));
}

#[test]
fn routine_list() {
    let (mut cmd, guard) = cotick_cmd();
    let routines = write_file(guard.path(), "routines.txt", "= one\nwait $2\n= two\nforever\n");
    cmd.args(["--routines", &routines])
        .write_stdin("ar list\n")
        .assert()
        .success()
        .stdout(contains("Available routines:"))
        .stdout(contains("  'one': takes 2 arguments"))
        .stdout(contains("  'two': takes no argument"));
}

#[test]
fn endless_routine_stops_at_the_tick_budget() {
    let (mut cmd, guard) = cotick_cmd();
    let routines = write_file(guard.path(), "routines.txt", "= idle\nforever\n");
    cmd.args(["--routines", &routines, "--max-ticks", "20"])
        .write_stdin("ar execute idle\n")
        .assert()
        .success()
        .stdout(contains("Routine 'idle' ended with KILLED"));
}

#[test]
fn routines_from_env() {
    let (mut cmd, guard) = cotick_cmd();
    let routines = write_file(guard.path(), "env.txt", "= env\n-echo from env\n");
    cmd.env("COTICK_ROUTINES", &routines)
        .write_stdin("ar execute env\n")
        .assert()
        .success()
        .stdout(contains("from env"));
}

#[test]
fn invalid_routines_fail_startup() {
    let (mut cmd, guard) = cotick_cmd();
    let routines = write_file(guard.path(), "bad.txt", "= bad\nwhile maybe\n");
    cmd.args(["--routines", &routines])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("could not parse instruction 'maybe' at line 2"));
}
