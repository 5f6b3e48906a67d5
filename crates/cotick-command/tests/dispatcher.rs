//! Parsing, validation and built-in commands of the dispatcher.

use cotick_command::{
    Arguments, Command, CommandError, CommandProcess, Dispatcher, SpawnRequest, Trigger,
};
use cotick_process::{Logger, ProcessResult, Scheduler, SpawnSpec};
use std::cell::RefCell;
use std::rc::Rc;

/// Collects everything written to the dispatcher's logger.
#[derive(Clone, Default)]
struct LogCapture {
    lines: Rc<RefCell<Vec<String>>>,
}

impl LogCapture {
    fn logger(&self) -> Logger {
        let lines = Rc::clone(&self.lines);
        Logger::new(move |s| lines.borrow_mut().push(s.to_string()))
    }

    fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    fn last(&self) -> Option<String> {
        self.lines.borrow().last().cloned()
    }

    fn clear(&self) {
        self.lines.borrow_mut().clear();
    }

    fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

/// Provider remembering the arguments of every call.
#[derive(Clone, Default)]
struct MockCommand {
    calls: Rc<RefCell<Vec<Vec<String>>>>,
    period: u32,
}

impl MockCommand {
    fn with_period(period: u32) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    fn command(&self, name: &str, help: &str) -> Command {
        let calls = Rc::clone(&self.calls);
        let period = self.period.max(1);
        Command::new(name, help, move |args: Arguments, _: &Logger| {
            calls.borrow_mut().push(args.as_slice().to_vec());
            CommandProcess::new().with_period(period)
        })
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn call(&self, index: usize) -> Vec<String> {
        self.calls.borrow()[index].clone()
    }
}

fn setup() -> (Scheduler, Rc<Dispatcher>, LogCapture) {
    let capture = LogCapture::default();
    let dispatcher = Dispatcher::new("Test", capture.logger());
    (Scheduler::new(), dispatcher, capture)
}

#[test]
fn announces_itself() {
    let (_, _, capture) = setup();
    assert_eq!(
        capture.lines(),
        ["'Test' initialized. Run 'help' for more info"]
    );
}

#[test]
fn parses_quoted_arguments() {
    let (mut scheduler, dispatcher, _) = setup();
    let mock = MockCommand::default();
    dispatcher
        .register(mock.command("test", "Brief Help"))
        .expect("should register");

    dispatcher
        .start_cmd(&mut scheduler, r#"-test "-command""#, Trigger::Cmd)
        .expect("should start");
    assert_eq!(mock.call(0), ["-command"]);

    dispatcher
        .start_cmd(
            &mut scheduler,
            r#"test test "-command" "test with spaces" "-8""#,
            Trigger::Cmd,
        )
        .expect("should start");
    assert_eq!(mock.call_count(), 2);
    assert_eq!(mock.call(1), ["test", "-command", "test with spaces", "-8"]);
}

#[test]
fn unparsable_line_is_logged() {
    let (mut scheduler, dispatcher, capture) = setup();
    let err = dispatcher
        .start_cmd(&mut scheduler, r#"ps "open"#, Trigger::User)
        .unwrap_err();
    assert!(matches!(err, CommandError::Parse { .. }));
    assert!(capture.contains("Failed to parse"));
    assert!(scheduler.is_empty());
}

#[test]
fn blank_line_is_silently_ignored() {
    let (mut scheduler, dispatcher, capture) = setup();
    capture.clear();
    let err = dispatcher
        .start_cmd(&mut scheduler, "   ", Trigger::User)
        .unwrap_err();
    assert!(matches!(err, CommandError::Empty));
    assert!(capture.lines().is_empty());
}

#[test]
fn unknown_command_hints_at_help() {
    let (mut scheduler, dispatcher, capture) = setup();
    let err = dispatcher
        .start_cmd(&mut scheduler, "nope 1 2", Trigger::Cmd)
        .unwrap_err();
    assert!(matches!(err, CommandError::UnknownCommand(ref n) if n == "nope"));
    assert_eq!(
        capture.last().as_deref(),
        Some("Unknown command \"nope\". Run 'help' for more info.")
    );
    assert!(scheduler.is_empty());
}

#[test]
fn arity_is_enforced() {
    let (mut scheduler, dispatcher, capture) = setup();
    let mock = MockCommand::default();
    dispatcher
        .register(mock.command("fixed", "").with_exact_args(3))
        .expect("should register");

    for line in ["fixed", "fixed a b", "fixed a b c d"] {
        assert!(dispatcher
            .start_cmd(&mut scheduler, line, Trigger::Cmd)
            .is_err());
    }
    assert_eq!(mock.call_count(), 0);
    assert!(scheduler.is_empty());
    assert_eq!(
        capture.last().as_deref(),
        Some("Wrong number of arguments for \"fixed\" (Takes 3 arguments). Run 'help fixed' for more info.")
    );

    dispatcher
        .start_cmd(&mut scheduler, "fixed a b c", Trigger::Cmd)
        .expect("should start");
    assert_eq!(mock.call_count(), 1);
    assert_eq!(scheduler.len(), 1);
}

#[test]
fn trigger_is_enforced() {
    let (mut scheduler, dispatcher, capture) = setup();
    let mock = MockCommand::default();
    dispatcher
        .register(mock.command("secret", "").with_trigger(Trigger::Cmd))
        .expect("should register");

    for trigger in [Trigger::Antenna, Trigger::User] {
        let err = dispatcher
            .start_cmd(&mut scheduler, "secret", trigger)
            .unwrap_err();
        assert!(matches!(err, CommandError::PermissionDenied { .. }));
    }
    assert_eq!(
        capture.last().as_deref(),
        Some("Permission denied for \"secret\"")
    );
    assert_eq!(mock.call_count(), 0);

    dispatcher
        .start_cmd(&mut scheduler, "secret", Trigger::Cmd)
        .expect("should start");
    assert_eq!(mock.call_count(), 1);
}

#[test]
fn duplicate_registration_fails() {
    let (_, dispatcher, _) = setup();
    let mock = MockCommand::default();
    let err = dispatcher.register(mock.command("help", "")).unwrap_err();
    assert!(matches!(err, CommandError::Duplicate(ref n) if n == "help"));
}

#[test]
fn help_lists_commands_below_cmd_trigger() {
    let (mut scheduler, dispatcher, capture) = setup();
    let mock = MockCommand::default();
    dispatcher
        .register(mock.command("test1", "Brief Help test1"))
        .expect("should register");
    dispatcher
        .register(mock.command("test2", "Brief Help test2"))
        .expect("should register");
    dispatcher
        .register(
            mock.command("test3", "Brief Help test3")
                .with_trigger(Trigger::Cmd),
        )
        .expect("should register");

    let pid = dispatcher
        .start_cmd(&mut scheduler, "-help", Trigger::Cmd)
        .expect("should start");
    capture.clear();
    scheduler.tick();

    let lines = capture.lines();
    assert_eq!(lines.len(), 6, "{lines:?}");
    assert_eq!(lines[0], "Available commands on Test:");
    for name in ["help", "kill", "ps", "test1", "test2"] {
        assert!(lines.iter().any(|l| l.starts_with(&format!("{name}: "))));
    }
    assert!(lines.iter().any(|l| l == "test1: Brief Help test1"));
    assert!(!capture.contains("test3"));
    assert!(!scheduler.is_alive(pid));
}

#[test]
fn help_for_a_single_command() {
    let (mut scheduler, dispatcher, capture) = setup();
    let mock = MockCommand::default();
    dispatcher
        .register(
            mock.command("testhelp", "Does things\nline1\nline2")
                .with_min_args(4),
        )
        .expect("should register");

    dispatcher
        .start_cmd(&mut scheduler, "help testhelp", Trigger::User)
        .expect("should start");
    capture.clear();
    scheduler.tick();

    assert_eq!(
        capture.lines(),
        [
            "testhelp: Does things",
            "  line1",
            "  line2",
            "  Takes at least 4 arguments"
        ]
    );
}

#[test]
fn help_for_unknown_command() {
    let (mut scheduler, dispatcher, capture) = setup();
    dispatcher
        .start_cmd(&mut scheduler, "help nope", Trigger::User)
        .expect("should start");
    capture.clear();
    scheduler.tick();
    assert_eq!(
        capture.lines(),
        ["Unknown command \"nope\". Run 'help' for more info."]
    );
}

#[test]
fn help_switch_prints_help_instead_of_running() {
    let (mut scheduler, dispatcher, capture) = setup();
    let victim = scheduler.spawn(SpawnSpec::named("-h"));
    scheduler.tick();
    capture.clear();

    let err = dispatcher
        .start_cmd(&mut scheduler, "kill -h", Trigger::User)
        .unwrap_err();
    assert!(matches!(err, CommandError::Help { ref command, .. } if command == "kill"));
    assert_eq!(
        capture.lines(),
        [
            "kill: Kills processes by id or by name",
            "  A positive number kills the process with that id",
            "  Anything else kills every process with that name",
            "  Takes 1 argument"
        ]
    );
    scheduler.tick();
    assert!(scheduler.is_alive(victim));

    // Quoted, it is a plain argument again.
    dispatcher
        .start_cmd(&mut scheduler, r#"kill "-h""#, Trigger::User)
        .expect("should start");
    scheduler.tick();
    assert!(!scheduler.is_alive(victim));
}

#[test]
fn help_switch_ignores_the_argument_count() {
    let (mut scheduler, dispatcher, capture) = setup();
    let mock = MockCommand::default();
    dispatcher
        .register(mock.command("testswitch", "Does things").with_exact_args(2))
        .expect("should register");
    capture.clear();

    assert!(dispatcher
        .start_cmd(&mut scheduler, "ps -h", Trigger::User)
        .is_err());
    assert_eq!(capture.lines(), ["ps: Lists alive processes", "  Takes no arguments"]);

    capture.clear();
    assert!(dispatcher
        .start_cmd(&mut scheduler, "testswitch a b -h", Trigger::User)
        .is_err());
    assert_eq!(
        capture.lines(),
        ["testswitch: Does things", "  Takes 2 arguments"]
    );
    scheduler.tick();
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn help_switch_on_a_parent_lists_subcommands() {
    let (mut scheduler, dispatcher, capture) = setup();
    let mock = MockCommand::default();
    dispatcher
        .register(
            Command::parent("tool", "Tools")
                .with_subcommand(mock.command("run", "Runs"))
                .with_subcommand(mock.command("stop", "Stops")),
        )
        .expect("should register");
    capture.clear();

    assert!(dispatcher
        .start_cmd(&mut scheduler, "tool -h", Trigger::User)
        .is_err());
    assert_eq!(
        capture.lines(),
        ["tool: Tools", "  Available subcommands are:", "  run, stop"]
    );

    capture.clear();
    assert!(dispatcher
        .start_cmd(&mut scheduler, "tool stop -h", Trigger::User)
        .is_err());
    assert_eq!(
        capture.lines(),
        ["tool stop: Stops", "  Takes any number of arguments"]
    );
}

#[test]
fn ps_lists_alive_processes() {
    let (mut scheduler, dispatcher, capture) = setup();
    let mock = MockCommand::default();
    dispatcher
        .register(mock.command("testps", ""))
        .expect("should register");

    let p = dispatcher
        .start_cmd(&mut scheduler, "testps", Trigger::Cmd)
        .expect("should start");
    let child = scheduler
        .spawn_child(p, SpawnSpec::named("child"))
        .expect("parent alive");
    scheduler
        .spawn_child(child, SpawnSpec::named("granchild"))
        .expect("parent alive");
    scheduler.done(p);
    let killed = scheduler.spawn(SpawnSpec::named("Killed"));
    scheduler.kill(killed);
    scheduler.spawn(SpawnSpec::named("Alive"));

    dispatcher
        .start_cmd(&mut scheduler, "ps", Trigger::Cmd)
        .expect("should start");
    capture.clear();
    scheduler.tick();

    for name in ["testps", "granchild", "Alive"] {
        assert!(capture.contains(name), "missing {name}");
    }
    assert!(!capture.contains("Killed"));
    assert!(capture.lines().iter().any(|l| l.starts_with("    ") && l.ends_with("granchild")));
}

#[test]
fn kill_by_id_then_by_name() {
    let (mut scheduler, dispatcher, _) = setup();
    let mock = MockCommand::with_period(20);
    dispatcher
        .register(mock.command("testkill", ""))
        .expect("should register");
    let p1 = dispatcher
        .start_cmd(&mut scheduler, "testkill", Trigger::Cmd)
        .expect("should start");
    let p2 = dispatcher
        .start_cmd(&mut scheduler, "testkill", Trigger::Cmd)
        .expect("should start");
    scheduler.tick();
    assert!(scheduler.is_active(p1));
    assert!(scheduler.is_active(p2));

    dispatcher
        .start_cmd(&mut scheduler, &format!("kill {p1}"), Trigger::Cmd)
        .expect("should start");
    scheduler.tick();
    assert!(!scheduler.is_alive(p1));
    assert!(scheduler.is_active(p2));

    dispatcher
        .start_cmd(&mut scheduler, "kill testkill", Trigger::Cmd)
        .expect("should start");
    scheduler.tick();
    assert!(!scheduler.is_alive(p2));
}

#[test]
fn subcommands_are_resolved() {
    let (mut scheduler, dispatcher, capture) = setup();
    let mock = MockCommand::default();
    dispatcher
        .register(
            Command::parent("door", "Controls doors")
                .with_subcommand(mock.command("open", "Opens").with_exact_args(1))
                .with_subcommand(mock.command("close", "Closes").with_exact_args(1)),
        )
        .expect("should register");

    let pid = dispatcher
        .start_cmd(&mut scheduler, "door open hangar", Trigger::User)
        .expect("should start");
    assert_eq!(scheduler.name(pid), Some("door open"));
    assert_eq!(mock.call(0), ["hangar"]);

    assert!(matches!(
        dispatcher.start_cmd(&mut scheduler, "door", Trigger::User),
        Err(CommandError::MissingSubcommand(_))
    ));
    assert_eq!(
        capture.last().as_deref(),
        Some("Expected subcommand for \"door\". Run 'help door' for more info.")
    );

    assert!(dispatcher
        .start_cmd(&mut scheduler, "door lock hangar", Trigger::User)
        .is_err());
    assert_eq!(
        capture.last().as_deref(),
        Some("Invalid subcommand \"lock\" for \"door\". Run 'help door' for more info.")
    );

    assert!(dispatcher
        .start_cmd(&mut scheduler, "door open", Trigger::User)
        .is_err());
    assert!(capture
        .last()
        .is_some_and(|l| l.starts_with("Wrong number of arguments for \"door open\"")));
    assert_eq!(mock.call_count(), 1);
}

#[test]
fn duplicate_subcommands_are_rejected() {
    let (_, dispatcher, _) = setup();
    let mock = MockCommand::default();
    let err = dispatcher
        .register(
            Command::parent("door", "")
                .with_subcommand(mock.command("open", ""))
                .with_subcommand(mock.command("open", "")),
        )
        .unwrap_err();
    assert!(matches!(err, CommandError::Duplicate(ref n) if n == "door open"));
    assert!(dispatcher.command("door").is_none());
}

#[test]
fn command_process_completes_through_on_done() {
    let (mut scheduler, dispatcher, _) = setup();
    let mock = MockCommand::with_period(2);
    dispatcher
        .register(mock.command("slow", ""))
        .expect("should register");

    let result = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&result);
    dispatcher
        .start_cmd_with(
            &mut scheduler,
            "slow",
            SpawnRequest::new(Trigger::User).with_on_done(move |_, r| {
                *seen.borrow_mut() = Some(r);
                Ok(())
            }),
        )
        .expect("should start");

    scheduler.tick();
    assert!(result.borrow().is_none());
    scheduler.tick();
    assert_eq!(*result.borrow(), Some(ProcessResult::Ok));
}

#[test]
fn command_spawned_under_a_process_dies_with_it() {
    let (mut scheduler, dispatcher, _) = setup();
    let mock = MockCommand::with_period(100);
    dispatcher
        .register(mock.command("long", ""))
        .expect("should register");

    let owner = scheduler.spawn(SpawnSpec::named("owner"));
    let result = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&result);
    let pid = dispatcher
        .start_cmd_with(
            &mut scheduler,
            "long",
            SpawnRequest::new(Trigger::Cmd)
                .under(owner)
                .with_on_done(move |_, r| {
                    *seen.borrow_mut() = Some(r);
                    Ok(())
                }),
        )
        .expect("should start");
    assert_eq!(scheduler.parent(pid), Some(owner));

    scheduler.tick();
    scheduler.kill(owner);
    assert_eq!(*result.borrow(), Some(ProcessResult::Killed));
    assert!(!scheduler.is_alive(pid));
}

#[test]
fn dead_spawner_is_reported() {
    let (mut scheduler, dispatcher, capture) = setup();
    let owner = scheduler.spawn(SpawnSpec::named("owner"));
    scheduler.kill(owner);
    let err = dispatcher
        .start_cmd_with(&mut scheduler, "ps", SpawnRequest::new(Trigger::User).under(owner))
        .unwrap_err();
    assert!(matches!(err, CommandError::Spawn(_)));
    assert!(capture.contains("Could not start command"));
}

#[test]
fn kill_treats_zero_as_a_name() {
    let (mut scheduler, dispatcher, _) = setup();
    let named_zero = scheduler.spawn(SpawnSpec::named("0"));
    dispatcher
        .start_cmd(&mut scheduler, "kill 0", Trigger::User)
        .expect("should start");
    scheduler.tick();
    assert!(!scheduler.is_alive(named_zero));
}
