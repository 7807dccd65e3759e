//! The debug session: command execution over model, breakpoints, and
//! resolver.

use rewind_dwarf::{BinaryError, DwarfResolver};
use rewind_expr::{self as expr, BreakpointSet, Val};
use rewind_model::DebugModel;

use crate::command::{help_text, parse_command, Command};
use crate::error::SessionError;

/// The result of a dispatched command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Text for the output pane (possibly empty).
    Output(String),
    /// The user asked to exit.
    Quit,
}

/// One interactive debugging session.
///
/// Owns the bound model, the breakpoint table, and the optional DWARF
/// resolver. All mutation happens through [`DebugSession::handle_line`],
/// which serializes command execution and reports errors in-band.
pub struct DebugSession {
    model: DebugModel,
    breakpoints: BreakpointSet,
    resolver: Option<DwarfResolver>,
    last_input: Option<String>,
}

impl DebugSession {
    /// Creates a session over a bound model.
    pub fn new(model: DebugModel, resolver: Option<DwarfResolver>) -> Self {
        Self {
            model,
            breakpoints: BreakpointSet::new(),
            resolver,
            last_input: None,
        }
    }

    /// The underlying model, for display layers.
    pub fn model(&self) -> &DebugModel {
        &self.model
    }

    /// The `sim_time / end_time` indicator text.
    pub fn time_display(&self) -> String {
        format!("{}/{}", self.model.sim_time(), self.model.end_time())
    }

    /// Handles one line of user input.
    ///
    /// An empty line repeats the previous command. Errors render as
    /// `ERROR: …` output and leave the session state untouched.
    pub fn handle_line(&mut self, input: &str) -> CommandOutcome {
        let text = input.trim().to_string();
        let effective = if text.is_empty() {
            match &self.last_input {
                Some(previous) => previous.clone(),
                None => return CommandOutcome::Output(String::new()),
            }
        } else {
            text
        };

        let outcome = match parse_command(&effective).and_then(|cmd| self.execute(&cmd)) {
            Ok(outcome) => outcome,
            Err(e) => CommandOutcome::Output(format!("ERROR: {e}")),
        };
        self.last_input = Some(effective);
        outcome
    }

    /// Executes one parsed command.
    pub fn execute(&mut self, command: &Command) -> Result<CommandOutcome, SessionError> {
        match command {
            Command::Fedge { count } => self.fedge(*count),
            Command::Redge { count } => {
                self.model.rupdate(*count)?;
                Ok(CommandOutcome::Output(String::new()))
            }
            Command::Step { target, count } => self.source_step(target, *count, false),
            Command::Rstep { target, count } => self.source_step(target, *count, true),
            Command::Break { condition } => {
                let id = self.breakpoints.set(condition, &self.model.signal_dict())?;
                Ok(CommandOutcome::Output(format!("Breakpoint {id}: {condition}")))
            }
            Command::Lsbrk => {
                let text = self
                    .breakpoints
                    .list()
                    .map(|(id, source)| format!("Breakpoint {id}: {source}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(CommandOutcome::Output(text))
            }
            Command::Delete { id } => {
                self.breakpoints.delete(*id)?;
                Ok(CommandOutcome::Output(format!("Removed breakpoint {id}")))
            }
            Command::Run { until } => self.run(*until),
            Command::Jump { time } => self.jump(*time),
            Command::Where { target, context } => self.where_view(target, *context),
            Command::Info { module } => {
                let module = self
                    .model
                    .module(module)
                    .ok_or_else(|| SessionError::input("Module not found!"))?;
                Ok(CommandOutcome::Output(module.render()))
            }
            Command::Modules => {
                let text = self
                    .model
                    .module_names()
                    .iter()
                    .map(|name| format!("* {name}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(CommandOutcome::Output(text))
            }
            Command::Traceback => self.traceback(),
            Command::Clear => Ok(CommandOutcome::Output(String::new())),
            Command::Help => Ok(CommandOutcome::Output(help_text())),
            Command::Quit => Ok(CommandOutcome::Quit),
            Command::Debugger => Ok(CommandOutcome::Output(self.dump_internals())),
        }
    }

    /// Advances `count` edges.
    ///
    /// With breakpoints set this walks edge by edge, checking after each;
    /// otherwise it takes the fast skip path.
    fn fedge(&mut self, count: u64) -> Result<CommandOutcome, SessionError> {
        if !self.breakpoints.is_empty() {
            let mut remaining = count;
            while remaining > 0 {
                if !self.model.edge()? {
                    return Ok(CommandOutcome::Output(format!(
                        "Hit simulation end at time {}",
                        self.model.sim_time()
                    )));
                }
                if let Some(id) = self.breakpoints.check(&self.model.signal_dict()) {
                    return Ok(CommandOutcome::Output(format!(
                        "Hit breakpoint {id} at time {}",
                        self.model.sim_time()
                    )));
                }
                if self.model.at_end() {
                    return Ok(CommandOutcome::Output(format!(
                        "Hit simulation end at time {}",
                        self.model.sim_time()
                    )));
                }
                remaining -= 1;
            }
            return Ok(CommandOutcome::Output(String::new()));
        }

        self.model.update(count)?;
        if self.model.at_end() {
            Ok(CommandOutcome::Output(format!(
                "Hit end of simulation at time {}",
                self.model.sim_time()
            )))
        } else {
            Ok(CommandOutcome::Output(String::new()))
        }
    }

    fn run(&mut self, until: Option<u64>) -> Result<CommandOutcome, SessionError> {
        let curr = self.model.sim_time();
        let target = until.unwrap_or_else(|| self.model.end_time());
        if target < curr {
            return Err(SessionError::input("Time must be later than current time"));
        }
        let edges = (target - curr) / self.model.edge_time();
        self.fedge(edges)
    }

    fn jump(&mut self, time: u64) -> Result<CommandOutcome, SessionError> {
        let curr = self.model.sim_time();
        let edges = time.abs_diff(curr) / self.model.edge_time();
        if time < curr {
            self.model.rupdate(edges)?;
        } else {
            self.model.update(edges)?;
        }
        Ok(CommandOutcome::Output(String::new()))
    }

    /// Reverses one edge at a time until no module signal carries an `x`.
    fn traceback(&mut self) -> Result<CommandOutcome, SessionError> {
        loop {
            if !self.model.has_unknown() {
                return Ok(CommandOutcome::Output(format!(
                    "No unknown signals at time {}",
                    self.model.sim_time()
                )));
            }
            if self.model.sim_time() == 0 {
                return Ok(CommandOutcome::Output(
                    "Unknown signals persist back to time 0".to_string(),
                ));
            }
            self.model.rupdate(1)?;
        }
    }

    fn resolver(&self) -> Result<&DwarfResolver, SessionError> {
        self.resolver
            .as_ref()
            .ok_or(SessionError::Binary(BinaryError::BinaryRequired))
    }

    /// The `(file, line)` the named core's PC currently maps to, or
    /// `None` while the PC is undefined or unmapped.
    fn core_location(&self, target: &str) -> Result<Option<(String, u32)>, SessionError> {
        let resolver = self.resolver()?;
        let module = self
            .model
            .module(target)
            .ok_or_else(|| SessionError::input("Module not found!"))?;
        let pc = module
            .pc()
            .ok_or_else(|| SessionError::input("step must be given a Core module"))?;
        let Some(addr) = pc.value.as_int() else {
            return Ok(None);
        };
        match resolver.resolve(addr) {
            Ok(resolved) => Ok(Some((resolved.file, resolved.line))),
            Err(BinaryError::Unresolved { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Moves until the core's source line has changed `count` times.
    fn source_step(
        &mut self,
        target: &str,
        count: u64,
        backward: bool,
    ) -> Result<CommandOutcome, SessionError> {
        let mut current = self.core_location(target)?;
        let mut remaining = count;

        while remaining > 0 {
            if backward {
                if self.model.sim_time() == 0 {
                    return Ok(CommandOutcome::Output(
                        "Hit simulation start".to_string(),
                    ));
                }
                self.model.rupdate(1)?;
            } else if !self.model.edge()? {
                return Ok(CommandOutcome::Output(format!(
                    "Hit simulation end at time {}",
                    self.model.sim_time()
                )));
            }

            let location = self.core_location(target)?;
            if location.is_some() && location != current {
                remaining -= 1;
                current = location;
            }
        }

        match current {
            Some((file, line)) => Ok(CommandOutcome::Output(format!("Stopped at {file}:{line}"))),
            None => Ok(CommandOutcome::Output(String::new())),
        }
    }

    /// Resolves a `where` target: a literal address, a Core module's PC,
    /// or a predicate-language expression evaluating to an address.
    fn where_address(&self, target: &str) -> Result<u64, SessionError> {
        if let Some(hex) = target.strip_prefix("0x") {
            return u64::from_str_radix(hex, 16)
                .map_err(|_| SessionError::input("Invalid address"));
        }
        if let Ok(addr) = target.parse::<u64>() {
            return Ok(addr);
        }
        if let Some(module) = self.model.module(target) {
            let pc = module
                .pc()
                .ok_or_else(|| SessionError::input("where must be given a Core module"))?;
            return pc
                .value
                .as_int()
                .ok_or_else(|| SessionError::input("Core module has invalid address"));
        }
        // Fall back to evaluating the target as an expression.
        let tokens = expr::lexer::lex(target)?;
        let parsed = expr::parser::parse(&tokens)?;
        let env = self.model.signal_dict();
        parsed.validate_names(&env)?;
        match expr::eval(&parsed, &env)? {
            Val::Int(addr) if addr >= 0 => Ok(addr as u64),
            _ => Err(SessionError::input("Location has no defined address")),
        }
    }

    fn where_view(&self, target: &str, context: u32) -> Result<CommandOutcome, SessionError> {
        let resolver = self.resolver()?;
        let addr = self.where_address(target)?;
        Ok(CommandOutcome::Output(resolver.where_view(addr, context)?))
    }

    fn dump_internals(&self) -> String {
        let breakpoints: Vec<String> = self
            .breakpoints
            .list()
            .map(|(id, source)| format!("{id}:{source}"))
            .collect();
        format!(
            "sim_time={} end_time={} edge_time={} modules={} breakpoints=[{}] last={:?}",
            self.model.sim_time(),
            self.model.end_time(),
            self.model.edge_time(),
            self.model.module_names().len(),
            breakpoints.join(", "),
            self.last_input
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_model::{BasicModule, MemoryModule, ModelDef};
    use rewind_trace::TraceStore;
    use std::io::Cursor;

    /// Memory writes at t=10 (2:=0x55), t=40 (2:=0xaa), t=70 (5:=0x11),
    /// plus a 4-bit data signal.
    fn vcd() -> &'static str {
        "\
$timescale 1ns $end
$scope module logic $end
$var wire 3 ! addr $end
$var wire 8 \" wdata $end
$var wire 1 # wen $end
$var wire 4 $ data $end
$upscope $end
$enddefinitions $end
#0
b000 !
b00000000 \"
0#
bxxxx $
#10
b010 !
b01010101 \"
1#
#20
0#
b0001 $
#40
b010 !
b10101010 \"
1#
#50
0#
#70
b101 !
b00010001 \"
1#
#80
0#
#100
0#
"
    }

    fn session() -> DebugSession {
        let trace = TraceStore::parse_reader(Cursor::new(vcd()), None, None).unwrap();
        let mut def = ModelDef::new(10);
        def.add_module(Box::new(BasicModule::new(
            "r0_data",
            vec!["logic.data".into()],
        )))
        .unwrap();
        def.add_module(Box::new(
            MemoryModule::new(
                "mem",
                "logic.addr".into(),
                "logic.wdata".into(),
                "logic.wen".into(),
                true,
            )
            .with_size(8),
        ))
        .unwrap();
        DebugSession::new(def.bind(trace).unwrap(), None)
    }

    fn output(outcome: CommandOutcome) -> String {
        match outcome {
            CommandOutcome::Output(text) => text,
            CommandOutcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn fedge_advances_without_breakpoints() {
        let mut s = session();
        assert_eq!(output(s.handle_line("fedge 3")), "");
        assert_eq!(s.model().sim_time(), 30);
    }

    #[test]
    fn fedge_reports_end() {
        let mut s = session();
        let text = output(s.handle_line("fedge 1000"));
        assert_eq!(text, "Hit end of simulation at time 100");
        assert_eq!(s.model().sim_time(), 100);
    }

    #[test]
    fn redge_reverses() {
        let mut s = session();
        s.handle_line("fedge 5");
        assert_eq!(output(s.handle_line("redge 2")), "");
        assert_eq!(s.model().sim_time(), 30);
    }

    #[test]
    fn breakpoint_halts_fedge() {
        let mut s = session();
        let text = output(s.handle_line("break mem.addr == 5"));
        assert_eq!(text, "Breakpoint 0: mem.addr == 5");
        let text = output(s.handle_line("fedge 100"));
        assert_eq!(text, "Hit breakpoint 0 at time 70");
        assert_eq!(s.model().sim_time(), 70);
    }

    #[test]
    fn run_honors_breakpoints_and_rejects_past_times() {
        let mut s = session();
        s.handle_line("break mem.addr == 5");
        let text = output(s.handle_line("run"));
        assert_eq!(text, "Hit breakpoint 0 at time 70");
        let text = output(s.handle_line("run 20"));
        assert_eq!(text, "ERROR: Time must be later than current time");
        assert_eq!(s.model().sim_time(), 70);
    }

    #[test]
    fn jump_ignores_breakpoints() {
        let mut s = session();
        s.handle_line("break mem.addr == 5");
        assert_eq!(output(s.handle_line("jump 100")), "");
        assert_eq!(s.model().sim_time(), 100);
        assert_eq!(output(s.handle_line("jump 30")), "");
        assert_eq!(s.model().sim_time(), 30);
    }

    #[test]
    fn breakpoint_table_commands() {
        let mut s = session();
        s.handle_line("break mem.addr == 5");
        s.handle_line("break mem.addr == 2");
        let listed = output(s.handle_line("lsbrk"));
        assert!(listed.contains("Breakpoint 0: mem.addr == 5"));
        assert!(listed.contains("Breakpoint 1: mem.addr == 2"));
        assert_eq!(output(s.handle_line("delete 0")), "Removed breakpoint 0");
        let text = output(s.handle_line("delete 0"));
        assert_eq!(text, "ERROR: breakpoint 0 not found");
    }

    #[test]
    fn bad_breakpoints_are_input_errors() {
        let mut s = session();
        let text = output(s.handle_line("break mem.addr"));
        assert_eq!(text, "ERROR: breakpoint condition is not boolean");
        let text = output(s.handle_line("break cpu.pc == 1"));
        assert_eq!(text, "ERROR: unknown name 'cpu.pc'");
        assert_eq!(output(s.handle_line("lsbrk")), "");
    }

    #[test]
    fn info_renders_module() {
        let mut s = session();
        s.handle_line("fedge 10");
        let text = output(s.handle_line("info mem"));
        assert!(text.starts_with("mem: "));
        assert!(text.contains("mem:\n"));
        let text = output(s.handle_line("info nope"));
        assert_eq!(text, "ERROR: Module not found!");
    }

    #[test]
    fn modules_lists_names() {
        let mut s = session();
        assert_eq!(output(s.handle_line("modules")), "* r0_data\n* mem");
    }

    #[test]
    fn traceback_finds_clean_cycle() {
        let mut s = session();
        s.handle_line("jump 100");
        // data becomes defined at t=20; earlier cycles carry x.
        let text = output(s.handle_line("traceback"));
        assert_eq!(text, "No unknown signals at time 100");
        s.handle_line("jump 10");
        let text = output(s.handle_line("traceback"));
        assert_eq!(text, "Unknown signals persist back to time 0");
    }

    #[test]
    fn empty_line_repeats_last_command() {
        let mut s = session();
        s.handle_line("fedge 2");
        assert_eq!(s.model().sim_time(), 20);
        s.handle_line("");
        assert_eq!(s.model().sim_time(), 40);
    }

    #[test]
    fn empty_line_with_no_history_is_quiet() {
        let mut s = session();
        assert_eq!(output(s.handle_line("")), "");
        assert_eq!(s.model().sim_time(), 0);
    }

    #[test]
    fn source_commands_require_binary() {
        let mut s = session();
        let text = output(s.handle_line("step r0_data"));
        assert!(text.contains("--binary"));
        let text = output(s.handle_line("where r0_data"));
        assert!(text.contains("--binary"));
        assert_eq!(s.model().sim_time(), 0);
    }

    #[test]
    fn quit_and_help() {
        let mut s = session();
        assert_eq!(s.handle_line("quit"), CommandOutcome::Quit);
        let help = output(s.handle_line("help"));
        assert!(help.starts_with("HELP"));
        assert!(help.contains("fedge"));
    }

    #[test]
    fn invalid_commands_report_in_band() {
        let mut s = session();
        let text = output(s.handle_line("frobnicate"));
        assert_eq!(text, "ERROR: Invalid Command!");
    }

    #[test]
    fn debugger_dumps_internals() {
        let mut s = session();
        s.handle_line("fedge 1");
        let text = output(s.handle_line("debugger"));
        assert!(text.contains("sim_time=10"));
        assert!(text.contains("end_time=100"));
        assert!(text.contains("modules=2"));
    }

    #[test]
    fn time_display_format() {
        let mut s = session();
        assert_eq!(s.time_display(), "0/100");
        s.handle_line("fedge 3");
        assert_eq!(s.time_display(), "30/100");
    }

    #[test]
    fn clear_produces_empty_output() {
        let mut s = session();
        s.handle_line("fedge 1");
        assert_eq!(output(s.handle_line("clear")), "");
    }
}
