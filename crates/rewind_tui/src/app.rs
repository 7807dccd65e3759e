//! The TUI application: key handling around a [`DebugSession`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rewind_session::{CommandOutcome, DebugSession};

use crate::completer::complete;
use crate::state::TuiState;

/// The full TUI application state.
pub struct TuiApp {
    /// The debug session commands dispatch into.
    pub session: DebugSession,
    /// Input/output interface state.
    pub state: TuiState,
    /// Set once the user asked to exit.
    pub should_quit: bool,
}

impl TuiApp {
    /// Wraps a session for interactive use.
    pub fn new(session: DebugSession) -> Self {
        Self {
            session,
            state: TuiState::new(),
            should_quit: false,
        }
    }

    /// The `Time: sim/end` field text.
    pub fn time_field(&self) -> String {
        format!("Time: {}", self.session.time_display())
    }

    /// Handles one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // C-c, C-d, and C-q all abort the interface.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c' | 'd' | 'q') = key.code {
                self.should_quit = true;
                return;
            }
        }

        match key.code {
            KeyCode::Enter => self.dispatch(),
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Tab => self.complete_input(),
            KeyCode::Up => self.state.history_prev(),
            KeyCode::Down => self.state.history_next(),
            KeyCode::Char(c) => self.state.push_char(c),
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        let input = self.state.take_input();
        match self.session.handle_line(&input) {
            CommandOutcome::Output(text) => self.state.output = text,
            CommandOutcome::Quit => self.should_quit = true,
        }
    }

    fn complete_input(&mut self) {
        let module_names: Vec<&str> = self.session.model().module_names();
        if let Some(completed) = complete(&self.state.input, &module_names) {
            self.state.input = completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_model::{BasicModule, ModelDef};
    use rewind_trace::TraceStore;
    use std::io::Cursor;

    fn app() -> TuiApp {
        let vcd = "\
$scope module logic $end
$var wire 4 ! data $end
$upscope $end
$enddefinitions $end
#0
b0000 !
#30
b1010 !
#60
b1111 !
";
        let store = TraceStore::parse_reader(Cursor::new(vcd), None, None).unwrap();
        let mut def = ModelDef::new(10);
        def.add_module(Box::new(BasicModule::new(
            "r0_data",
            vec!["logic.data".into()],
        )))
        .unwrap();
        TuiApp::new(DebugSession::new(def.bind(store).unwrap(), None))
    }

    fn type_line(app: &mut TuiApp, line: &str) {
        for c in line.chars() {
            app.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
        app.handle_key(KeyEvent::from(KeyCode::Enter));
    }

    #[test]
    fn typed_commands_dispatch() {
        let mut app = app();
        type_line(&mut app, "fedge 3");
        assert_eq!(app.session.model().sim_time(), 30);
        assert_eq!(app.time_field(), "Time: 30/60");
    }

    #[test]
    fn errors_surface_in_output_pane() {
        let mut app = app();
        type_line(&mut app, "bogus");
        assert_eq!(app.state.output, "ERROR: Invalid Command!");
    }

    #[test]
    fn ctrl_keys_quit() {
        for c in ['c', 'd', 'q'] {
            let mut app = app();
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
            assert!(app.should_quit);
        }
    }

    #[test]
    fn quit_command_quits() {
        let mut app = app();
        type_line(&mut app, "quit");
        assert!(app.should_quit);
    }

    #[test]
    fn plain_chars_do_not_quit() {
        let mut app = app();
        app.handle_key(KeyEvent::from(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.state.input, "q");
    }

    #[test]
    fn tab_completes_module_names() {
        let mut app = app();
        for c in "info r0".chars() {
            app.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
        app.handle_key(KeyEvent::from(KeyCode::Tab));
        assert_eq!(app.state.input, "info r0_data");
    }

    #[test]
    fn history_recall_with_arrows() {
        let mut app = app();
        type_line(&mut app, "fedge 1");
        type_line(&mut app, "redge 1");
        app.handle_key(KeyEvent::from(KeyCode::Up));
        assert_eq!(app.state.input, "redge 1");
        app.handle_key(KeyEvent::from(KeyCode::Up));
        assert_eq!(app.state.input, "fedge 1");
        app.handle_key(KeyEvent::from(KeyCode::Down));
        assert_eq!(app.state.input, "redge 1");
    }

    #[test]
    fn backspace_edits_input() {
        let mut app = app();
        app.handle_key(KeyEvent::from(KeyCode::Char('f')));
        app.handle_key(KeyEvent::from(KeyCode::Char('x')));
        app.handle_key(KeyEvent::from(KeyCode::Backspace));
        assert_eq!(app.state.input, "f");
    }
}
