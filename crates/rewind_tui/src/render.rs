//! Top-level rendering: assembles the full-screen layout.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::app::TuiApp;
use crate::widgets::{command_bar, module_panel};

/// Renders the complete layout into the given frame.
///
/// ```text
/// ┌───────────┬───────────┬───────────┐
/// │ module    │ module    │ module    │
/// │ panels    │ panels    │ panels    │
/// ├───────────┴───────────┴───────────┤
/// │ command output                    │
/// ├───────────────────────────────────┤
/// │ > input                 Time: t/e │
/// └───────────────────────────────────┘
/// ```
pub fn render(app: &TuiApp, frame: &mut Frame) {
    let size = frame.size();

    // The output pane grows with multi-line command output (module info,
    // help) up to a third of the screen.
    let output_lines = app.state.output.lines().count().max(1) as u16;
    let output_height = output_lines.min(size.height / 3).max(1);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(output_height),
            Constraint::Length(1),
        ])
        .split(size);

    module_panel::render_module_grid(app, vertical[0], frame.buffer_mut());
    command_bar::render_output(app, vertical[1], frame.buffer_mut());
    command_bar::render_input(app, vertical[2], frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::TuiApp;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use rewind_model::{BasicModule, MemoryModule, ModelDef};
    use rewind_session::DebugSession;
    use rewind_trace::TraceStore;
    use std::io::Cursor;

    fn app() -> TuiApp {
        let vcd = "\
$scope module logic $end
$var wire 3 ! addr $end
$var wire 8 \" wdata $end
$var wire 1 # wen $end
$upscope $end
$enddefinitions $end
#0
b000 !
b00000000 \"
0#
#20
1#
";
        let store = TraceStore::parse_reader(Cursor::new(vcd), None, None).unwrap();
        let mut def = ModelDef::new(10);
        def.add_module(Box::new(BasicModule::new(
            "bus",
            vec!["logic.addr".into(), "logic.wdata".into()],
        )))
        .unwrap();
        def.add_module(Box::new(MemoryModule::new(
            "mem",
            "logic.addr".into(),
            "logic.wdata".into(),
            "logic.wen".into(),
            true,
        )))
        .unwrap();
        TuiApp::new(DebugSession::new(def.bind(store).unwrap(), None))
    }

    #[test]
    fn full_layout_renders() {
        let app = app();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(&app, f)).unwrap();
    }

    #[test]
    fn multi_line_output_grows_the_pane() {
        let mut app = app();
        app.state.output = "line one\nline two\nline three".into();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(&app, f)).unwrap();
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let app = app();
        let backend = TestBackend::new(10, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(&app, f)).unwrap();
    }
}
