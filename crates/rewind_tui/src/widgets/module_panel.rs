//! The per-module panel grid.
//!
//! Each module's text serialization renders inside a bordered block;
//! modules are laid out in a grid of up to three columns.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use crate::app::TuiApp;

/// Maximum panels per row.
const GRID_COLUMNS: usize = 3;

/// Renders the module panel grid into the given area.
pub fn render_module_grid(app: &TuiApp, area: Rect, buf: &mut Buffer) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let panels: Vec<(String, String)> = app
        .session
        .model()
        .modules()
        .map(|m| (m.name().to_string(), m.render()))
        .collect();
    if panels.is_empty() {
        return;
    }

    let columns = panels.len().min(GRID_COLUMNS);
    let rows = panels.len().div_ceil(columns);

    let row_constraints = vec![Constraint::Ratio(1, rows as u32); rows];
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row_index, row_area) in row_areas.iter().enumerate() {
        let in_row = panels.len() - row_index * columns;
        let cols = in_row.min(columns);
        let col_constraints = vec![Constraint::Ratio(1, cols as u32); cols];
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(*row_area);
        for (col_index, col_area) in col_areas.iter().enumerate() {
            let Some((name, text)) = panels.get(row_index * columns + col_index) else {
                break;
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {name} "));
            Paragraph::new(text.as_str())
                .block(block)
                .render(*col_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::TuiApp;
    use rewind_model::{BasicModule, ModelDef};
    use rewind_session::DebugSession;
    use rewind_trace::TraceStore;
    use std::io::Cursor;

    fn app(module_count: usize) -> TuiApp {
        let vcd = "\
$scope module logic $end
$var wire 4 ! data $end
$upscope $end
$enddefinitions $end
#0
b0101 !
";
        let store = TraceStore::parse_reader(Cursor::new(vcd), None, None).unwrap();
        let mut def = ModelDef::new(10);
        for i in 0..module_count {
            def.add_module(Box::new(BasicModule::new(
                format!("mod{i}"),
                vec!["logic.data".into()],
            )))
            .unwrap();
        }
        TuiApp::new(DebugSession::new(def.bind(store).unwrap(), None))
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = *buf.area();
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf.get(x, y).symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn single_module_fills_area() {
        let app = app(1);
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        render_module_grid(&app, area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("mod0"));
        assert!(text.contains("data"));
    }

    #[test]
    fn many_modules_tile_into_a_grid() {
        let app = app(5);
        let area = Rect::new(0, 0, 90, 20);
        let mut buf = Buffer::empty(area);
        render_module_grid(&app, area, &mut buf);
        let text = buffer_text(&buf);
        for i in 0..5 {
            assert!(text.contains(&format!("mod{i}")), "missing panel mod{i}");
        }
    }

    #[test]
    fn zero_area_does_not_panic() {
        let app = app(2);
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        render_module_grid(&app, area, &mut buf);
    }
}
