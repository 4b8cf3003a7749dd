//! Feed a fixed escape-sequence script through a [`Terminal`] and print the
//! resulting screen, logging every step to `replay.log`.
//!
//! ```sh
//! cargo run -p vtcore --example replay
//! ```

use std::fs::File;

use vtcore::{ByteSink, HostServiceError, HostServices, RendererPort, Terminal};

struct StdoutSink;
impl ByteSink for StdoutSink {
    fn write_to_pty(&mut self, bytes: &[u8]) {
        tracing::debug!(?bytes, "reply written to pty");
    }
}

struct NullRenderer;
impl RendererPort for NullRenderer {
    fn redraw(&mut self) {}
    fn set_show_scroll_indicator(&mut self, _show: bool) {}
    fn update_term_size(&mut self) {}
}

struct NullHost;
impl HostServices for NullHost {
    fn bell_alert(&mut self) {}
    fn set_window_title(&mut self, title: &str) {
        tracing::info!(title, "window title changed");
    }
    fn config_path(&self) -> Result<String, HostServiceError> {
        Ok(String::new())
    }
    fn settings_value(&self, _key: &str) -> Result<Option<String>, HostServiceError> {
        Ok(None)
    }
    fn selection_finished(&mut self) {}
    fn copy_to_clipboard(&mut self, _text: &str) -> Result<(), HostServiceError> {
        Ok(())
    }
    fn paste_from_clipboard(&self) -> Result<String, HostServiceError> {
        Ok(String::new())
    }
}

fn main() {
    let debug_file = File::create("replay.log").expect("failed to create replay.log");
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::sync::Mutex::new(debug_file))
        .with_ansi(false)
        .init();

    let mut term = Terminal::new();
    let mut sink = StdoutSink;
    let mut renderer = NullRenderer;
    let mut host = NullHost;

    term.set_term_size(40, 8, &mut renderer);

    let script = "\x1b[1;32mhello\x1b[0m, terminal\r\n\
                  \x1b[3;31mred text\x1b[0m on line two\r\n\
                  \x1b[10;1Hbottom-left corner";
    term.insert_in_buffer(script, &mut sink, &mut renderer, &mut host);

    let (cols, rows) = term.term_size();
    for y in 1..=rows {
        let mut line = String::new();
        if let Some(row) = term.buffer().row(y) {
            for cell in row {
                line.push(cell.c);
            }
        }
        while (line.chars().count() as u16) < cols {
            line.push(' ');
        }
        println!("{line}");
    }
}
