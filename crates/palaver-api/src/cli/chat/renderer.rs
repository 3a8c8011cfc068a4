//! Terminal markdown rendering with syntax-highlighted code blocks.
//!
//! While a reply streams, fragments are printed raw. Stored replies (resumed
//! sessions, `/history`, `palaver show`) go through `render_final`.

use std::io::Write;
use std::time::Duration;

use crossterm::style::Color;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

const CODE_THEME: &str = "base16-ocean.dark";

pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl ChatRenderer {
    /// Create a renderer; `accent_color` tints headers and bold text.
    pub fn new(accent_color: Option<Color>) -> Self {
        let mut skin = MadSkin::default_dark();

        if let Some(color) = accent_color {
            let tc = Self::crossterm_to_termimad(color);
            skin.bold.set_fg(tc);
            skin.headers[0].set_fg(tc);
            skin.headers[1].set_fg(tc);
        }

        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render a complete markdown reply.
    ///
    /// Fenced code is highlighted via syntect; prose between fences is
    /// rendered through termimad.
    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut prose = String::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            let is_fence = line.trim_start().starts_with("```");
            if is_fence && !in_code_block {
                self.flush_prose(&mut prose, &mut output);
                in_code_block = true;
                code_lang = line.trim().trim_start_matches('`').trim().to_string();
                code_buf.clear();
            } else if is_fence {
                in_code_block = false;
                output.push_str(&self.highlight_code(&code_buf, &code_lang));
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                prose.push_str(line);
                prose.push('\n');
            }
        }

        // Unclosed fence: show what arrived
        if in_code_block && !code_buf.is_empty() {
            output.push_str(&self.highlight_code(&code_buf, &code_lang));
        }
        self.flush_prose(&mut prose, &mut output);

        output
    }

    /// Print a single streamed fragment (raw, no formatting).
    pub fn print_streaming_fragment(&self, fragment: &str) {
        print!("{fragment}");
        let _ = std::io::stdout().flush();
    }

    /// Print the footer after a reply.
    ///
    /// Format: "| {fragments} fragments . {time}s . {model}"
    pub fn print_stats_footer(&self, fragments: usize, elapsed: Duration, model: &str) {
        let footer = format!(
            "\n  {} {} fragments {} {:.1}s {} {}",
            console::style("|").dim(),
            console::style(fragments).dim(),
            console::style("\u{00b7}").dim(),
            console::style(elapsed.as_secs_f64()).dim(),
            console::style("\u{00b7}").dim(),
            console::style(model).dim(),
        );
        println!("{footer}");
    }

    fn flush_prose(&self, prose: &mut String, output: &mut String) {
        if prose.trim().is_empty() {
            prose.clear();
            return;
        }
        output.push_str(&self.skin.term_text(prose.as_str()).to_string());
        prose.clear();
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "  {}\n",
            console::style(format!("--- {lang} ---")).dim()
        ));

        let Some(theme) = self.theme_set.themes.get(CODE_THEME) else {
            for line in code.lines() {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };

        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };
        let mut h = HighlightLines::new(syntax, theme);

        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }

        output
    }

    fn crossterm_to_termimad(color: Color) -> termimad::crossterm::style::Color {
        match color {
            Color::Cyan => termimad::crossterm::style::Color::Cyan,
            Color::Green => termimad::crossterm::style::Color::Green,
            Color::Yellow => termimad::crossterm::style::Color::Yellow,
            Color::Magenta => termimad::crossterm::style::Color::Magenta,
            Color::Blue => termimad::crossterm::style::Color::Blue,
            Color::Red => termimad::crossterm::style::Color::Red,
            Color::Rgb { r, g, b } => termimad::crossterm::style::Color::Rgb { r, g, b },
            _ => termimad::crossterm::style::Color::Cyan,
        }
    }
}
